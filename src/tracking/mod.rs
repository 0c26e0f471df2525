//! Order status tracking.
//!
//! [`StatusTracker`] is the state machine: a linear chain
//! `Confirmed -> Preparing -> OutForDelivery -> Delivered` plus the absorbing
//! `Cancelled`, with one timestamp per status reached. It never moves backward.
//! [`TrackingSession`] drives it from a timer on a tokio task.

use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::OrderStatus;

mod session;
pub use session::{TrackingCommand, TrackingSession};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    #[error("order is already {0}, no further transition")]
    Terminal(OrderStatus),

    #[error("cannot {action} an order in status {status}")]
    InvalidTransition {
        action: &'static str,
        status: OrderStatus,
    },

    #[error("tracking session has ended")]
    SessionClosed,
}

/// How a step of the tracker is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Completed,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub status: OrderStatus,
    pub label: &'static str,
    pub phase: StepPhase,
    pub reached_at: Option<DateTime<Local>>,
}

impl Step {
    /// Local wall-clock time the step was reached, e.g. `7:05:12 PM`.
    pub fn time_label(&self) -> Option<String> {
        self.reached_at
            .map(|at| at.format("%-I:%M:%S %p").to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTracker {
    status: OrderStatus,
    timestamps: BTreeMap<OrderStatus, DateTime<Local>>,
    progress: u8,
}

impl StatusTracker {
    pub fn new(initial: OrderStatus, at: DateTime<Local>) -> Self {
        Self {
            status: initial,
            timestamps: BTreeMap::from([(initial, at)]),
            progress: progress_of(initial),
        }
    }

    /// Record when an earlier status was reached, for seeding history.
    pub fn stamped(mut self, status: OrderStatus, at: DateTime<Local>) -> Self {
        self.timestamps.insert(status, at);
        self
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn timestamps(&self) -> &BTreeMap<OrderStatus, DateTime<Local>> {
        &self.timestamps
    }

    pub fn reached_at(&self, status: OrderStatus) -> Option<DateTime<Local>> {
        self.timestamps.get(&status).copied()
    }

    /// Progress bar percentage. Never decreases, frozen once cancelled.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// The status the timer would advance to. `None` means the timer does not arm.
    pub fn next_auto(&self) -> Option<OrderStatus> {
        self.status.successor()
    }

    /// Move one step along the chain and stamp the new status.
    pub fn advance(&mut self, at: DateTime<Local>) -> Result<OrderStatus, TrackingError> {
        if self.status.is_terminal() {
            return Err(TrackingError::Terminal(self.status));
        }
        let next = self.next_auto().ok_or(TrackingError::InvalidTransition {
            action: "advance",
            status: self.status,
        })?;
        self.enter(next, at);
        Ok(next)
    }

    /// `Pending -> Confirmed`, the only way into the automatic chain.
    pub fn confirm(&mut self, at: DateTime<Local>) -> Result<(), TrackingError> {
        match self.status {
            OrderStatus::Pending => {
                self.enter(OrderStatus::Confirmed, at);
                Ok(())
            }
            status if status.is_terminal() => Err(TrackingError::Terminal(status)),
            status => Err(TrackingError::InvalidTransition {
                action: "confirm",
                status,
            }),
        }
    }

    /// Any non-terminal status can be cancelled. Irreversible.
    pub fn cancel(&mut self, at: DateTime<Local>) -> Result<(), TrackingError> {
        if self.status.is_terminal() {
            return Err(TrackingError::Terminal(self.status));
        }
        self.enter(OrderStatus::Cancelled, at);
        Ok(())
    }

    /// Display steps: the chain, or only the cancelled step.
    pub fn steps(&self) -> Vec<Step> {
        if self.status == OrderStatus::Cancelled {
            return vec![Step {
                status: OrderStatus::Cancelled,
                label: OrderStatus::Cancelled.label(),
                phase: StepPhase::Completed,
                reached_at: self.reached_at(OrderStatus::Cancelled),
            }];
        }

        let current = self.status.chain_index();
        OrderStatus::CHAIN
            .iter()
            .enumerate()
            .map(|(idx, status)| {
                let phase = match current {
                    Some(cur) if idx < cur => StepPhase::Completed,
                    Some(cur) if idx == cur => StepPhase::Active,
                    _ => StepPhase::Upcoming,
                };
                Step {
                    status: *status,
                    label: status.label(),
                    phase,
                    reached_at: self.reached_at(*status),
                }
            })
            .collect()
    }

    fn enter(&mut self, status: OrderStatus, at: DateTime<Local>) {
        self.status = status;
        self.timestamps.insert(status, at);
        self.progress = self.progress.max(progress_of(status));
    }
}

fn progress_of(status: OrderStatus) -> u8 {
    let last = OrderStatus::CHAIN.len() - 1;
    status
        .chain_index()
        .map_or(0, |idx| (idx * 100 / last) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tracker(status: OrderStatus) -> StatusTracker {
        StatusTracker::new(status, Local::now())
    }

    #[test]
    fn three_advances_reach_delivered() {
        let mut tracker = tracker(OrderStatus::Confirmed);
        for _ in 0..3 {
            tracker.advance(Local::now()).unwrap();
        }
        assert_eq!(tracker.status(), OrderStatus::Delivered);
        assert_eq!(tracker.next_auto(), None);
        assert_eq!(
            tracker.advance(Local::now()),
            Err(TrackingError::Terminal(OrderStatus::Delivered))
        );
    }

    #[test]
    fn every_reached_status_is_stamped() {
        let start = Local::now();
        let mut tracker = StatusTracker::new(OrderStatus::Confirmed, start);
        let later = start + Duration::seconds(15);
        tracker.advance(later).unwrap();

        assert_eq!(tracker.reached_at(OrderStatus::Confirmed), Some(start));
        assert_eq!(tracker.reached_at(OrderStatus::Preparing), Some(later));
        assert_eq!(tracker.reached_at(OrderStatus::OutForDelivery), None);
    }

    #[test]
    fn progress_is_monotonic_and_saturates() {
        let mut tracker = tracker(OrderStatus::Confirmed);
        let mut seen = vec![tracker.progress()];
        while tracker.advance(Local::now()).is_ok() {
            seen.push(tracker.progress());
        }
        assert_eq!(seen, [0, 33, 66, 100]);
    }

    #[test]
    fn cancel_from_any_non_terminal_state() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
        ] {
            let mut tracker = tracker(status);
            let progress = tracker.progress();
            tracker.cancel(Local::now()).unwrap();

            assert_eq!(tracker.status(), OrderStatus::Cancelled);
            assert_eq!(tracker.progress(), progress);
            assert_eq!(tracker.next_auto(), None);
            assert!(tracker.advance(Local::now()).is_err());
            assert!(tracker.cancel(Local::now()).is_err());
            assert!(tracker.confirm(Local::now()).is_err());
        }
    }

    #[test]
    fn delivered_cannot_be_cancelled() {
        let mut tracker = tracker(OrderStatus::Delivered);
        assert_eq!(
            tracker.cancel(Local::now()),
            Err(TrackingError::Terminal(OrderStatus::Delivered))
        );
    }

    #[test]
    fn pending_needs_explicit_confirmation() {
        let mut tracker = tracker(OrderStatus::Pending);
        assert_eq!(tracker.next_auto(), None);
        assert_eq!(
            tracker.advance(Local::now()),
            Err(TrackingError::InvalidTransition {
                action: "advance",
                status: OrderStatus::Pending
            })
        );

        tracker.confirm(Local::now()).unwrap();
        assert_eq!(tracker.status(), OrderStatus::Confirmed);
        assert_eq!(tracker.next_auto(), Some(OrderStatus::Preparing));
    }

    #[test]
    fn steps_mark_completed_active_upcoming() {
        let tracker = tracker(OrderStatus::Preparing);
        let phases: Vec<_> = tracker.steps().iter().map(|s| s.phase).collect();
        assert_eq!(
            phases,
            [
                StepPhase::Completed,
                StepPhase::Active,
                StepPhase::Upcoming,
                StepPhase::Upcoming
            ]
        );
    }

    #[test]
    fn cancelled_shows_single_step() {
        let mut tracker = tracker(OrderStatus::Preparing);
        tracker.cancel(Local::now()).unwrap();
        let steps = tracker.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].label, "Order Cancelled");
        assert!(steps[0].time_label().is_some());
    }

    #[test]
    fn seeded_history_is_kept() {
        let now = Local::now();
        let tracker = StatusTracker::new(OrderStatus::Preparing, now - Duration::minutes(2))
            .stamped(OrderStatus::Confirmed, now - Duration::minutes(10));
        assert_eq!(tracker.timestamps().len(), 2);
        assert_eq!(tracker.progress(), 33);
    }
}
