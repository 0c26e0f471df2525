use chrono::Local;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use super::{StatusTracker, TrackingError};
use crate::model::OrderStatus;

/// External transition requested by the owner of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingCommand {
    Confirm,
    Cancel,
}

type Request = (
    TrackingCommand,
    oneshot::Sender<Result<StatusTracker, TrackingError>>,
);

/// A tracker driven by a one-shot timer per status.
///
/// The tracker lives on a spawned task. Every change is published as a
/// snapshot. Dropping the session aborts the task, so a timer that has not
/// fired yet never fires.
pub struct TrackingSession {
    updates: watch::Receiver<StatusTracker>,
    commands: mpsc::Sender<Request>,
    task: JoinHandle<()>,
}

impl TrackingSession {
    /// Start driving `tracker`, advancing it every `delay`.
    pub fn spawn(tracker: StatusTracker, delay: Duration) -> Self {
        let (update_tx, updates) = watch::channel(tracker.clone());
        let (commands, command_rx) = mpsc::channel(4);
        let task = tokio::spawn(drive(tracker, delay, update_tx, command_rx));
        Self {
            updates,
            commands,
            task,
        }
    }

    pub fn snapshot(&self) -> StatusTracker {
        self.updates.borrow().clone()
    }

    pub fn status(&self) -> OrderStatus {
        self.updates.borrow().status()
    }

    /// An independent view of the snapshots, e.g. for a progress widget.
    pub fn subscribe(&self) -> watch::Receiver<StatusTracker> {
        self.updates.clone()
    }

    /// Wait for the next snapshot not yet seen by this session.
    /// Fails once the tracker can no longer change.
    pub async fn changed(&mut self) -> Result<StatusTracker, TrackingError> {
        self.updates
            .changed()
            .await
            .map_err(|_| TrackingError::SessionClosed)?;
        Ok(self.updates.borrow_and_update().clone())
    }

    pub async fn confirm(&mut self) -> Result<(), TrackingError> {
        self.request(TrackingCommand::Confirm).await
    }

    pub async fn cancel(&mut self) -> Result<(), TrackingError> {
        self.request(TrackingCommand::Cancel).await
    }

    async fn request(&mut self, command: TrackingCommand) -> Result<(), TrackingError> {
        let had_unseen = self.updates.has_changed().unwrap_or(false);
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.commands.send((command, reply_tx)).await.is_err() {
            return Err(self.closed_error());
        }
        let produced = reply_rx.await.map_err(|_| self.closed_error())??;

        // only the snapshot produced by the command itself is not news to the caller
        let latest = self.updates.borrow_and_update().clone();
        if had_unseen || latest != produced {
            self.updates.mark_changed();
        }
        Ok(())
    }

    /// The task only stops on its own once the order is terminal.
    fn closed_error(&self) -> TrackingError {
        let status = self.status();
        if status.is_terminal() {
            TrackingError::Terminal(status)
        } else {
            TrackingError::SessionClosed
        }
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drive(
    mut tracker: StatusTracker,
    delay: Duration,
    updates: watch::Sender<StatusTracker>,
    mut commands: mpsc::Receiver<Request>,
) {
    let timer = sleep(delay);
    tokio::pin!(timer);
    let mut armed_for = None;

    while !tracker.status().is_terminal() {
        let armed = tracker.next_auto().is_some();
        if armed && armed_for != Some(tracker.status()) {
            timer.as_mut().reset(Instant::now() + delay);
            armed_for = Some(tracker.status());
            debug!(status = %tracker.status(), ?delay, "status timer armed");
        }

        tokio::select! {
            () = &mut timer, if armed => {
                match tracker.advance(Local::now()) {
                    Ok(status) => info!(status = %status, "order status advanced"),
                    Err(e) => debug!(reason = %e, "status timer fired without effect"),
                }
                updates.send_replace(tracker.clone());
            }
            request = commands.recv() => {
                let Some((command, reply)) = request else {
                    break;
                };
                let result = match command {
                    TrackingCommand::Confirm => tracker.confirm(Local::now()),
                    TrackingCommand::Cancel => tracker.cancel(Local::now()),
                };
                let reply_value = match result {
                    Ok(()) => {
                        info!(?command, status = %tracker.status(), "order status changed");
                        updates.send_replace(tracker.clone());
                        Ok(tracker.clone())
                    }
                    Err(e) => {
                        info!(?command, reason = %e, "order status command skipped");
                        Err(e)
                    }
                };
                let _ = reply.send(reply_value);
            }
        }
    }

    debug!(status = %tracker.status(), "status tracking finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(15);

    fn spawn(status: OrderStatus) -> TrackingSession {
        TrackingSession::spawn(StatusTracker::new(status, Local::now()), DELAY)
    }

    #[tokio::test(start_paused = true)]
    async fn three_timer_fires_deliver_the_order() {
        let start = Instant::now();
        let mut session = spawn(OrderStatus::Confirmed);

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(session.changed().await.unwrap().status());
        }
        assert_eq!(
            seen,
            [
                OrderStatus::Preparing,
                OrderStatus::OutForDelivery,
                OrderStatus::Delivered
            ]
        );
        assert!(start.elapsed() >= 3 * DELAY);
        assert!(start.elapsed() < 4 * DELAY);

        // nothing left to arm
        assert_eq!(session.changed().await, Err(TrackingError::SessionClosed));
        assert_eq!(session.snapshot().progress(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn every_transition_is_stamped() {
        let mut session = spawn(OrderStatus::Confirmed);
        let snapshot = session.changed().await.unwrap();
        assert!(snapshot.reached_at(OrderStatus::Confirmed).is_some());
        assert!(snapshot.reached_at(OrderStatus::Preparing).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_immediate_and_final() {
        let mut session = spawn(OrderStatus::Preparing);
        session.cancel().await.unwrap();
        assert_eq!(session.status(), OrderStatus::Cancelled);

        sleep(4 * DELAY).await;
        assert_eq!(session.status(), OrderStatus::Cancelled);
        assert_eq!(
            session.cancel().await,
            Err(TrackingError::Terminal(OrderStatus::Cancelled))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_command_keeps_the_timer_running() {
        let start = Instant::now();
        let mut session = spawn(OrderStatus::Confirmed);

        sleep(DELAY / 2).await;
        assert!(matches!(
            session.confirm().await,
            Err(TrackingError::InvalidTransition { .. })
        ));

        let snapshot = session.changed().await.unwrap();
        assert_eq!(snapshot.status(), OrderStatus::Preparing);
        assert!(start.elapsed() < DELAY + DELAY / 2);
    }

    #[tokio::test(start_paused = true)]
    async fn command_keeps_unseen_timer_update_visible() {
        let mut session = spawn(OrderStatus::Pending);
        session.confirm().await.unwrap();

        // the timer moves the order on while nobody is watching
        sleep(DELAY + Duration::from_millis(1)).await;
        assert_eq!(session.status(), OrderStatus::Preparing);

        session.cancel().await.unwrap();
        let snapshot = session.changed().await.unwrap();
        assert_eq!(snapshot.status(), OrderStatus::Cancelled);
        assert!(snapshot.reached_at(OrderStatus::Preparing).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn own_command_is_not_reported_as_a_change() {
        let mut session = spawn(OrderStatus::Pending);
        session.confirm().await.unwrap();

        let snapshot = session.changed().await.unwrap();
        assert_eq!(snapshot.status(), OrderStatus::Preparing);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_waits_for_confirmation() {
        let mut session = spawn(OrderStatus::Pending);
        sleep(4 * DELAY).await;
        assert_eq!(session.status(), OrderStatus::Pending);

        session.confirm().await.unwrap();
        assert_eq!(session.status(), OrderStatus::Confirmed);

        let snapshot = session.changed().await.unwrap();
        assert_eq!(snapshot.status(), OrderStatus::Preparing);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_session_disarms_the_timer() {
        let session = spawn(OrderStatus::Confirmed);
        let observer = session.subscribe();
        drop(session);

        sleep(4 * DELAY).await;
        assert_eq!(observer.borrow().status(), OrderStatus::Confirmed);
        assert!(!observer.has_changed().unwrap_or(false));
    }
}
