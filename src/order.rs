//! The record handed to the (absent) order service once checkout succeeds.

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::cart::{Cart, CartTotals};
use crate::checkout::ValidatedCheckout;
use crate::model::{LineItem, OrderId, OrderStatus, Route};
use crate::tracking::StatusTracker;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    #[error("failed to encode order {id}: {source}")]
    Encode {
        id: OrderId,
        source: serde_json::Error,
    },
}

/// Plain serializable snapshot of a placed order: lines, totals and the
/// validated checkout fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub lines: Vec<LineItem>,
    pub totals: CartTotals,
    pub checkout: ValidatedCheckout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub special_instructions: String,
    pub placed_at: DateTime<Local>,
}

impl OrderRecord {
    /// Freeze the cart and the checkout into a record with a fresh order id.
    pub fn place(cart: &Cart, checkout: ValidatedCheckout) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let record = Self {
            id: Uuid::new_v4().to_string(),
            lines: cart.lines().to_vec(),
            totals: cart.totals(),
            checkout,
            promo_code: cart.promo().map(|p| p.code.clone()),
            special_instructions: cart.special_instructions().to_string(),
            placed_at: Local::now(),
        };
        info!(
            order = %record.id,
            lines = record.lines.len(),
            total = %record.totals.grand_total.round_to_cents(),
            "order placed"
        );

        Ok(record)
    }

    /// Where to go once the "order placed" confirmation is dismissed.
    pub fn tracking_route(&self) -> Route {
        Route::OrderTracking(self.id.clone())
    }

    /// A fresh order starts confirmed at the moment it was placed.
    pub fn tracker(&self) -> StatusTracker {
        StatusTracker::new(OrderStatus::Confirmed, self.placed_at)
    }

    pub fn to_json(&self) -> Result<String, OrderError> {
        serde_json::to_string_pretty(self).map_err(|source| OrderError::Encode {
            id: self.id.clone(),
            source,
        })
    }
}
