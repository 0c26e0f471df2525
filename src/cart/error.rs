//! Error types for cart mutations.

use thiserror::Error;

use crate::amount::Amount;
use crate::model::LineId;

/// Reason a cart command was rejected. The cart is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("quantity must be at least 1 for line {id}, got {requested}")]
    QuantityBelowMinimum { id: LineId, requested: u32 },

    #[error("negative price {price} for line {id}")]
    NegativePrice { id: LineId, price: Amount },

    #[error("line {0} not found")]
    LineNotFound(LineId),

    #[error("unknown promo code '{0}'")]
    UnknownPromoCode(String),
}
