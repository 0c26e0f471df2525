use serde::Serialize;

use crate::amount::{Amount, Rate};
use crate::model::LineItem;

/// Money summary derived from the cart lines. Never stored, recomputed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    pub subtotal: Amount,
    pub delivery_fee: Amount,
    pub tax: Amount,
    pub discount: Amount,
    pub grand_total: Amount,
}

impl CartTotals {
    /// The delivery fee only applies to a non-empty cart. Tax is computed on
    /// the undiscounted subtotal.
    pub fn compute(
        lines: &[LineItem],
        delivery_fee: Amount,
        tax_rate: Rate,
        discount_rate: Option<Rate>,
    ) -> Self {
        let subtotal: Amount = lines.iter().map(LineItem::line_total).sum();
        let delivery_fee = if lines.is_empty() {
            Amount::ZERO
        } else {
            delivery_fee
        };
        let tax = subtotal.apply_rate(tax_rate);
        let discount = discount_rate.map_or(Amount::ZERO, |rate| subtotal.apply_rate(rate));

        Self {
            subtotal,
            delivery_fee,
            tax,
            discount,
            grand_total: subtotal + delivery_fee + tax - discount,
        }
    }
}
