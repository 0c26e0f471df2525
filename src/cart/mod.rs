//! Cart aggregation.
//!
//! The cart holds an ordered list of line items and derives the money summary
//! on every read. Mutations arrive as [`CartCommand`]s, either one at a time
//! through [`Cart::apply`] or as an async stream through [`Cart::run`].

use std::collections::HashMap;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::amount::{Amount, Rate};
use crate::config::{Config, MergePolicy};
use crate::model::{ItemDraft, LineId, LineItem};

mod error;
pub use error::CartError;

mod totals;
pub use totals::CartTotals;

/// A user action on the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    /// Insert a new row or fold into the row with the same merge key.
    Add { item: ItemDraft, quantity: u32 },
    /// Replace the quantity of an existing row.
    SetQuantity { id: LineId, quantity: u32 },
    /// Drop a row.
    Remove { id: LineId },
}

impl CartCommand {
    fn kind(&self) -> &'static str {
        match self {
            CartCommand::Add { .. } => "add",
            CartCommand::SetQuantity { .. } => "set quantity",
            CartCommand::Remove { .. } => "remove",
        }
    }

    fn target(&self) -> &str {
        match self {
            CartCommand::Add { item, .. } => &item.product_id,
            CartCommand::SetQuantity { id, .. } | CartCommand::Remove { id } => id,
        }
    }
}

/// A promo code accepted by [`Cart::apply_promo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPromo {
    pub code: String,
    pub discount: Rate,
}

/// The cart view-model.
pub struct Cart {
    lines: Vec<LineItem>,
    merge_policy: MergePolicy,
    /// When false, rejected commands are absorbed and reported as success
    strict: bool,
    delivery_fee: Amount,
    tax_rate: Rate,
    promo_codes: HashMap<String, Rate>,
    promo: Option<AppliedPromo>,
    special_instructions: String,
}

/// Public API
impl Cart {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            lines: Vec::new(),
            merge_policy: config.merge_policy,
            strict: config.strict_mutations,
            delivery_fee: config.delivery_fee,
            tax_rate: config.tax_rate,
            promo_codes: config.promo_codes.clone(),
            promo: None,
            special_instructions: String::new(),
        }
    }

    /// Run the cart with the given command stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = CartCommand> + Unpin) {
        while let Some(command) = stream.next().await {
            // a rejected command must not stop the stream, the result is already logged
            let _ = self.apply(command);
        }
    }

    /// Apply a single command on top of the current cart state
    pub fn apply(&mut self, command: CartCommand) -> Result<(), CartError> {
        let kind = command.kind();
        let target = command.target().to_string();

        let result = match command {
            CartCommand::Add { item, quantity } => self.apply_add(item, quantity),
            CartCommand::SetQuantity { id, quantity } => self.apply_set_quantity(id, quantity),
            CartCommand::Remove { id } => self.apply_remove(id),
        };
        Self::log_result(kind, &target, &result);

        match result {
            Err(e) if !self.strict => {
                debug!(line = %target, reason = %e, "{kind} absorbed as no-op");
                Ok(())
            }
            other => other,
        }
    }

    pub fn add_item(&mut self, item: ItemDraft, quantity: u32) -> Result<(), CartError> {
        self.apply(CartCommand::Add { item, quantity })
    }

    pub fn set_quantity(&mut self, id: impl Into<LineId>, quantity: u32) -> Result<(), CartError> {
        self.apply(CartCommand::SetQuantity {
            id: id.into(),
            quantity,
        })
    }

    pub fn remove_item(&mut self, id: impl Into<LineId>) -> Result<(), CartError> {
        self.apply(CartCommand::Remove { id: id.into() })
    }

    /// Look a promo code up (case-insensitive) and attach its discount.
    /// An unknown code leaves any previously applied promo in place.
    pub fn apply_promo(&mut self, code: &str) -> Result<&AppliedPromo, CartError> {
        let code = code.trim().to_ascii_uppercase();
        let Some(discount) = self.promo_codes.get(&code).copied() else {
            info!(code = %code, "promo code rejected");
            return Err(CartError::UnknownPromoCode(code));
        };
        info!(code = %code, discount = %discount, "promo code applied");
        Ok(self.promo.insert(AppliedPromo { code, discount }))
    }

    pub fn promo(&self) -> Option<&AppliedPromo> {
        self.promo.as_ref()
    }

    pub fn set_special_instructions(&mut self, text: impl Into<String>) {
        self.special_instructions = text.into();
    }

    pub fn special_instructions(&self) -> &str {
        &self.special_instructions
    }

    /// Rows in insertion order.
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of units across all rows, as shown on the cart badge.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(
            &self.lines,
            self.delivery_fee,
            self.tax_rate,
            self.promo.as_ref().map(|p| p.discount),
        )
    }
}

/// Private API
impl Cart {
    fn log_result(kind: &str, target: &str, result: &Result<(), CartError>) {
        match result {
            Ok(()) => info!(line = %target, "{kind} applied"),
            Err(e) => info!(line = %target, reason = %e, "{kind} skipped"),
        }
    }

    fn line_id_for(&self, item: &ItemDraft) -> LineId {
        match (self.merge_policy, &item.customization) {
            (MergePolicy::ByIdAndCustomization, Some(label)) => {
                format!("{}|{}", item.product_id, label)
            }
            _ => item.product_id.clone(),
        }
    }

    /// Apply a `CartCommand::Add`:
    /// - Reject a zero quantity or a negative unit price
    /// - Fold into the row with the same line id, the latest add's details win
    /// - Otherwise append a new row
    fn apply_add(&mut self, item: ItemDraft, quantity: u32) -> Result<(), CartError> {
        let id = self.line_id_for(&item);
        if quantity < 1 {
            return Err(CartError::QuantityBelowMinimum {
                id,
                requested: quantity,
            });
        }
        if item.unit_price < Amount::ZERO {
            return Err(CartError::NegativePrice {
                id,
                price: item.unit_price,
            });
        }

        match self.lines.iter_mut().find(|line| line.id == id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.name = item.name;
                line.unit_price = item.unit_price;
                line.customization = item.customization;
            }
            None => self.lines.push(LineItem {
                id,
                product_id: item.product_id,
                name: item.name,
                unit_price: item.unit_price,
                quantity,
                customization: item.customization,
            }),
        }

        Ok(())
    }

    /// Apply a `CartCommand::SetQuantity`. No upper bound.
    fn apply_set_quantity(&mut self, id: LineId, quantity: u32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::QuantityBelowMinimum {
                id,
                requested: quantity,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(CartError::LineNotFound(id))?;
        line.quantity = quantity;

        Ok(())
    }

    /// Apply a `CartCommand::Remove`. Removing an absent row changes nothing.
    fn apply_remove(&mut self, id: LineId) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        if self.lines.len() == before {
            return Err(CartError::LineNotFound(id));
        }
        Ok(())
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}
