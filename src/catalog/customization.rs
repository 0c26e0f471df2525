use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::Amount;
use crate::model::{ItemDraft, MenuItem};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomizationError {
    #[error("Please select a size")]
    MissingSize,

    #[error("{0} cannot be customized")]
    NotCustomizable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        })
    }
}

/// Optional add-on with a fixed surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Topping {
    ExtraCheese,
    Olives,
}

impl Topping {
    pub const ALL: [Topping; 2] = [Topping::ExtraCheese, Topping::Olives];

    pub fn surcharge(self) -> Amount {
        match self {
            Topping::ExtraCheese => Amount::from_cents(100),
            Topping::Olives => Amount::from_cents(50),
        }
    }
}

impl fmt::Display for Topping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Topping::ExtraCheese => "Extra Cheese",
            Topping::Olives => "Olives",
        })
    }
}

/// Selections collected by the customization dialog.
///
/// Starts empty every time the dialog opens; a size must be picked before the
/// item can go to the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customization {
    pub size: Option<Size>,
    pub toppings: BTreeSet<Topping>,
}

impl Customization {
    pub fn select_size(&mut self, size: Size) {
        self.size = Some(size);
    }

    /// Flip a topping checkbox. Returns whether it is now selected.
    pub fn toggle_topping(&mut self, topping: Topping) -> bool {
        if self.toppings.remove(&topping) {
            false
        } else {
            self.toppings.insert(topping);
            true
        }
    }

    pub fn surcharge(&self) -> Amount {
        self.toppings.iter().map(|t| t.surcharge()).sum()
    }

    /// Cart label, e.g. `Size: Large, Extra Cheese, Olives`.
    pub fn label(&self) -> String {
        let size = self.size.map(|s| format!("Size: {s}"));
        size.into_iter()
            .chain(self.toppings.iter().map(Topping::to_string))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Turn the selections into a cart draft. The unit price carries the
    /// topping surcharges.
    pub fn apply_to(&self, item: &MenuItem) -> Result<ItemDraft, CustomizationError> {
        if !item.has_customizations {
            return Err(CustomizationError::NotCustomizable(item.name.clone()));
        }
        if self.size.is_none() {
            return Err(CustomizationError::MissingSize);
        }
        Ok(
            ItemDraft::new(item.id.clone(), item.name.clone(), item.price + self.surcharge())
                .with_customization(self.label()),
        )
    }
}
