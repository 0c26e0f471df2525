//! Core domain types shared by the catalog, cart, checkout and tracking flows.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Amount;

/// Catalog identifier of an orderable product (e.g. `m2`).
pub type ItemId = String;

/// Identifier of a row in the cart, unique within one cart.
pub type LineId = String;

/// Identifier of a restaurant in the listing.
pub type RestaurantId = String;

/// Identifier of a placed order.
pub type OrderId = String;

/// One orderable product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub id: LineId,
    pub product_id: ItemId,
    pub name: String,
    pub unit_price: Amount,
    pub quantity: u32,
    /// Caller-formatted summary such as `Size: Large, Extra Cheese`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization: Option<String>,
}

impl LineItem {
    pub fn line_total(&self) -> Amount {
        self.unit_price * self.quantity
    }
}

/// What the catalog hands to the cart when the user adds something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub product_id: ItemId,
    pub name: String,
    pub unit_price: Amount,
    pub customization: Option<String>,
}

impl ItemDraft {
    pub fn new(product_id: impl Into<ItemId>, name: impl Into<String>, unit_price: Amount) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            customization: None,
        }
    }

    pub fn with_customization(mut self, label: impl Into<String>) -> Self {
        self.customization = Some(label.into());
        self
    }
}

/// An immutable entry of the static menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub price: Amount,
    pub image_url: Option<String>,
    pub dietary_tags: Vec<String>,
    pub has_customizations: bool,
}

/// Lifecycle of an order as shown on the tracking page.
///
/// `Confirmed < Preparing < OutForDelivery < Delivered` form the automatic chain.
/// `Cancelled` is absorbing and sits outside that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The automatic progression, in order.
    pub const CHAIN: [OrderStatus; 4] = [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    /// Position in [`Self::CHAIN`], `None` for `Pending` and `Cancelled`.
    pub fn chain_index(self) -> Option<usize> {
        Self::CHAIN.iter().position(|s| *s == self)
    }

    /// Successor in the automatic chain.
    pub fn successor(self) -> Option<OrderStatus> {
        self.chain_index()
            .and_then(|idx| Self::CHAIN.get(idx + 1))
            .copied()
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Order Pending",
            OrderStatus::Confirmed => "Order Confirmed",
            OrderStatus::Preparing => "Preparing Food",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Order Cancelled",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation intent handed to the routing collaborator. Never performed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Back,
    Cart,
    Checkout,
    RestaurantMenu(RestaurantId),
    OrderTracking(OrderId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Back => "..".to_string(),
            Route::Cart => "/cart".to_string(),
            Route::Checkout => "/checkout".to_string(),
            Route::RestaurantMenu(id) => format!("/restaurants/{id}/menu"),
            Route::OrderTracking(id) => format!("/orders/{id}/tracking"),
        }
    }
}
