pub mod amount;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod csv;
pub mod model;
pub mod order;
pub mod tracking;

pub use amount::{Amount, Rate};
pub use cart::{Cart, CartCommand, CartTotals};
pub use config::Config;
pub use model::{ItemDraft, LineItem, MenuItem, OrderStatus, Route};
