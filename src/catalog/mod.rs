//! Static menu and restaurant listing.
//!
//! The catalog is read-only. Its one decision is whether adding an item goes
//! straight to the cart or through the customization dialog first.

use crate::Amount;
use crate::model::{ItemDraft, MenuItem, RestaurantId};

mod customization;
pub use customization::{Customization, CustomizationError, Size, Topping};

mod listing;
pub use listing::{OFFERS_FILTER, Restaurant, RestaurantListing};

/// What pressing "add" on a menu card should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddAction {
    DirectAdd,
    OpenCustomization,
}

pub fn resolve_add_action(item: &MenuItem) -> AddAction {
    if item.has_customizations {
        AddAction::OpenCustomization
    } else {
        AddAction::DirectAdd
    }
}

/// Draft for an item added without customization.
pub fn direct_draft(item: &MenuItem) -> ItemDraft {
    ItemDraft::new(item.id.clone(), item.name.clone(), item.price)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub title: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuHeader {
    pub id: RestaurantId,
    pub name: String,
    pub address: String,
    pub opening_hours: String,
    pub cuisine: String,
}

/// Menu of one restaurant, categories in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub restaurant: MenuHeader,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(restaurant: MenuHeader, categories: Vec<Category>) -> Self {
        Self {
            restaurant,
            categories,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    pub fn find(&self, id: &str) -> Option<&MenuItem> {
        self.items().find(|item| item.id == id)
    }

    /// The demo menu of "Pizza Heaven".
    pub fn placeholder() -> Self {
        let item = |id: &str, name: &str, description: &str, cents: i64, tags: &[&str], custom: bool| MenuItem {
            id: id.into(),
            name: name.into(),
            description: Some(description.into()),
            price: Amount::from_cents(cents),
            image_url: None,
            dietary_tags: tags.iter().map(|t| t.to_string()).collect(),
            has_customizations: custom,
        };
        let category = |key: &str, title: &str, items: Vec<MenuItem>| Category {
            key: key.into(),
            title: title.into(),
            items,
        };

        Self::new(
            MenuHeader {
                id: "1".into(),
                name: "Pizza Heaven".into(),
                address: "123 Pizza St, Flavor Town".into(),
                opening_hours: "11:00 AM - 10:00 PM".into(),
                cuisine: "Italian, Pizza".into(),
            },
            vec![
                category(
                    "appetizers",
                    "Appetizers",
                    vec![item(
                        "m1",
                        "Garlic Bread",
                        "Toasted bread with garlic butter.",
                        599,
                        &["Vegetarian"],
                        true,
                    )],
                ),
                category(
                    "mainCourses",
                    "Main Courses",
                    vec![
                        item(
                            "m2",
                            "Margherita Pizza",
                            "Classic cheese and tomato pizza.",
                            1299,
                            &["Vegetarian"],
                            true,
                        ),
                        item(
                            "m3",
                            "Pepperoni Pizza",
                            "Pizza with pepperoni slices.",
                            1499,
                            &[],
                            false,
                        ),
                    ],
                ),
                category(
                    "desserts",
                    "Desserts",
                    vec![item(
                        "m4",
                        "Chocolate Lava Cake",
                        "Warm chocolate cake with a gooey center.",
                        750,
                        &["Vegetarian"],
                        false,
                    )],
                ),
            ],
        )
    }
}
