use std::collections::BTreeSet;

use crate::model::{RestaurantId, Route};

/// Filter id that matches sponsored restaurants instead of a cuisine.
pub const OFFERS_FILTER: &str = "offers";

#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub image_url: Option<String>,
    pub cuisine_types: Vec<String>,
    pub rating: f32,
    pub delivery_time: String,
    pub price_range: String,
    pub sponsored: bool,
}

impl Restaurant {
    fn matches(&self, filter: &str) -> bool {
        if filter == OFFERS_FILTER {
            return self.sponsored;
        }
        self.cuisine_types
            .iter()
            .any(|cuisine| cuisine.eq_ignore_ascii_case(filter))
    }
}

/// The restaurant listing screen: restaurants plus the active cuisine chips.
#[derive(Debug, Clone, Default)]
pub struct RestaurantListing {
    restaurants: Vec<Restaurant>,
    active_filters: BTreeSet<String>,
}

impl RestaurantListing {
    pub fn new(restaurants: Vec<Restaurant>) -> Self {
        Self {
            restaurants,
            active_filters: BTreeSet::new(),
        }
    }

    pub fn placeholder() -> Self {
        let restaurant = |id: &str, name: &str, cuisines: &[&str], rating: f32, time: &str, price: &str| {
            Restaurant {
                id: id.into(),
                name: name.into(),
                image_url: None,
                cuisine_types: cuisines.iter().map(|c| c.to_string()).collect(),
                rating,
                delivery_time: time.into(),
                price_range: price.into(),
                sponsored: false,
            }
        };
        Self::new(vec![
            Restaurant {
                sponsored: true,
                ..restaurant("1", "Pizza Heaven", &["Pizza", "Italian"], 4.5, "25-35 min", "$$")
            },
            restaurant("2", "Burger Joint", &["Burgers", "Fast Food"], 4.2, "20-30 min", "$"),
            restaurant("3", "Sushi World", &["Sushi", "Japanese"], 4.8, "30-40 min", "$$$"),
        ])
    }

    /// Flip a filter chip. Returns whether it is now active.
    pub fn toggle_filter(&mut self, filter: &str) -> bool {
        let filter = filter.to_ascii_lowercase();
        if self.active_filters.remove(&filter) {
            false
        } else {
            self.active_filters.insert(filter);
            true
        }
    }

    pub fn active_filters(&self) -> impl Iterator<Item = &str> {
        self.active_filters.iter().map(String::as_str)
    }

    /// Restaurants matching any active filter, or all of them when none is active.
    pub fn visible(&self) -> Vec<&Restaurant> {
        self.restaurants
            .iter()
            .filter(|r| {
                self.active_filters.is_empty() || self.active_filters.iter().any(|f| r.matches(f))
            })
            .collect()
    }

    pub fn open(&self, id: &str) -> Option<Route> {
        self.restaurants
            .iter()
            .find(|r| r.id == id)
            .map(|r| Route::RestaurantMenu(r.id.clone()))
    }
}
