//! Runtime knobs for the ordering flow.
//!
//! Defaults reproduce the demo storefront. Each knob can be overridden from the
//! environment; a missing variable falls back silently (logged at info), an
//! unparsable one falls back with a warning.

use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::amount::{Amount, Rate};

pub const ENV_MERGE_POLICY: &str = "FOOD_ORDER_MERGE_POLICY";
pub const ENV_STRICT: &str = "FOOD_ORDER_STRICT";
pub const ENV_STATUS_DELAY_SECS: &str = "FOOD_ORDER_STATUS_DELAY_SECS";
pub const ENV_REQUIRE_CARD: &str = "FOOD_ORDER_REQUIRE_CARD";

/// How an add of an already present product is folded into the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// One row per product id. A repeated add sums the quantity and the latest
    /// add's name, price and customization win.
    #[default]
    ById,
    /// One row per product id and customization label.
    ByIdAndCustomization,
}

#[derive(Debug, Error)]
#[error("unknown merge policy '{0}', expected 'id' or 'id+customization'")]
pub struct ParseMergePolicyError(String);

impl FromStr for MergePolicy {
    type Err = ParseMergePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(MergePolicy::ById),
            "id+customization" => Ok(MergePolicy::ByIdAndCustomization),
            other => Err(ParseMergePolicyError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub merge_policy: MergePolicy,
    /// Reject invalid cart mutations with an error. When off, they are
    /// absorbed as logged no-ops.
    pub strict_mutations: bool,
    pub delivery_fee: Amount,
    pub tax_rate: Rate,
    /// Promo code (upper case) to percentage discount on the subtotal.
    pub promo_codes: HashMap<String, Rate>,
    /// Require card number, expiry and CVC when paying by card.
    pub require_card_details: bool,
    /// Delay between two automatic order status advances.
    pub status_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::ById,
            strict_mutations: true,
            delivery_fee: Amount::from_cents(299),
            tax_rate: Rate::from_percent(8),
            promo_codes: HashMap::new(),
            require_card_details: false,
            status_delay: Duration::from_secs(15),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, starting from the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            merge_policy: load(&lookup, ENV_MERGE_POLICY, defaults.merge_policy),
            strict_mutations: load(&lookup, ENV_STRICT, defaults.strict_mutations),
            require_card_details: load(&lookup, ENV_REQUIRE_CARD, defaults.require_card_details),
            status_delay: Duration::from_secs(load(
                &lookup,
                ENV_STATUS_DELAY_SECS,
                defaults.status_delay.as_secs(),
            )),
            ..defaults
        }
    }

    pub fn with_promo_code(mut self, code: &str, discount: Rate) -> Self {
        self.promo_codes.insert(code.trim().to_ascii_uppercase(), discount);
        self
    }
}

fn load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default:?}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}, using default: {default:?}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_storefront_constants() {
        let config = Config::default();
        assert_eq!(config.delivery_fee, Amount::from_float(2.99));
        assert_eq!(config.tax_rate, Rate::from_percent(8));
        assert_eq!(config.status_delay, Duration::from_secs(15));
        assert_eq!(config.merge_policy, MergePolicy::ById);
        assert!(config.strict_mutations);
        assert!(!config.require_card_details);
    }

    #[test]
    fn overrides_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_MERGE_POLICY, "id+customization"),
            (ENV_STRICT, "false"),
            (ENV_STATUS_DELAY_SECS, "2"),
            (ENV_REQUIRE_CARD, "true"),
        ]));
        assert_eq!(config.merge_policy, MergePolicy::ByIdAndCustomization);
        assert!(!config.strict_mutations);
        assert_eq!(config.status_delay, Duration::from_secs(2));
        assert!(config.require_card_details);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_MERGE_POLICY, "by-name"),
            (ENV_STATUS_DELAY_SECS, "soon"),
        ]));
        assert_eq!(config.merge_policy, MergePolicy::ById);
        assert_eq!(config.status_delay, Duration::from_secs(15));
    }

    #[test]
    fn promo_codes_are_upper_cased() {
        let config = Config::default().with_promo_code(" welcome10 ", Rate::from_percent(10));
        assert_eq!(config.promo_codes.get("WELCOME10"), Some(&Rate::from_percent(10)));
    }
}
