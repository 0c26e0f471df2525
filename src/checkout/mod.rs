//! Checkout form validation.
//!
//! The form holds raw field values while the user edits them. On [`submit`]
//! the rule list is evaluated synchronously: either every rule holds and a
//! [`ValidatedCheckout`] is handed back, or the form stays editable with one
//! message per failing field. The form never performs I/O itself.
//!
//! [`submit`]: CheckoutForm::submit

use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, info};

use crate::config::Config;

mod error;
pub use error::{CheckoutError, FieldErrors};

mod rules;
pub use rules::{BASE_RULES, CARD_RULES, Rule};

/// Value of `delivery_address` that selects the new-address sub-form.
pub const NEW_ADDRESS: &str = "new";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedAddress {
    pub id: &'static str,
    pub label: &'static str,
}

pub const SAVED_ADDRESSES: &[SavedAddress] = &[
    SavedAddress {
        id: "addr1",
        label: "Home - 123 Main St, Anytown, USA",
    },
    SavedAddress {
        id: "addr2",
        label: "Work - 456 Office Ave, Anytown, USA",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    DeliveryAddress,
    NewAddressStreet,
    NewAddressCity,
    NewAddressZip,
    PaymentMethod,
    CardNumber,
    CardExpiry,
    CardCvc,
    AgreeToTerms,
    ContactlessDelivery,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::DeliveryAddress => "delivery_address",
            Field::NewAddressStreet => "new_address_street",
            Field::NewAddressCity => "new_address_city",
            Field::NewAddressZip => "new_address_zip",
            Field::PaymentMethod => "payment_method",
            Field::CardNumber => "card_number",
            Field::CardExpiry => "card_expiry",
            Field::CardCvc => "card_cvc",
            Field::AgreeToTerms => "agree_to_terms",
            Field::ContactlessDelivery => "contactless_delivery",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The selected payment method. Values other than the three offered options
/// are carried through as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    Paypal,
    CashOnDelivery,
    Other(String),
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::CashOnDelivery => "cod",
            PaymentMethod::Other(value) => value,
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(value: &str) -> Self {
        match value.trim() {
            "card" => PaymentMethod::Card,
            "paypal" => PaymentMethod::Paypal,
            "cod" => PaymentMethod::CashOnDelivery,
            other => PaymentMethod::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Raw values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutFields {
    /// A saved address id, [`NEW_ADDRESS`], or free text.
    pub delivery_address: String,
    pub new_address_street: Option<String>,
    pub new_address_city: Option<String>,
    pub new_address_zip: Option<String>,
    pub payment_method: String,
    pub card_number: Option<String>,
    pub card_expiry: Option<String>,
    pub card_cvc: Option<String>,
    pub agree_to_terms: bool,
    pub contactless_delivery: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryAddress {
    Saved {
        id: String,
        label: String,
    },
    New {
        street: Option<String>,
        city: Option<String>,
        zip: Option<String>,
    },
    Entered {
        text: String,
    },
}

/// The checkout record handed to the order service once every rule holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedCheckout {
    pub address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    /// Only the last four digits of a card number leave the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    pub contactless_delivery: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitted,
}

pub struct CheckoutForm {
    fields: CheckoutFields,
    errors: FieldErrors,
    phase: FormPhase,
    require_card_details: bool,
}

impl CheckoutForm {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            fields: CheckoutFields::default(),
            errors: FieldErrors::default(),
            phase: FormPhase::Editing,
            require_card_details: config.require_card_details,
        }
    }

    pub fn fields(&self) -> &CheckoutFields {
        &self.fields
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(field)
    }

    /// Whether the new-address sub-form should be shown.
    pub fn shows_new_address_form(&self) -> bool {
        self.fields.delivery_address == NEW_ADDRESS
    }

    pub fn set_delivery_address(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.edit(Field::DeliveryAddress, |f| f.delivery_address = value);
    }

    pub fn set_new_address(&mut self, street: Option<String>, city: Option<String>, zip: Option<String>) {
        self.edit(Field::NewAddressStreet, |f| f.new_address_street = street);
        self.edit(Field::NewAddressCity, |f| f.new_address_city = city);
        self.edit(Field::NewAddressZip, |f| f.new_address_zip = zip);
    }

    pub fn set_payment_method(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.edit(Field::PaymentMethod, |f| f.payment_method = value);
    }

    pub fn set_card(&mut self, number: Option<String>, expiry: Option<String>, cvc: Option<String>) {
        self.edit(Field::CardNumber, |f| f.card_number = number);
        self.edit(Field::CardExpiry, |f| f.card_expiry = expiry);
        self.edit(Field::CardCvc, |f| f.card_cvc = cvc);
    }

    pub fn set_agree_to_terms(&mut self, value: bool) {
        self.edit(Field::AgreeToTerms, |f| f.agree_to_terms = value);
    }

    pub fn set_contactless_delivery(&mut self, value: bool) {
        self.edit(Field::ContactlessDelivery, |f| f.contactless_delivery = value);
    }

    /// Validate every field at once.
    ///
    /// On failure the form stays in [`FormPhase::Editing`] and the messages are
    /// also available through [`CheckoutForm::error`].
    pub fn submit(&mut self) -> Result<ValidatedCheckout, CheckoutError> {
        if self.phase == FormPhase::Submitted {
            return Err(CheckoutError::AlreadySubmitted);
        }

        let card_rules = if self.require_card_details {
            CARD_RULES
        } else {
            &[]
        };
        self.errors = rules::evaluate(BASE_RULES.iter().chain(card_rules), &self.fields);

        if !self.errors.is_empty() {
            info!(errors = self.errors.len(), "checkout rejected");
            return Err(CheckoutError::Invalid(self.errors.clone()));
        }

        let payment_method = PaymentMethod::from(self.fields.payment_method.as_str());
        let checkout = ValidatedCheckout {
            address: self.resolve_address(),
            card_last4: self.card_last4(&payment_method),
            payment_method,
            contactless_delivery: self.fields.contactless_delivery,
        };
        self.phase = FormPhase::Submitted;
        info!(payment = %checkout.payment_method, "checkout submitted");

        Ok(checkout)
    }
}

/// Private API
impl CheckoutForm {
    /// Update one field and clear its error. Ignored once submitted.
    fn edit(&mut self, field: Field, update: impl FnOnce(&mut CheckoutFields)) {
        if self.phase == FormPhase::Submitted {
            debug!(field = %field, "edit after submission ignored");
            return;
        }
        update(&mut self.fields);
        self.errors.clear(field);
    }

    fn resolve_address(&self) -> DeliveryAddress {
        let value = self.fields.delivery_address.trim();
        if value == NEW_ADDRESS {
            return DeliveryAddress::New {
                street: self.fields.new_address_street.clone(),
                city: self.fields.new_address_city.clone(),
                zip: self.fields.new_address_zip.clone(),
            };
        }
        match SAVED_ADDRESSES.iter().find(|saved| saved.id == value) {
            Some(saved) => DeliveryAddress::Saved {
                id: saved.id.to_string(),
                label: saved.label.to_string(),
            },
            None => DeliveryAddress::Entered {
                text: value.to_string(),
            },
        }
    }

    fn card_last4(&self, method: &PaymentMethod) -> Option<String> {
        if *method != PaymentMethod::Card {
            return None;
        }
        let digits: Vec<char> = self
            .fields
            .card_number
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (digits.len() >= 4).then(|| digits[digits.len() - 4..].iter().collect())
    }
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self::new()
    }
}
