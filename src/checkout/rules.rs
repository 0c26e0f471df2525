use super::{CheckoutFields, Field, FieldErrors, PaymentMethod};

/// One validation rule: the field it reports on, the predicate that must hold
/// and the message shown next to the field when it does not.
#[derive(Clone, Copy)]
pub struct Rule {
    pub field: Field,
    pub check: fn(&CheckoutFields) -> bool,
    pub message: &'static str,
}

/// Always evaluated, in order. The first failing rule of a field wins.
pub const BASE_RULES: &[Rule] = &[
    Rule {
        field: Field::DeliveryAddress,
        check: has_delivery_address,
        message: "Please select or enter a delivery address.",
    },
    Rule {
        field: Field::PaymentMethod,
        check: has_payment_method,
        message: "Please select a payment method.",
    },
    Rule {
        field: Field::AgreeToTerms,
        check: agreed_to_terms,
        message: "You must agree to the terms and conditions.",
    },
];

/// Card sub-fields, only evaluated when card details are required.
pub const CARD_RULES: &[Rule] = &[
    Rule {
        field: Field::CardNumber,
        check: card_number_present,
        message: "Please enter your card number.",
    },
    Rule {
        field: Field::CardExpiry,
        check: card_expiry_present,
        message: "Please enter the card expiry date.",
    },
    Rule {
        field: Field::CardCvc,
        check: card_cvc_present,
        message: "Please enter the card security code.",
    },
];

/// Evaluate `rules` against `fields`, collecting one message per failing field.
pub fn evaluate<'a>(rules: impl IntoIterator<Item = &'a Rule>, fields: &CheckoutFields) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for rule in rules {
        if !(rule.check)(fields) {
            errors.insert_first(rule.field, rule.message);
        }
    }
    errors
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn has_delivery_address(fields: &CheckoutFields) -> bool {
    !fields.delivery_address.trim().is_empty()
}

fn has_payment_method(fields: &CheckoutFields) -> bool {
    !fields.payment_method.trim().is_empty()
}

fn agreed_to_terms(fields: &CheckoutFields) -> bool {
    fields.agree_to_terms
}

fn paying_by_card(fields: &CheckoutFields) -> bool {
    PaymentMethod::from(fields.payment_method.as_str()) == PaymentMethod::Card
}

fn card_number_present(fields: &CheckoutFields) -> bool {
    !paying_by_card(fields) || filled(&fields.card_number)
}

fn card_expiry_present(fields: &CheckoutFields) -> bool {
    !paying_by_card(fields) || filled(&fields.card_expiry)
}

fn card_cvc_present(fields: &CheckoutFields) -> bool {
    !paying_by_card(fields) || filled(&fields.card_cvc)
}
