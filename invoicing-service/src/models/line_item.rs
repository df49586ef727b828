//! Line item and document totals.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Tax rate in percent applied when a line item does not carry one.
pub const DEFAULT_TAX_RATE: u32 = 19;

/// Upper bound for quantity and unit price. Keeps line arithmetic far from
/// the 96-bit `Decimal` limit.
const MAX_LINE_VALUE: i64 = 1_000_000_000_000;

pub(super) fn default_tax_rate() -> Decimal {
    Decimal::from(DEFAULT_TAX_RATE)
}

/// A billed line on an invoice or quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[validate(length(min = 1, message = "line item name must not be empty"))]
    pub name: String,
    #[validate(custom(function = "validate_line_value"))]
    pub quantity: Decimal,
    #[validate(custom(function = "validate_line_value"))]
    pub unit_price: Decimal,
    /// Percent, e.g. `19` for 19 %.
    #[serde(default = "default_tax_rate")]
    #[validate(custom(function = "validate_tax_rate"))]
    pub tax_rate: Decimal,
}

/// Net, tax and gross amounts, each with two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub net: Decimal,
    pub tax: Decimal,
    pub gross: Decimal,
}

pub(super) fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub(super) fn validate_line_value(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("negative", "must not be negative"));
    }
    if *value > Decimal::from(MAX_LINE_VALUE) {
        return Err(invalid("too_large", "value is too large"));
    }
    Ok(())
}

pub(super) fn validate_tax_rate(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("negative", "must not be negative"));
    }
    if *value > Decimal::ONE_HUNDRED {
        return Err(invalid("too_large", "tax rate is a percentage between 0 and 100"));
    }
    Ok(())
}
