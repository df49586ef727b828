//! Payment model for invoicing-service.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::line_item::invalid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Bank,
    Card,
    Paypal,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Other => "other",
        }
    }
}

/// Only `Received` payments count towards an invoice's paid amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Received,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Received => "received",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    /// A cancelled payment stays cancelled.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        !matches!(
            (self, next),
            (PaymentStatus::Cancelled, PaymentStatus::Received)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub invoice_id: String,
    pub customer_id: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_received(&self) -> bool {
        self.status == PaymentStatus::Received
    }
}

fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("negative", "amount must not be negative"));
    }
    if value.scale() > 2 {
        return Err(invalid("precision", "amount must have at most two decimal places"));
    }
    Ok(())
}

/// Input for recording a payment. Customer and currency default to the
/// invoice's values.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreatePayment {
    #[validate(
        required(message = "invoice_id is required"),
        length(min = 1, message = "invoice_id is required")
    )]
    pub invoice_id: Option<String>,
    #[validate(length(min = 1))]
    pub customer_id: Option<String>,
    #[validate(required(message = "amount is required"), custom(function = "validate_amount"))]
    pub amount: Option<Decimal>,
    #[validate(length(equal = 3, message = "currency must be an ISO 4217 code"))]
    pub currency: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub method: Option<PaymentMethod>,
    #[validate(length(max = 200))]
    pub reference: Option<String>,
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Input for updating a payment. The invoice reference is fixed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePayment {
    #[validate(custom(function = "validate_amount"))]
    pub amount: Option<Decimal>,
    #[validate(length(equal = 3, message = "currency must be an ISO 4217 code"))]
    pub currency: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub method: Option<PaymentMethod>,
    #[validate(length(max = 200))]
    pub reference: Option<String>,
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}
