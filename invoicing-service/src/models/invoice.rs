//! Invoice model for invoicing-service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::line_item::{DocumentTotals, LineItem};
use super::patch::double_option;

/// Invoice status.
///
/// `Partial`, `Paid` and `Overdue` are settlement states derived from the
/// payments recorded against the invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses a new invoice may start in.
    pub fn is_initial(&self) -> bool {
        matches!(self, InvoiceStatus::Draft | InvoiceStatus::Sent)
    }

    /// Issued and not yet settled.
    pub fn is_open(&self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Partial)
    }

    /// Statuses that count towards revenue.
    pub fn is_revenue(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Partial)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: String,
    pub number: String,
    pub customer_id: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub issue_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub due_date: Option<DateTime<Utc>>,
    pub currency: String,
    pub status: InvoiceStatus,
    pub items: Vec<LineItem>,
    pub totals: DocumentTotals,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an invoice.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateInvoice {
    #[validate(
        required(message = "customer_id is required"),
        length(min = 1, message = "customer_id is required")
    )]
    pub customer_id: Option<String>,
    pub issue_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(length(equal = 3, message = "currency must be an ISO 4217 code"))]
    pub currency: Option<String>,
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<LineItem>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Input for updating an invoice. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateInvoice {
    #[validate(length(min = 1, message = "customer_id must not be empty"))]
    pub customer_id: Option<String>,
    pub issue_date: Option<DateTime<Utc>>,
    /// `null` clears the due date.
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[validate(length(equal = 3, message = "currency must be an ISO 4217 code"))]
    pub currency: Option<String>,
    pub status: Option<InvoiceStatus>,
    #[validate(nested)]
    pub items: Option<Vec<LineItem>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}
