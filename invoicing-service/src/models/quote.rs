use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::line_item::{DocumentTotals, LineItem};
use super::patch::double_option;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: String,
    pub number: String,
    pub customer_id: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub issue_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub valid_until: Option<DateTime<Utc>>,
    pub currency: String,
    pub status: QuoteStatus,
    pub items: Vec<LineItem>,
    pub totals: DocumentTotals,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateQuote {
    #[validate(
        required(message = "customer_id is required"),
        length(min = 1, message = "customer_id is required")
    )]
    pub customer_id: Option<String>,
    pub issue_date: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[validate(length(equal = 3, message = "currency must be an ISO 4217 code"))]
    pub currency: Option<String>,
    pub status: Option<QuoteStatus>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<LineItem>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuote {
    #[validate(length(min = 1, message = "customer_id must not be empty"))]
    pub customer_id: Option<String>,
    pub issue_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub valid_until: Option<Option<DateTime<Utc>>>,
    #[validate(length(equal = 3, message = "currency must be an ISO 4217 code"))]
    pub currency: Option<String>,
    pub status: Option<QuoteStatus>,
    #[validate(nested)]
    pub items: Option<Vec<LineItem>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}
