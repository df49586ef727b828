//! Catalogue entries that line items may reference by `product_id`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::line_item::{default_tax_rate, validate_line_value, validate_tax_rate};

pub const DEFAULT_UNIT: &str = "pc";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    /// Unique across the catalogue.
    pub sku: String,
    pub name: String,
    /// Net unit price.
    pub price: Decimal,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    pub unit: String,
    pub active: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 64, message = "sku is required"))]
    pub sku: String,
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(required(message = "price is required"), custom(function = "validate_line_value"))]
    pub price: Option<Decimal>,
    #[validate(custom(function = "validate_tax_rate"))]
    pub tax_rate: Option<Decimal>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    pub active: Option<bool>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 64, message = "sku must not be empty"))]
    pub sku: Option<String>,
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_line_value"))]
    pub price: Option<Decimal>,
    #[validate(custom(function = "validate_tax_rate"))]
    pub tax_rate: Option<Decimal>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    pub active: Option<bool>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_price_is_rejected() {
        let input = CreateProduct {
            sku: "SKU-1".to_string(),
            name: "Widget".to_string(),
            price: Some(Decimal::new(-100, 2)),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn price_is_required() {
        let input = CreateProduct {
            sku: "SKU-1".to_string(),
            name: "Widget".to_string(),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }
}
