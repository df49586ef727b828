use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Product;

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub tax_rate: Decimal,
    pub unit: String,
    pub active: bool,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            sku: product.sku,
            name: product.name,
            price: product.price,
            tax_rate: product.tax_rate,
            unit: product.unit,
            active: product.active,
            description: product.description,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
        }
    }
}
