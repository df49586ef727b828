use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::store::BillingStore;
use crate::models::{
    CreateProduct, ListQuery, Page, Product, UpdateProduct, DEFAULT_TAX_RATE, DEFAULT_UNIT,
};

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn BillingStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateProduct) -> Result<Product, AppError> {
        input.validate()?;

        let price = input
            .price
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("price is required")))?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: input.sku.trim().to_string(),
            name: input.name.trim().to_string(),
            price,
            tax_rate: input
                .tax_rate
                .unwrap_or_else(|| Decimal::from(DEFAULT_TAX_RATE)),
            unit: input.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            active: input.active.unwrap_or(true),
            description: input.description,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_product(&product).await?;
        info!(product_id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    pub async fn get(&self, id: &str) -> Result<Product, AppError> {
        self.store
            .find_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Product {} not found", id)))
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<Product>, AppError> {
        self.store.list_products(query).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: UpdateProduct) -> Result<Product, AppError> {
        input.validate()?;

        let mut product = self.get(id).await?;
        if let Some(sku) = input.sku {
            product.sku = sku.trim().to_string();
        }
        if let Some(name) = input.name {
            product.name = name.trim().to_string();
        }
        if let Some(price) = input.price {
            product.price = price;
        }
        if let Some(tax_rate) = input.tax_rate {
            product.tax_rate = tax_rate;
        }
        if let Some(unit) = input.unit {
            product.unit = unit;
        }
        if let Some(active) = input.active {
            product.active = active;
        }
        if input.description.is_some() {
            product.description = input.description;
        }
        product.updated_at = Utc::now();

        if !self.store.replace_product(&product).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Product {} not found", id)));
        }
        Ok(product)
    }

    /// Line items keep their `product_id` after the product is gone.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_product(id).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Product {} not found", id)));
        }
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryStore;

    fn widget(sku: &str) -> CreateProduct {
        CreateProduct {
            sku: sku.to_string(),
            name: "Widget".to_string(),
            price: Some(Decimal::new(1250, 2)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_applies_catalogue_defaults() {
        let service = ProductService::new(Arc::new(InMemoryStore::new()));
        let product = service.create(widget(" W-1 ")).await.unwrap();

        assert_eq!(product.sku, "W-1");
        assert_eq!(product.tax_rate, Decimal::from(19));
        assert_eq!(product.unit, "pc");
        assert!(product.active);
    }

    #[tokio::test]
    async fn sku_must_be_unique() {
        let service = ProductService::new(Arc::new(InMemoryStore::new()));
        service.create(widget("W-1")).await.unwrap();
        let other = service.create(widget("W-2")).await.unwrap();

        let err = service.create(widget("W-1")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service
            .update(
                &other.id,
                UpdateProduct {
                    sku: Some("W-1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let renamed = service
            .update(
                &other.id,
                UpdateProduct {
                    name: Some("Gadget".to_string()),
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.sku, "W-2");
        assert!(!renamed.active);
    }
}
