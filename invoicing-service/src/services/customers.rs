use std::sync::Arc;

use chrono::Utc;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::store::BillingStore;
use crate::models::{CreateCustomer, Customer, ListQuery, Page, UpdateCustomer};

/// Fails with `NotFound` unless the customer exists.
pub(crate) async fn ensure_customer_exists(
    store: &dyn BillingStore,
    customer_id: &str,
) -> Result<(), AppError> {
    match store.find_customer(customer_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(anyhow::anyhow!(
            "Customer {} not found",
            customer_id
        ))),
    }
}

#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn BillingStore>,
}

impl CustomerService {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateCustomer) -> Result<Customer, AppError> {
        input.validate()?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            email: input.email,
            phone: input.phone,
            address: input.address,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_customer(&customer).await?;
        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn get(&self, id: &str) -> Result<Customer, AppError> {
        self.store
            .find_customer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer {} not found", id)))
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<Customer>, AppError> {
        self.store.list_customers(query).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: UpdateCustomer) -> Result<Customer, AppError> {
        input.validate()?;

        let mut customer = self.get(id).await?;
        if let Some(name) = input.name {
            customer.name = name.trim().to_string();
        }
        if input.email.is_some() {
            customer.email = input.email;
        }
        if input.phone.is_some() {
            customer.phone = input.phone;
        }
        if input.address.is_some() {
            customer.address = input.address;
        }
        if input.notes.is_some() {
            customer.notes = input.notes;
        }
        customer.updated_at = Utc::now();

        if !self.store.replace_customer(&customer).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Customer {} not found", id)));
        }
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_customer(id).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Customer {} not found", id)));
        }
        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }
}
