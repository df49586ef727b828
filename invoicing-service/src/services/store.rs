//! Persistence contract for billing records.
//!
//! `MongoDb` backs production deployments; `InMemoryStore` serves tests and
//! local development. Both honour the same atomicity guarantees for
//! `next_sequence`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use service_core::error::AppError;

use crate::models::{
    Customer, EntityCounts, Invoice, InvoiceRollup, InvoiceStatus, ListQuery, Page, Payment,
    Product, Quote,
};

#[async_trait]
pub trait BillingStore: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    /// Atomically increments the counter named `key` and returns the new
    /// value. A missing counter starts at zero, so the first call yields 1.
    async fn next_sequence(&self, key: &str) -> Result<i64, AppError>;

    async fn insert_customer(&self, customer: &Customer) -> Result<(), AppError>;
    async fn find_customer(&self, id: &str) -> Result<Option<Customer>, AppError>;
    /// Returns `false` when no customer with that id exists.
    async fn replace_customer(&self, customer: &Customer) -> Result<bool, AppError>;
    async fn delete_customer(&self, id: &str) -> Result<bool, AppError>;
    async fn list_customers(&self, query: &ListQuery) -> Result<Page<Customer>, AppError>;

    /// Fails with `Conflict` when the SKU is already taken.
    async fn insert_product(&self, product: &Product) -> Result<(), AppError>;
    async fn find_product(&self, id: &str) -> Result<Option<Product>, AppError>;
    /// Fails with `Conflict` when the new SKU belongs to another product.
    async fn replace_product(&self, product: &Product) -> Result<bool, AppError>;
    async fn delete_product(&self, id: &str) -> Result<bool, AppError>;
    async fn list_products(&self, query: &ListQuery) -> Result<Page<Product>, AppError>;

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), AppError>;
    async fn find_invoice(&self, id: &str) -> Result<Option<Invoice>, AppError>;
    async fn replace_invoice(&self, invoice: &Invoice) -> Result<bool, AppError>;
    /// Single-field status write used by the reconciler.
    async fn set_invoice_status(&self, id: &str, status: InvoiceStatus) -> Result<bool, AppError>;
    async fn delete_invoice(&self, id: &str) -> Result<bool, AppError>;
    async fn list_invoices(&self, query: &ListQuery) -> Result<Page<Invoice>, AppError>;

    async fn insert_quote(&self, quote: &Quote) -> Result<(), AppError>;
    async fn find_quote(&self, id: &str) -> Result<Option<Quote>, AppError>;
    async fn replace_quote(&self, quote: &Quote) -> Result<bool, AppError>;
    async fn delete_quote(&self, id: &str) -> Result<bool, AppError>;
    async fn list_quotes(&self, query: &ListQuery) -> Result<Page<Quote>, AppError>;

    async fn insert_payment(&self, payment: &Payment) -> Result<(), AppError>;
    async fn find_payment(&self, id: &str) -> Result<Option<Payment>, AppError>;
    async fn replace_payment(&self, payment: &Payment) -> Result<bool, AppError>;
    /// Removes the payment and returns it, so callers can reconcile its invoice.
    async fn delete_payment(&self, id: &str) -> Result<Option<Payment>, AppError>;
    async fn list_payments(
        &self,
        query: &ListQuery,
        invoice_id: Option<&str>,
    ) -> Result<Page<Payment>, AppError>;
    /// Sum of the amounts of all `received` payments against the invoice.
    async fn received_total(&self, invoice_id: &str) -> Result<Decimal, AppError>;

    async fn entity_counts(&self) -> Result<EntityCounts, AppError>;
    async fn invoice_rollups(&self) -> Result<Vec<InvoiceRollup>, AppError>;
}
