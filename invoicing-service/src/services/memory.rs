//! In-process `BillingStore` backed by `DashMap`.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use service_core::error::AppError;

use super::store::BillingStore;
use crate::models::{
    Customer, EntityCounts, Invoice, InvoiceRollup, InvoiceStatus, ListQuery, Page, Payment,
    Product, Quote, QuoteStatus,
};

pub struct InMemoryStore {
    customers: DashMap<String, Customer>,
    products: DashMap<String, Product>,
    invoices: DashMap<String, Invoice>,
    quotes: DashMap<String, Quote>,
    payments: DashMap<String, Payment>,
    sequences: DashMap<String, i64>,
    sequences_available: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            customers: DashMap::new(),
            products: DashMap::new(),
            invoices: DashMap::new(),
            quotes: DashMap::new(),
            payments: DashMap::new(),
            sequences: DashMap::new(),
            sequences_available: AtomicBool::new(true),
        }
    }

    /// Simulates losing the counter store. While unavailable,
    /// `next_sequence` fails with `StorageUnavailable`.
    pub fn set_sequences_available(&self, available: bool) {
        self.sequences_available.store(available, Ordering::SeqCst);
    }

    fn ensure_sku_free(&self, product: &Product) -> Result<(), AppError> {
        let taken = self.products.iter().any(|entry| {
            let other = entry.value();
            other.sku == product.sku && other.id != product.id
        });
        if taken {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Product SKU {} already exists",
                product.sku
            )));
        }
        Ok(())
    }

    /// Current value of a counter without incrementing it.
    pub fn sequence_value(&self, key: &str) -> Option<i64> {
        self.sequences.get(key).map(|entry| *entry.value())
    }
}

/// Records that can be listed, searched and sorted by creation time.
trait Listed: Clone {
    fn created_at(&self) -> DateTime<Utc>;
    fn id(&self) -> &str;
    /// `needle` is already lowercased.
    fn matches(&self, needle: &str) -> bool;
}

fn contains(field: &str, needle: &str) -> bool {
    field.to_lowercase().contains(needle)
}

fn contains_opt(field: Option<&String>, needle: &str) -> bool {
    field.is_some_and(|value| contains(value, needle))
}

impl Listed for Customer {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle) || contains_opt(self.email.as_ref(), needle)
    }
}

impl Listed for Product {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle) || contains(&self.sku, needle)
    }
}

impl Listed for Invoice {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn matches(&self, needle: &str) -> bool {
        contains(&self.number, needle) || contains(self.status.as_str(), needle)
    }
}

impl Listed for Quote {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn matches(&self, needle: &str) -> bool {
        contains(&self.number, needle) || contains(self.status.as_str(), needle)
    }
}

impl Listed for Payment {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn id(&self) -> &str {
        &self.id
    }
    fn matches(&self, needle: &str) -> bool {
        contains(self.method.as_str(), needle) || contains_opt(self.reference.as_ref(), needle)
    }
}

fn paginate<T: Listed>(mut rows: Vec<T>, query: &ListQuery) -> Page<T> {
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        rows.retain(|row| row.matches(&needle));
    }

    rows.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
    if query.newest_first {
        rows.reverse();
    }

    let total = rows.len() as u64;
    let items = rows
        .into_iter()
        .skip(query.skip() as usize)
        .take(query.page_size as usize)
        .collect();

    Page {
        items,
        total,
        page: query.page,
        page_size: query.page_size,
    }
}

fn snapshot<T: Clone>(map: &DashMap<String, T>) -> Vec<T> {
    map.iter().map(|entry| entry.value().clone()).collect()
}

fn insert_new<T: Clone>(map: &DashMap<String, T>, id: &str, value: &T) -> Result<(), AppError> {
    use dashmap::mapref::entry::Entry;

    match map.entry(id.to_string()) {
        Entry::Occupied(_) => Err(AppError::Conflict(anyhow::anyhow!(
            "Record {} already exists",
            id
        ))),
        Entry::Vacant(slot) => {
            slot.insert(value.clone());
            Ok(())
        }
    }
}

fn replace_existing<T: Clone>(map: &DashMap<String, T>, id: &str, value: &T) -> bool {
    match map.get_mut(id) {
        Some(mut entry) => {
            *entry = value.clone();
            true
        }
        None => false,
    }
}

#[async_trait]
impl BillingStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn next_sequence(&self, key: &str) -> Result<i64, AppError> {
        if !self.sequences_available.load(Ordering::SeqCst) {
            return Err(AppError::StorageUnavailable(anyhow::anyhow!(
                "Sequence store is unavailable"
            )));
        }
        let mut counter = self.sequences.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn insert_customer(&self, customer: &Customer) -> Result<(), AppError> {
        insert_new(&self.customers, &customer.id, customer)
    }

    async fn find_customer(&self, id: &str) -> Result<Option<Customer>, AppError> {
        Ok(self.customers.get(id).map(|entry| entry.value().clone()))
    }

    async fn replace_customer(&self, customer: &Customer) -> Result<bool, AppError> {
        Ok(replace_existing(&self.customers, &customer.id, customer))
    }

    async fn delete_customer(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.customers.remove(id).is_some())
    }

    async fn list_customers(&self, query: &ListQuery) -> Result<Page<Customer>, AppError> {
        Ok(paginate(snapshot(&self.customers), query))
    }

    async fn insert_product(&self, product: &Product) -> Result<(), AppError> {
        self.ensure_sku_free(product)?;
        insert_new(&self.products, &product.id, product)
    }

    async fn find_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        Ok(self.products.get(id).map(|entry| entry.value().clone()))
    }

    async fn replace_product(&self, product: &Product) -> Result<bool, AppError> {
        self.ensure_sku_free(product)?;
        Ok(replace_existing(&self.products, &product.id, product))
    }

    async fn delete_product(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.products.remove(id).is_some())
    }

    async fn list_products(&self, query: &ListQuery) -> Result<Page<Product>, AppError> {
        Ok(paginate(snapshot(&self.products), query))
    }

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), AppError> {
        if self
            .invoices
            .iter()
            .any(|entry| entry.value().number == invoice.number)
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Invoice number {} already exists",
                invoice.number
            )));
        }
        insert_new(&self.invoices, &invoice.id, invoice)
    }

    async fn find_invoice(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        Ok(self.invoices.get(id).map(|entry| entry.value().clone()))
    }

    async fn replace_invoice(&self, invoice: &Invoice) -> Result<bool, AppError> {
        Ok(replace_existing(&self.invoices, &invoice.id, invoice))
    }

    async fn set_invoice_status(&self, id: &str, status: InvoiceStatus) -> Result<bool, AppError> {
        match self.invoices.get_mut(id) {
            Some(mut invoice) => {
                invoice.status = status;
                invoice.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_invoice(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.invoices.remove(id).is_some())
    }

    async fn list_invoices(&self, query: &ListQuery) -> Result<Page<Invoice>, AppError> {
        Ok(paginate(snapshot(&self.invoices), query))
    }

    async fn insert_quote(&self, quote: &Quote) -> Result<(), AppError> {
        if self
            .quotes
            .iter()
            .any(|entry| entry.value().number == quote.number)
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Quote number {} already exists",
                quote.number
            )));
        }
        insert_new(&self.quotes, &quote.id, quote)
    }

    async fn find_quote(&self, id: &str) -> Result<Option<Quote>, AppError> {
        Ok(self.quotes.get(id).map(|entry| entry.value().clone()))
    }

    async fn replace_quote(&self, quote: &Quote) -> Result<bool, AppError> {
        Ok(replace_existing(&self.quotes, &quote.id, quote))
    }

    async fn delete_quote(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.quotes.remove(id).is_some())
    }

    async fn list_quotes(&self, query: &ListQuery) -> Result<Page<Quote>, AppError> {
        Ok(paginate(snapshot(&self.quotes), query))
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), AppError> {
        insert_new(&self.payments, &payment.id, payment)
    }

    async fn find_payment(&self, id: &str) -> Result<Option<Payment>, AppError> {
        Ok(self.payments.get(id).map(|entry| entry.value().clone()))
    }

    async fn replace_payment(&self, payment: &Payment) -> Result<bool, AppError> {
        Ok(replace_existing(&self.payments, &payment.id, payment))
    }

    async fn delete_payment(&self, id: &str) -> Result<Option<Payment>, AppError> {
        Ok(self.payments.remove(id).map(|(_, payment)| payment))
    }

    async fn list_payments(
        &self,
        query: &ListQuery,
        invoice_id: Option<&str>,
    ) -> Result<Page<Payment>, AppError> {
        let rows = self
            .payments
            .iter()
            .filter(|entry| invoice_id.map_or(true, |id| entry.value().invoice_id == id))
            .map(|entry| entry.value().clone())
            .collect();
        Ok(paginate(rows, query))
    }

    async fn received_total(&self, invoice_id: &str) -> Result<Decimal, AppError> {
        Ok(self
            .payments
            .iter()
            .filter(|entry| entry.value().invoice_id == invoice_id && entry.value().is_received())
            .map(|entry| entry.value().amount)
            .sum())
    }

    async fn entity_counts(&self) -> Result<EntityCounts, AppError> {
        Ok(EntityCounts {
            customers: self.customers.len() as u64,
            products: self.products.len() as u64,
            invoices: self.invoices.len() as u64,
            quotes: self.quotes.len() as u64,
            open_quotes: self
                .quotes
                .iter()
                .filter(|entry| entry.value().status == QuoteStatus::Sent)
                .count() as u64,
        })
    }

    async fn invoice_rollups(&self) -> Result<Vec<InvoiceRollup>, AppError> {
        Ok(self
            .invoices
            .iter()
            .map(|entry| {
                let invoice = entry.value();
                InvoiceRollup {
                    customer_id: invoice.customer_id.clone(),
                    status: invoice.status,
                    issue_date: invoice.issue_date,
                    due_date: invoice.due_date,
                    gross: invoice.totals.gross,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequences_start_at_one_per_key() {
        let store = InMemoryStore::new();
        assert_eq!(store.next_sequence("invoice").await.unwrap(), 1);
        assert_eq!(store.next_sequence("invoice").await.unwrap(), 2);
        assert_eq!(store.next_sequence("quote").await.unwrap(), 1);
        assert_eq!(store.sequence_value("invoice"), Some(2));
    }

    #[tokio::test]
    async fn unavailable_sequences_do_not_increment() {
        let store = InMemoryStore::new();
        store.set_sequences_available(false);
        let err = store.next_sequence("invoice").await.unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
        assert_eq!(store.sequence_value("invoice"), None);
    }
}
