//! Invoice and quote lifecycles: numbering, totals and persistence.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::customers::ensure_customer_exists;
use super::metrics::record_document_created;
use super::reconciler::Reconciler;
use super::store::BillingStore;
use crate::billing::{calc_document_totals, DocumentKind};
use crate::models::{
    CreateInvoice, CreateQuote, Invoice, InvoiceStatus, ListQuery, Page, Quote, UpdateInvoice,
    UpdateQuote,
};

/// Draws the next number for `kind`. The year comes from `now` in UTC.
///
/// A number drawn for a document whose insert later fails is not reused.
pub async fn next_document_number(
    store: &dyn BillingStore,
    kind: DocumentKind,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let sequence = store.next_sequence(kind.sequence_key()).await?;
    Ok(kind.format_number(now.year(), sequence))
}

#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn BillingStore>,
    reconciler: Reconciler,
    default_currency: String,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn BillingStore>, reconciler: Reconciler, default_currency: String) -> Self {
        Self {
            store,
            reconciler,
            default_currency,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateInvoice) -> Result<Invoice, AppError> {
        input.validate()?;

        let customer_id = input
            .customer_id
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("customer_id is required")))?;
        ensure_customer_exists(self.store.as_ref(), &customer_id).await?;

        let status = input.status.unwrap_or_default();
        if !status.is_initial() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "An invoice cannot be created with status '{}'",
                status
            )));
        }

        let now = Utc::now();
        let number = next_document_number(self.store.as_ref(), DocumentKind::Invoice, now).await?;
        let totals = calc_document_totals(&input.items);

        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            number,
            customer_id,
            issue_date: input.issue_date.unwrap_or(now),
            due_date: input.due_date,
            currency: input
                .currency
                .unwrap_or_else(|| self.default_currency.clone()),
            status,
            items: input.items,
            totals,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_invoice(&invoice).await?;
        record_document_created(DocumentKind::Invoice);
        info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            gross = %invoice.totals.gross,
            "Invoice created"
        );
        Ok(invoice)
    }

    pub async fn get(&self, id: &str) -> Result<Invoice, AppError> {
        self.store
            .find_invoice(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice {} not found", id)))
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<Invoice>, AppError> {
        self.store.list_invoices(query).await
    }

    /// Merges the supplied fields. The number never changes and new items
    /// recompute the totals. Settlement status is only re-derived by payment
    /// writes or an explicit `reconcile`.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: UpdateInvoice) -> Result<Invoice, AppError> {
        input.validate()?;

        let mut invoice = self.get(id).await?;

        if let Some(status) = input.status {
            if status != invoice.status && self.store.received_total(id).await? > Decimal::ZERO {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Invoice {} has received payments; its status is derived from them",
                    invoice.number
                )));
            }
            invoice.status = status;
        }

        if let Some(customer_id) = input.customer_id {
            ensure_customer_exists(self.store.as_ref(), &customer_id).await?;
            invoice.customer_id = customer_id;
        }
        if let Some(items) = input.items {
            invoice.totals = calc_document_totals(&items);
            invoice.items = items;
        }
        if let Some(due_date) = input.due_date {
            invoice.due_date = due_date;
        }
        if let Some(issue_date) = input.issue_date {
            invoice.issue_date = issue_date;
        }
        if let Some(currency) = input.currency {
            invoice.currency = currency;
        }
        if input.notes.is_some() {
            invoice.notes = input.notes;
        }
        invoice.updated_at = Utc::now();

        if !self.store.replace_invoice(&invoice).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Invoice {} not found", id)));
        }
        info!(invoice_id = %invoice.id, status = %invoice.status, "Invoice updated");
        Ok(invoice)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_invoice(id).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Invoice {} not found", id)));
        }
        info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }

    /// Runs the reconciler on demand and returns the resulting invoice.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, id: &str) -> Result<Invoice, AppError> {
        self.reconciler.reconcile(id).await?;
        self.get(id).await
    }
}

#[derive(Clone)]
pub struct QuoteService {
    store: Arc<dyn BillingStore>,
    default_currency: String,
}

impl QuoteService {
    pub fn new(store: Arc<dyn BillingStore>, default_currency: String) -> Self {
        Self {
            store,
            default_currency,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateQuote) -> Result<Quote, AppError> {
        input.validate()?;

        let customer_id = input
            .customer_id
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("customer_id is required")))?;
        ensure_customer_exists(self.store.as_ref(), &customer_id).await?;

        let now = Utc::now();
        let number = next_document_number(self.store.as_ref(), DocumentKind::Quote, now).await?;
        let totals = calc_document_totals(&input.items);

        let quote = Quote {
            id: Uuid::new_v4().to_string(),
            number,
            customer_id,
            issue_date: input.issue_date.unwrap_or(now),
            valid_until: input.valid_until,
            currency: input
                .currency
                .unwrap_or_else(|| self.default_currency.clone()),
            status: input.status.unwrap_or_default(),
            items: input.items,
            totals,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_quote(&quote).await?;
        record_document_created(DocumentKind::Quote);
        info!(quote_id = %quote.id, number = %quote.number, "Quote created");
        Ok(quote)
    }

    pub async fn get(&self, id: &str) -> Result<Quote, AppError> {
        self.store
            .find_quote(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quote {} not found", id)))
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<Quote>, AppError> {
        self.store.list_quotes(query).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: UpdateQuote) -> Result<Quote, AppError> {
        input.validate()?;

        let mut quote = self.get(id).await?;

        if let Some(customer_id) = input.customer_id {
            ensure_customer_exists(self.store.as_ref(), &customer_id).await?;
            quote.customer_id = customer_id;
        }
        if let Some(items) = input.items {
            quote.totals = calc_document_totals(&items);
            quote.items = items;
        }
        if let Some(status) = input.status {
            quote.status = status;
        }
        if let Some(issue_date) = input.issue_date {
            quote.issue_date = issue_date;
        }
        if let Some(valid_until) = input.valid_until {
            quote.valid_until = valid_until;
        }
        if let Some(currency) = input.currency {
            quote.currency = currency;
        }
        if input.notes.is_some() {
            quote.notes = input.notes;
        }
        quote.updated_at = Utc::now();

        if !self.store.replace_quote(&quote).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Quote {} not found", id)));
        }
        Ok(quote)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_quote(id).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Quote {} not found", id)));
        }
        info!(quote_id = %id, "Quote deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateCustomer, LineItem};
    use crate::services::{CustomerService, InMemoryStore};
    use chrono::TimeZone;
    use std::str::FromStr;

    async fn setup() -> (Arc<InMemoryStore>, InvoiceService, String) {
        let store = Arc::new(InMemoryStore::new());
        let customers = CustomerService::new(store.clone());
        let customer = customers
            .create(CreateCustomer {
                name: "Acme GmbH".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let service = InvoiceService::new(
            store.clone(),
            Reconciler::new(store.clone()),
            "EUR".to_string(),
        );
        (store, service, customer.id)
    }

    fn line(quantity: &str, unit_price: &str) -> LineItem {
        LineItem {
            product_id: None,
            name: "Service".to_string(),
            quantity: Decimal::from_str(quantity).unwrap(),
            unit_price: Decimal::from_str(unit_price).unwrap(),
            tax_rate: Decimal::from(19),
        }
    }

    #[tokio::test]
    async fn numbers_follow_the_invoice_counter() {
        let store = InMemoryStore::new();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let first = next_document_number(&store, DocumentKind::Invoice, now).await.unwrap();
        let second = next_document_number(&store, DocumentKind::Invoice, now).await.unwrap();
        let quote = next_document_number(&store, DocumentKind::Quote, now).await.unwrap();
        assert_eq!(first, "I-2025-0001");
        assert_eq!(second, "I-2025-0002");
        assert_eq!(quote, "Q-2025-0001");
    }

    #[tokio::test]
    async fn create_defaults_to_draft_with_computed_totals() {
        let (_, service, customer_id) = setup().await;
        let invoice = service
            .create(CreateInvoice {
                customer_id: Some(customer_id),
                items: vec![line("3", "10.00")],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.currency, "EUR");
        assert_eq!(invoice.totals.gross.to_string(), "35.70");
    }

    #[tokio::test]
    async fn settlement_status_cannot_be_created_directly() {
        let (_, service, customer_id) = setup().await;
        let err = service
            .create(CreateInvoice {
                customer_id: Some(customer_id),
                status: Some(InvoiceStatus::Paid),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn failed_counter_leaves_no_invoice_behind() {
        let (store, service, customer_id) = setup().await;
        store.set_sequences_available(false);

        let err = service
            .create(CreateInvoice {
                customer_id: Some(customer_id),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StorageUnavailable(_)));
        let page = service.list(&ListQuery::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn update_recomputes_totals_and_keeps_number() {
        let (_, service, customer_id) = setup().await;
        let invoice = service
            .create(CreateInvoice {
                customer_id: Some(customer_id),
                items: vec![line("1", "10")],
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &invoice.id,
                UpdateInvoice {
                    items: Some(vec![line("2", "5"), line("1", "100")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.number, invoice.number);
        assert_eq!(updated.totals.net.to_string(), "110.00");
        assert_eq!(updated.totals.gross.to_string(), "130.90");
    }

    #[tokio::test]
    async fn explicit_status_survives_a_past_due_date() {
        let (_, service, customer_id) = setup().await;
        let invoice = service
            .create(CreateInvoice {
                customer_id: Some(customer_id),
                status: Some(InvoiceStatus::Sent),
                items: vec![line("1", "10")],
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &invoice.id,
                UpdateInvoice {
                    status: Some(InvoiceStatus::Cancelled),
                    due_date: Some(Some(Utc::now() - chrono::Duration::days(5))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, InvoiceStatus::Cancelled);
        let stored = service.get(&invoice.id).await.unwrap();
        assert_eq!(stored.status, InvoiceStatus::Cancelled);
    }

    #[tokio::test]
    async fn editing_items_does_not_settle_a_draft() {
        let (_, service, customer_id) = setup().await;
        let invoice = service
            .create(CreateInvoice {
                customer_id: Some(customer_id),
                due_date: Some(Utc::now() - chrono::Duration::days(5)),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = service
            .update(
                &invoice.id,
                UpdateInvoice {
                    items: Some(vec![line("2", "10")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, InvoiceStatus::Draft);
    }

    #[tokio::test]
    async fn null_due_date_clears_it() {
        let (_, service, customer_id) = setup().await;
        let invoice = service
            .create(CreateInvoice {
                customer_id: Some(customer_id),
                due_date: Some(Utc::now()),
                ..Default::default()
            })
            .await
            .unwrap();

        let untouched = service
            .update(&invoice.id, UpdateInvoice::default())
            .await
            .unwrap();
        assert!(untouched.due_date.is_some());

        let cleared = service
            .update(
                &invoice.id,
                UpdateInvoice {
                    due_date: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.due_date, None);
    }
}
