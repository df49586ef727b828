//! Recording payments and keeping their invoices reconciled.

use std::sync::Arc;

use chrono::Utc;
use service_core::error::AppError;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::metrics::{record_payment, record_reconciliation_failure};
use super::reconciler::Reconciler;
use super::store::BillingStore;
use crate::models::{CreatePayment, InvoiceStatus, ListQuery, Page, Payment, UpdatePayment};

/// A payment together with the invoice status reconciliation left behind.
/// `invoice_status` is `None` when reconciliation failed or the invoice is
/// gone.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub payment: Payment,
    pub invoice_status: Option<InvoiceStatus>,
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn BillingStore>,
    reconciler: Reconciler,
}

impl PaymentService {
    pub fn new(store: Arc<dyn BillingStore>, reconciler: Reconciler) -> Self {
        Self { store, reconciler }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreatePayment) -> Result<PaymentOutcome, AppError> {
        input.validate()?;

        let invoice_id = input
            .invoice_id
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("invoice_id is required")))?;
        let amount = input
            .amount
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("amount is required")))?;

        let invoice = self.store.find_invoice(&invoice_id).await?.ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!(
                "Invalid reference: invoice {} does not exist",
                invoice_id
            ))
        })?;

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            invoice_id,
            customer_id: input.customer_id.unwrap_or(invoice.customer_id),
            amount,
            currency: input.currency.unwrap_or(invoice.currency),
            date: input.date.unwrap_or(now),
            method: input.method.unwrap_or_default(),
            reference: input.reference,
            status: input.status.unwrap_or_default(),
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_payment(&payment).await?;
        record_payment(payment.method);
        info!(
            payment_id = %payment.id,
            invoice_id = %payment.invoice_id,
            amount = %payment.amount,
            "Payment recorded"
        );

        let invoice_status = self.settle(&payment.invoice_id).await;
        Ok(PaymentOutcome {
            payment,
            invoice_status,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Payment, AppError> {
        self.store
            .find_payment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payment {} not found", id)))
    }

    pub async fn list(
        &self,
        query: &ListQuery,
        invoice_id: Option<&str>,
    ) -> Result<Page<Payment>, AppError> {
        self.store.list_payments(query, invoice_id).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: UpdatePayment) -> Result<PaymentOutcome, AppError> {
        input.validate()?;

        let mut payment = self.get(id).await?;

        if let Some(status) = input.status {
            if !payment.status.can_transition_to(status) {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Payment status cannot change from '{}' to '{}'",
                    payment.status,
                    status
                )));
            }
            payment.status = status;
        }
        if let Some(amount) = input.amount {
            payment.amount = amount;
        }
        if let Some(currency) = input.currency {
            payment.currency = currency;
        }
        if let Some(date) = input.date {
            payment.date = date;
        }
        if let Some(method) = input.method {
            payment.method = method;
        }
        if input.reference.is_some() {
            payment.reference = input.reference;
        }
        if input.notes.is_some() {
            payment.notes = input.notes;
        }
        payment.updated_at = Utc::now();

        if !self.store.replace_payment(&payment).await? {
            return Err(AppError::NotFound(anyhow::anyhow!("Payment {} not found", id)));
        }
        info!(payment_id = %payment.id, status = %payment.status, "Payment updated");

        let invoice_status = self.settle(&payment.invoice_id).await;
        Ok(PaymentOutcome {
            payment,
            invoice_status,
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Option<InvoiceStatus>, AppError> {
        let payment = self
            .store
            .delete_payment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payment {} not found", id)))?;
        info!(payment_id = %id, invoice_id = %payment.invoice_id, "Payment deleted");

        Ok(self.settle(&payment.invoice_id).await)
    }

    /// Reconciles the invoice without failing the payment operation.
    async fn settle(&self, invoice_id: &str) -> Option<InvoiceStatus> {
        match self.reconciler.reconcile(invoice_id).await {
            Ok(outcome) => outcome.status(),
            Err(e) => {
                record_reconciliation_failure();
                warn!(invoice_id = %invoice_id, error = %e, "Invoice reconciliation failed");
                None
            }
        }
    }
}
