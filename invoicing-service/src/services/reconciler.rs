//! Keeps an invoice's settlement status in line with its received payments.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use service_core::error::AppError;
use tracing::{debug, info, instrument, warn};

use super::metrics::record_reconciliation;
use super::store::BillingStore;
use crate::billing::{derive_settlement_status, SettlementInput};
use crate::models::InvoiceStatus;

/// Upper bound on derive-and-write passes within one run.
const MAX_PASSES: u32 = 5;

/// What a reconciliation run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    InvoiceMissing,
    Unchanged(InvoiceStatus),
    Changed {
        previous: InvoiceStatus,
        current: InvoiceStatus,
    },
}

impl Reconciliation {
    /// Status of the invoice after the run, if it exists.
    pub fn status(&self) -> Option<InvoiceStatus> {
        match self {
            Reconciliation::InvoiceMissing => None,
            Reconciliation::Unchanged(status) => Some(*status),
            Reconciliation::Changed { current, .. } => Some(*current),
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            Reconciliation::InvoiceMissing => "invoice_missing",
            Reconciliation::Unchanged(_) => "unchanged",
            Reconciliation::Changed { .. } => "changed",
        }
    }
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn BillingStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    pub async fn reconcile(&self, invoice_id: &str) -> Result<Reconciliation, AppError> {
        self.reconcile_at(invoice_id, Utc::now()).await
    }

    /// Recomputes the status from the full set of received payments and
    /// writes it only when it differs, so repeated runs converge.
    ///
    /// After a write the received total is read again. If a concurrent
    /// payment write moved it, the run starts over so a status derived from
    /// a stale total is never left behind.
    #[instrument(skip(self, now))]
    pub async fn reconcile_at(
        &self,
        invoice_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Reconciliation, AppError> {
        let mut first_status = None;
        let mut pass = 0;

        loop {
            pass += 1;
            let Some(invoice) = self.store.find_invoice(invoice_id).await? else {
                debug!("Invoice no longer exists, nothing to reconcile");
                record_reconciliation(Reconciliation::InvoiceMissing.outcome());
                return Ok(Reconciliation::InvoiceMissing);
            };
            let previous = *first_status.get_or_insert(invoice.status);

            let paid_amount = self.store.received_total(invoice_id).await?;
            let derived = derive_settlement_status(
                &SettlementInput {
                    current: invoice.status,
                    gross: invoice.totals.gross,
                    due_date: invoice.due_date,
                    paid_amount,
                },
                now,
            );

            if derived == invoice.status {
                let outcome = if derived == previous {
                    Reconciliation::Unchanged(derived)
                } else {
                    Reconciliation::Changed {
                        previous,
                        current: derived,
                    }
                };
                record_reconciliation(outcome.outcome());
                return Ok(outcome);
            }

            if !self.store.set_invoice_status(invoice_id, derived).await? {
                record_reconciliation(Reconciliation::InvoiceMissing.outcome());
                return Ok(Reconciliation::InvoiceMissing);
            }

            let settled = self.store.received_total(invoice_id).await? == paid_amount;
            if settled || pass == MAX_PASSES {
                if !settled {
                    warn!(
                        number = %invoice.number,
                        passes = MAX_PASSES,
                        "Received total kept changing during reconciliation"
                    );
                }
                info!(
                    number = %invoice.number,
                    previous = %previous,
                    current = %derived,
                    paid = %paid_amount,
                    "Invoice status reconciled"
                );
                let outcome = Reconciliation::Changed {
                    previous,
                    current: derived,
                };
                record_reconciliation(outcome.outcome());
                return Ok(outcome);
            }
            debug!(pass, "Received total moved after write, reconciling again");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentTotals, Invoice, Payment, PaymentMethod, PaymentStatus};
    use crate::services::InMemoryStore;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn invoice(gross: i64, due_date: Option<DateTime<Utc>>) -> Invoice {
        let now = Utc::now();
        Invoice {
            id: "inv-1".to_string(),
            number: "I-2025-0001".to_string(),
            customer_id: "cust-1".to_string(),
            issue_date: now,
            due_date,
            currency: "EUR".to_string(),
            status: InvoiceStatus::Sent,
            items: vec![],
            totals: DocumentTotals {
                net: Decimal::from(gross),
                tax: Decimal::ZERO,
                gross: Decimal::from(gross),
            },
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn payment(id: &str, amount: i64, status: PaymentStatus) -> Payment {
        let now = Utc::now();
        Payment {
            id: id.to_string(),
            invoice_id: "inv-1".to_string(),
            customer_id: "cust-1".to_string(),
            amount: Decimal::from(amount),
            currency: "EUR".to_string(),
            date: now,
            method: PaymentMethod::Bank,
            reference: None,
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn second_run_is_unchanged() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_invoice(&invoice(50, None)).await.unwrap();
        store
            .insert_payment(&payment("p1", 50, PaymentStatus::Received))
            .await
            .unwrap();
        let reconciler = Reconciler::new(store.clone());

        assert_eq!(
            reconciler.reconcile("inv-1").await.unwrap(),
            Reconciliation::Changed {
                previous: InvoiceStatus::Sent,
                current: InvoiceStatus::Paid
            }
        );
        assert_eq!(
            reconciler.reconcile("inv-1").await.unwrap(),
            Reconciliation::Unchanged(InvoiceStatus::Paid)
        );
    }

    #[tokio::test]
    async fn cancelled_payments_are_ignored() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_invoice(&invoice(100, None)).await.unwrap();
        store
            .insert_payment(&payment("p1", 30, PaymentStatus::Received))
            .await
            .unwrap();
        store
            .insert_payment(&payment("p2", 70, PaymentStatus::Cancelled))
            .await
            .unwrap();

        let outcome = Reconciler::new(store.clone()).reconcile("inv-1").await.unwrap();
        assert_eq!(outcome.status(), Some(InvoiceStatus::Partial));
    }

    #[tokio::test]
    async fn past_due_partial_payment_is_overdue() {
        let now = Utc::now();
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_invoice(&invoice(100, Some(now - Duration::days(2))))
            .await
            .unwrap();
        store
            .insert_payment(&payment("p1", 40, PaymentStatus::Received))
            .await
            .unwrap();

        let outcome = Reconciler::new(store.clone())
            .reconcile_at("inv-1", now)
            .await
            .unwrap();
        assert_eq!(outcome.status(), Some(InvoiceStatus::Overdue));
        let stored = store.find_invoice("inv-1").await.unwrap().unwrap();
        assert_eq!(stored.status, InvoiceStatus::Overdue);
    }

    #[tokio::test]
    async fn missing_invoice_is_reported() {
        let store = Arc::new(InMemoryStore::new());
        let outcome = Reconciler::new(store).reconcile("nope").await.unwrap();
        assert_eq!(outcome, Reconciliation::InvoiceMissing);
        assert_eq!(outcome.status(), None);
    }
}
