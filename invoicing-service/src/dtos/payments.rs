use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{InvoiceStatus, Payment, PaymentMethod, PaymentStatus};
use crate::services::PaymentOutcome;

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub invoice_id: String,
    pub customer_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub date: String,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            invoice_id: payment.invoice_id,
            customer_id: payment.customer_id,
            amount: payment.amount,
            currency: payment.currency,
            date: payment.date.to_rfc3339(),
            method: payment.method,
            reference: payment.reference,
            status: payment.status,
            notes: payment.notes,
            created_at: payment.created_at.to_rfc3339(),
            updated_at: payment.updated_at.to_rfc3339(),
        }
    }
}

/// Returned by payment writes: the payment plus the reconciled invoice status,
/// `null` when reconciliation did not complete.
#[derive(Debug, Serialize)]
pub struct PaymentOutcomeResponse {
    #[serde(flatten)]
    pub payment: PaymentResponse,
    pub invoice_status: Option<InvoiceStatus>,
}

impl From<PaymentOutcome> for PaymentOutcomeResponse {
    fn from(outcome: PaymentOutcome) -> Self {
        Self {
            payment: outcome.payment.into(),
            invoice_status: outcome.invoice_status,
        }
    }
}
