use serde::Serialize;

use crate::models::{DocumentTotals, Invoice, InvoiceStatus, LineItem, Quote, QuoteStatus};

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub number: String,
    pub customer_id: String,
    pub issue_date: String,
    pub due_date: Option<String>,
    pub currency: String,
    pub status: InvoiceStatus,
    pub items: Vec<LineItem>,
    pub totals: DocumentTotals,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            number: invoice.number,
            customer_id: invoice.customer_id,
            issue_date: invoice.issue_date.to_rfc3339(),
            due_date: invoice.due_date.map(|d| d.to_rfc3339()),
            currency: invoice.currency,
            status: invoice.status,
            items: invoice.items,
            totals: invoice.totals,
            notes: invoice.notes,
            created_at: invoice.created_at.to_rfc3339(),
            updated_at: invoice.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub id: String,
    pub number: String,
    pub customer_id: String,
    pub issue_date: String,
    pub valid_until: Option<String>,
    pub currency: String,
    pub status: QuoteStatus,
    pub items: Vec<LineItem>,
    pub totals: DocumentTotals,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            id: quote.id,
            number: quote.number,
            customer_id: quote.customer_id,
            issue_date: quote.issue_date.to_rfc3339(),
            valid_until: quote.valid_until.map(|d| d.to_rfc3339()),
            currency: quote.currency,
            status: quote.status,
            items: quote.items,
            totals: quote.totals,
            notes: quote.notes,
            created_at: quote.created_at.to_rfc3339(),
            updated_at: quote.updated_at.to_rfc3339(),
        }
    }
}
