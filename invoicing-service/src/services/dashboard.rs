//! Read-only rollups: headline figures, recent activity and chart series.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;

use super::store::BillingStore;
use crate::billing::round_money;
use crate::models::{
    ChartPeriod, Customer, EntityCounts, Invoice, InvoiceRollup, InvoiceStatus, ListQuery,
    Payment,
};

/// Entries in the activity feed.
pub const ACTIVITY_LIMIT: usize = 15;
const RECENT_DOCUMENTS: u64 = 10;
const RECENT_CUSTOMERS: u64 = 5;
pub const TOP_CUSTOMERS: usize = 5;
const UNKNOWN_CUSTOMER: &str = "Unknown";

const STATUS_ORDER: [InvoiceStatus; 6] = [
    InvoiceStatus::Draft,
    InvoiceStatus::Sent,
    InvoiceStatus::Partial,
    InvoiceStatus::Paid,
    InvoiceStatus::Overdue,
    InvoiceStatus::Cancelled,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    pub count: u64,
    pub total: Decimal,
}

impl Bucket {
    fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.total += amount;
    }

    fn rounded(self) -> Self {
        Self {
            count: self.count,
            total: round_money(self.total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub counts: EntityCounts,
    pub revenue_month: Decimal,
    pub revenue_year: Decimal,
    pub open_invoices: Bucket,
    pub overdue_invoices: Bucket,
}

/// Folds invoice rollups into the dashboard figures as of `now`.
pub fn summarize(counts: EntityCounts, rollups: &[InvoiceRollup], now: DateTime<Utc>) -> DashboardStats {
    let mut revenue_month = Decimal::ZERO;
    let mut revenue_year = Decimal::ZERO;
    let mut open_invoices = Bucket::default();
    let mut overdue_invoices = Bucket::default();

    for invoice in rollups {
        if invoice.status.is_revenue() && invoice.issue_date.year() == now.year() {
            revenue_year += invoice.gross;
            if invoice.issue_date.month() == now.month() {
                revenue_month += invoice.gross;
            }
        }
        if invoice.status.is_open() {
            open_invoices.add(invoice.gross);
        }
        let past_due = invoice.due_date.is_some_and(|due| due < now);
        if past_due && matches!(invoice.status, InvoiceStatus::Sent | InvoiceStatus::Overdue) {
            overdue_invoices.add(invoice.gross);
        }
    }

    DashboardStats {
        counts,
        revenue_month: round_money(revenue_month),
        revenue_year: round_money(revenue_year),
        open_invoices: open_invoices.rounded(),
        overdue_invoices: overdue_invoices.rounded(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Invoice,
    Payment,
    Customer,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Invoice => "invoice",
            ActivityKind::Payment => "payment",
            ActivityKind::Customer => "customer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub kind: ActivityKind,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub status: String,
}

fn customer_name<'a>(names: &'a HashMap<String, String>, id: &str) -> &'a str {
    names.get(id).map(String::as_str).unwrap_or(UNKNOWN_CUSTOMER)
}

/// Merges recent records into one feed, newest first, capped at
/// `ACTIVITY_LIMIT`.
pub fn build_activity(
    invoices: &[Invoice],
    payments: &[Payment],
    customers: &[Customer],
    names: &HashMap<String, String>,
) -> Vec<Activity> {
    let mut feed = Vec::with_capacity(invoices.len() + payments.len() + customers.len());

    feed.extend(invoices.iter().map(|invoice| Activity {
        kind: ActivityKind::Invoice,
        date: invoice.created_at,
        title: format!("Invoice {}", invoice.number),
        description: format!(
            "{} - {} {}",
            customer_name(names, &invoice.customer_id),
            invoice.totals.gross,
            invoice.currency
        ),
        status: invoice.status.as_str().to_string(),
    }));
    feed.extend(payments.iter().map(|payment| Activity {
        kind: ActivityKind::Payment,
        date: payment.created_at,
        title: "Payment received".to_string(),
        description: format!(
            "{} - {} {}",
            customer_name(names, &payment.customer_id),
            payment.amount,
            payment.currency
        ),
        status: payment.status.as_str().to_string(),
    }));
    feed.extend(customers.iter().map(|customer| Activity {
        kind: ActivityKind::Customer,
        date: customer.created_at,
        title: "New customer".to_string(),
        description: customer.name.clone(),
        status: "new".to_string(),
    }));

    feed.sort_by(|a, b| b.date.cmp(&a.date));
    feed.truncate(ACTIVITY_LIMIT);
    feed
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenuePoint {
    pub label: String,
    pub revenue: Decimal,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerTotal {
    pub customer_id: String,
    pub name: String,
    pub total: Decimal,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusShare {
    pub status: InvoiceStatus,
    pub count: u64,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartData {
    pub period: ChartPeriod,
    pub revenue: Vec<RevenuePoint>,
    pub top_customers: Vec<CustomerTotal>,
    pub status_distribution: Vec<StatusShare>,
}

/// Revenue per chart point for `paid`/`partial` invoices issued inside the
/// window, oldest point first.
pub fn revenue_series(
    rollups: &[InvoiceRollup],
    period: ChartPeriod,
    now: DateTime<Utc>,
) -> Vec<RevenuePoint> {
    let start = period.start(now);
    let mut points: BTreeMap<String, Bucket> = BTreeMap::new();

    for invoice in rollups
        .iter()
        .filter(|invoice| invoice.status.is_revenue() && invoice.issue_date >= start)
    {
        points
            .entry(period.bucket_label(invoice.issue_date))
            .or_default()
            .add(invoice.gross);
    }

    points
        .into_iter()
        .map(|(label, bucket)| RevenuePoint {
            label,
            revenue: round_money(bucket.total),
            count: bucket.count,
        })
        .collect()
}

/// Gross billed per customer inside the window, largest first. Ties are
/// broken by customer id.
pub fn rank_customers(
    rollups: &[InvoiceRollup],
    period: ChartPeriod,
    now: DateTime<Utc>,
) -> Vec<(String, Bucket)> {
    let start = period.start(now);
    let mut totals: HashMap<&str, Bucket> = HashMap::new();

    for invoice in rollups.iter().filter(|invoice| invoice.issue_date >= start) {
        totals
            .entry(invoice.customer_id.as_str())
            .or_default()
            .add(invoice.gross);
    }

    let mut ranked: Vec<(String, Bucket)> = totals
        .into_iter()
        .map(|(id, bucket)| (id.to_string(), bucket.rounded()))
        .collect();
    ranked.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Count and gross per invoice status over all invoices. Statuses with no
/// invoices are omitted.
pub fn status_distribution(rollups: &[InvoiceRollup]) -> Vec<StatusShare> {
    let mut by_status: HashMap<InvoiceStatus, Bucket> = HashMap::new();
    for invoice in rollups {
        by_status.entry(invoice.status).or_default().add(invoice.gross);
    }

    STATUS_ORDER
        .iter()
        .filter_map(|status| {
            by_status.get(status).map(|bucket| StatusShare {
                status: *status,
                count: bucket.count,
                total: round_money(bucket.total),
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn BillingStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let counts = self.store.entity_counts().await?;
        let rollups = self.store.invoice_rollups().await?;
        Ok(summarize(counts, &rollups, Utc::now()))
    }

    pub async fn activity(&self) -> Result<Vec<Activity>, AppError> {
        let recent = |size| ListQuery::new(Some(1), Some(size), None, None);

        let invoices = self.store.list_invoices(&recent(RECENT_DOCUMENTS)).await?.items;
        let payments = self
            .store
            .list_payments(&recent(RECENT_DOCUMENTS), None)
            .await?
            .items;
        let customers = self.store.list_customers(&recent(RECENT_CUSTOMERS)).await?.items;

        let ids = invoices
            .iter()
            .map(|invoice| invoice.customer_id.as_str())
            .chain(payments.iter().map(|payment| payment.customer_id.as_str()));
        let names = self.customer_names(ids).await?;

        Ok(build_activity(&invoices, &payments, &customers, &names))
    }

    pub async fn charts(&self, period: ChartPeriod) -> Result<ChartData, AppError> {
        let now = Utc::now();
        let rollups = self.store.invoice_rollups().await?;

        // Invoices of deleted customers drop out of the ranking.
        let mut top_customers = Vec::with_capacity(TOP_CUSTOMERS);
        for (customer_id, bucket) in rank_customers(&rollups, period, now) {
            if top_customers.len() == TOP_CUSTOMERS {
                break;
            }
            if let Some(customer) = self.store.find_customer(&customer_id).await? {
                top_customers.push(CustomerTotal {
                    customer_id,
                    name: customer.name,
                    total: bucket.total,
                    count: bucket.count,
                });
            }
        }

        Ok(ChartData {
            period,
            revenue: revenue_series(&rollups, period, now),
            top_customers,
            status_distribution: status_distribution(&rollups),
        })
    }

    async fn customer_names<'a>(
        &self,
        ids: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, AppError> {
        let mut names = HashMap::new();
        for id in ids.collect::<BTreeSet<_>>() {
            if let Some(customer) = self.store.find_customer(id).await? {
                names.insert(customer.id, customer.name);
            }
        }
        Ok(names)
    }
}
