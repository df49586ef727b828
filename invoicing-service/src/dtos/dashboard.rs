use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ChartPeriod, InvoiceStatus};
use crate::services::{
    Activity, Bucket, ChartData, CustomerTotal, DashboardStats, RevenuePoint, StatusShare,
};

#[derive(Debug, Serialize)]
pub struct BucketResponse {
    pub count: u64,
    pub total: Decimal,
}

impl From<Bucket> for BucketResponse {
    fn from(bucket: Bucket) -> Self {
        Self {
            count: bucket.count,
            total: bucket.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevenueResponse {
    pub month: Decimal,
    pub year: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub customers: u64,
    pub products: u64,
    pub invoices: u64,
    pub quotes: u64,
    pub open_quotes: u64,
    pub revenue: RevenueResponse,
    pub open_invoices: BucketResponse,
    pub overdue_invoices: BucketResponse,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            customers: stats.counts.customers,
            products: stats.counts.products,
            invoices: stats.counts.invoices,
            quotes: stats.counts.quotes,
            open_quotes: stats.counts.open_quotes,
            revenue: RevenueResponse {
                month: stats.revenue_month,
                year: stats.revenue_year,
            },
            open_invoices: stats.open_invoices.into(),
            overdue_invoices: stats.overdue_invoices.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityEntryResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub date: String,
    pub title: String,
    pub description: String,
    pub status: String,
}

impl From<Activity> for ActivityEntryResponse {
    fn from(activity: Activity) -> Self {
        Self {
            kind: activity.kind.as_str(),
            date: activity.date.to_rfc3339(),
            title: activity.title,
            description: activity.description,
            status: activity.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub activities: Vec<ActivityEntryResponse>,
}

impl From<Vec<Activity>> for ActivityResponse {
    fn from(feed: Vec<Activity>) -> Self {
        Self {
            activities: feed.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    /// `week`, `month` (default) or `year`.
    pub period: Option<String>,
}

impl ChartParams {
    pub fn period(&self) -> ChartPeriod {
        ChartPeriod::from_param(self.period.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct RevenuePointResponse {
    pub label: String,
    pub revenue: Decimal,
    pub count: u64,
}

impl From<RevenuePoint> for RevenuePointResponse {
    fn from(point: RevenuePoint) -> Self {
        Self {
            label: point.label,
            revenue: point.revenue,
            count: point.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopCustomerResponse {
    pub customer_id: String,
    pub name: String,
    pub total: Decimal,
    pub count: u64,
}

impl From<CustomerTotal> for TopCustomerResponse {
    fn from(total: CustomerTotal) -> Self {
        Self {
            customer_id: total.customer_id,
            name: total.name,
            total: total.total,
            count: total.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusShareResponse {
    pub status: InvoiceStatus,
    pub count: u64,
    pub total: Decimal,
}

impl From<StatusShare> for StatusShareResponse {
    fn from(share: StatusShare) -> Self {
        Self {
            status: share.status,
            count: share.count,
            total: share.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChartsResponse {
    pub period: &'static str,
    pub revenue: Vec<RevenuePointResponse>,
    pub top_customers: Vec<TopCustomerResponse>,
    pub status_distribution: Vec<StatusShareResponse>,
}

impl From<ChartData> for ChartsResponse {
    fn from(data: ChartData) -> Self {
        Self {
            period: data.period.as_str(),
            revenue: data.revenue.into_iter().map(Into::into).collect(),
            top_customers: data.top_customers.into_iter().map(Into::into).collect(),
            status_distribution: data.status_distribution.into_iter().map(Into::into).collect(),
        }
    }
}
