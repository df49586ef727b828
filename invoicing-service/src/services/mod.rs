pub mod customers;
pub mod dashboard;
pub mod database;
pub mod documents;
pub mod memory;
pub mod metrics;
pub mod payments;
pub mod products;
pub mod reconciler;
pub mod store;

pub use customers::CustomerService;
pub use dashboard::{
    Activity, ActivityKind, Bucket, ChartData, CustomerTotal, DashboardService, DashboardStats,
    RevenuePoint, StatusShare,
};
pub use database::MongoDb;
pub use documents::{InvoiceService, QuoteService};
pub use memory::InMemoryStore;
pub use payments::{PaymentOutcome, PaymentService};
pub use products::ProductService;
pub use reconciler::{Reconciler, Reconciliation};
pub use store::BillingStore;
