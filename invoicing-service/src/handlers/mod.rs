pub mod customers;
pub mod dashboard;
pub mod health;
pub mod invoices;
pub mod payments;
pub mod products;
pub mod quotes;

pub use health::{health_check, metrics_endpoint, readiness_check};
