pub mod customers;
pub mod dashboard;
pub mod documents;
pub mod pagination;
pub mod payments;
pub mod products;

pub use customers::CustomerResponse;
pub use dashboard::{ActivityResponse, ChartParams, ChartsResponse, DashboardResponse};
pub use documents::{InvoiceResponse, QuoteResponse};
pub use pagination::{ListParams, ListResponse, PaymentListParams};
pub use payments::{PaymentOutcomeResponse, PaymentResponse};
pub use products::ProductResponse;
