//! Domain models for invoicing-service.

mod customer;
mod dashboard;
mod invoice;
mod line_item;
mod page;
mod patch;
mod payment;
mod product;
mod quote;

pub use customer::{CreateCustomer, Customer, UpdateCustomer};
pub use dashboard::{ChartPeriod, EntityCounts, InvoiceRollup};
pub use invoice::{CreateInvoice, Invoice, InvoiceStatus, UpdateInvoice};
pub use line_item::{DocumentTotals, LineItem, DEFAULT_TAX_RATE};
pub use page::{ListQuery, Page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use payment::{CreatePayment, Payment, PaymentMethod, PaymentStatus, UpdatePayment};
pub use product::{CreateProduct, Product, UpdateProduct, DEFAULT_UNIT};
pub use quote::{CreateQuote, Quote, QuoteStatus, UpdateQuote};
