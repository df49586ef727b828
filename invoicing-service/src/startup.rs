//! Application startup and lifecycle management.

use crate::config::{InvoicingConfig, StoreBackend};
use crate::handlers::{self, customers, dashboard, invoices, payments, products, quotes};
use crate::services::{
    BillingStore, CustomerService, DashboardService, InMemoryStore, InvoiceService, MongoDb,
    PaymentService, ProductService, QuoteService, Reconciler,
};
use axum::{
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: InvoicingConfig,
    pub store: Arc<dyn BillingStore>,
    pub customers: CustomerService,
    pub products: ProductService,
    pub invoices: InvoiceService,
    pub quotes: QuoteService,
    pub payments: PaymentService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new(config: InvoicingConfig, store: Arc<dyn BillingStore>) -> Self {
        let reconciler = Reconciler::new(store.clone());
        let currency = config.billing.default_currency.clone();

        Self {
            customers: CustomerService::new(store.clone()),
            products: ProductService::new(store.clone()),
            invoices: InvoiceService::new(store.clone(), reconciler.clone(), currency.clone()),
            quotes: QuoteService::new(store.clone(), currency),
            payments: PaymentService::new(store.clone(), reconciler),
            dashboard: DashboardService::new(store.clone()),
            store,
            config,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/invoices/:id",
            get(invoices::get_invoice)
                .put(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        )
        .route("/invoices/:id/reconcile", post(invoices::reconcile_invoice))
        .route("/quotes", get(quotes::list_quotes).post(quotes::create_quote))
        .route(
            "/quotes/:id",
            get(quotes::get_quote)
                .put(quotes::update_quote)
                .delete(quotes::delete_quote),
        )
        .route(
            "/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route(
            "/payments/:id",
            get(payments::get_payment)
                .patch(payments::update_payment)
                .delete(payments::delete_payment),
        )
        .route("/dashboard/stats", get(dashboard::dashboard_stats))
        .route("/dashboard/activity", get(dashboard::dashboard_activity))
        .route("/dashboard/charts", get(dashboard::dashboard_charts))
        .route_layer(from_fn(metrics_middleware));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .merge(api)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connects the configured store and binds the listener.
    pub async fn build(config: InvoicingConfig) -> Result<Self, AppError> {
        let store: Arc<dyn BillingStore> = match config.store {
            StoreBackend::Mongo => {
                let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to connect to MongoDB: {}", e);
                        e
                    })?;
                db.initialize_indexes().await.map_err(|e| {
                    tracing::error!("Failed to initialize database indexes: {}", e);
                    e
                })?;
                Arc::new(db)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                Arc::new(InMemoryStore::new())
            }
        };

        Self::build_with_store(config, store).await
    }

    /// Builds the application around an existing store.
    pub async fn build_with_store(
        config: InvoicingConfig,
        store: Arc<dyn BillingStore>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config.clone(), store);

        // Port 0 picks a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Invoicing service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, router(self.state)).await
    }

    /// Serves until `signal` resolves, then drains in-flight requests.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(signal)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BillingConfig, MongoConfig};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = InvoicingConfig {
            common: service_core::config::Config {
                port: 0,
                log_level: "info".to_string(),
                otlp_endpoint: None,
            },
            mongodb: MongoConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "invoicing_test".to_string(),
            },
            store: StoreBackend::Memory,
            billing: BillingConfig {
                default_currency: "EUR".to_string(),
            },
        };
        AppState::new(config, Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn health_reports_ok_with_security_headers() {
        let response = router(test_state())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn unknown_invoice_is_not_found() {
        let response = router(test_state())
            .oneshot(
                axum::http::Request::builder()
                    .uri("/invoices/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
