//! Metrics collection and Prometheus export.
//!
//! Installs the Prometheus recorder and names the billing counters in one
//! place.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

use crate::billing::DocumentKind;
use crate::models::PaymentMethod;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// Must be called once at startup before any metrics are recorded.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("failed to install Prometheus recorder: {}", e))
    })?;

    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("metrics handle already initialized"))
    })
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_document_created(kind: DocumentKind) {
    counter!("billing_documents_created_total", "kind" => kind.sequence_key()).increment(1);
}

pub fn record_payment(method: PaymentMethod) {
    counter!("billing_payments_total", "method" => method.as_str()).increment(1);
}

pub fn record_reconciliation(outcome: &'static str) {
    counter!("billing_reconciliations_total", "outcome" => outcome).increment(1);
}

pub fn record_reconciliation_failure() {
    counter!("billing_reconciliation_failures_total").increment(1);
}
