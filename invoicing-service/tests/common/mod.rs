#![allow(dead_code)]

use invoicing_service::config::{InvoicingConfig, StoreBackend};
use invoicing_service::services::InMemoryStore;
use invoicing_service::startup::Application;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        std::env::set_var("STORE_BACKEND", "memory");

        let mut config = InvoicingConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.store = StoreBackend::Memory;
        config.billing.default_currency = "EUR".to_string();

        let store = Arc::new(InMemoryStore::new());
        let app = Application::build_with_store(config, store.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn patch(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn create_customer(&self, name: &str) -> String {
        let response = self.post("/customers", json!({ "name": name })).await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_invoice(&self, body: Value) -> Value {
        let response = self.post("/invoices", body).await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }

    pub async fn create_payment(&self, body: Value) -> Value {
        let response = self.post("/payments", body).await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }

    pub async fn invoice_status(&self, invoice_id: &str) -> String {
        let body: Value = self
            .get(&format!("/invoices/{}", invoice_id))
            .await
            .json()
            .await
            .unwrap();
        body["status"].as_str().unwrap().to_string()
    }
}

/// Untaxed line items worth exactly 50.00 gross.
pub fn fifty_gross_items() -> Value {
    json!([{ "name": "Flat fee", "quantity": "1", "unit_price": "50", "tax_rate": "0" }])
}

pub fn hundred_gross_items() -> Value {
    json!([{ "name": "Flat fee", "quantity": "1", "unit_price": "100", "tax_rate": "0" }])
}
