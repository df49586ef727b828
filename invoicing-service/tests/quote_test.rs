mod common;

use chrono::{Datelike, Utc};
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn quotes_use_their_own_counter() {
    let app = TestApp::spawn().await;
    let customer_id = app.create_customer("Initech").await;
    let year = Utc::now().year();

    app.create_invoice(json!({ "customer_id": customer_id })).await;
    let response = app
        .post(
            "/quotes",
            json!({
                "customer_id": customer_id,
                "status": "sent",
                "items": [{ "name": "Audit", "quantity": 3, "unit_price": "10.00" }]
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let quote: Value = response.json().await.unwrap();

    assert_eq!(quote["number"], format!("Q-{}-0001", year));
    assert_eq!(quote["status"], "sent");
    assert_eq!(quote["totals"]["gross"], "35.70");
}

#[tokio::test]
async fn quote_update_recomputes_totals() {
    let app = TestApp::spawn().await;
    let customer_id = app.create_customer("Initech").await;
    let quote: Value = app
        .post("/quotes", json!({ "customer_id": customer_id }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(quote["totals"]["gross"], "0.00");
    let path = format!("/quotes/{}", quote["id"].as_str().unwrap());

    let updated: Value = app
        .put(
            &path,
            json!({
                "status": "accepted",
                "items": [{ "name": "Licence", "quantity": 1, "unit_price": "100", "tax_rate": 7 }]
            }),
        )
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(updated["number"], quote["number"]);
    assert_eq!(updated["status"], "accepted");
    assert_eq!(updated["totals"]["gross"], "107.00");
}

#[tokio::test]
async fn quote_requires_existing_customer() {
    let app = TestApp::spawn().await;

    let missing = app.post("/quotes", json!({})).await;
    assert_eq!(missing.status().as_u16(), 422);

    let unknown = app.post("/quotes", json!({ "customer_id": "ghost" })).await;
    assert_eq!(unknown.status().as_u16(), 404);
}

#[tokio::test]
async fn quote_can_be_deleted() {
    let app = TestApp::spawn().await;
    let customer_id = app.create_customer("Initech").await;
    let quote: Value = app
        .post("/quotes", json!({ "customer_id": customer_id }))
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/quotes/{}", quote["id"].as_str().unwrap());

    assert_eq!(app.delete(&path).await.status().as_u16(), 204);
    assert_eq!(app.get(&path).await.status().as_u16(), 404);
}

#[tokio::test]
async fn valid_until_can_be_cleared() {
    let app = TestApp::spawn().await;
    let customer_id = app.create_customer("Initech").await;
    let quote: Value = app
        .post(
            "/quotes",
            json!({ "customer_id": customer_id, "valid_until": Utc::now().to_rfc3339() }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert!(quote["valid_until"].is_string());
    let path = format!("/quotes/{}", quote["id"].as_str().unwrap());

    let cleared: Value = app
        .put(&path, json!({ "valid_until": null }))
        .await
        .json()
        .await
        .unwrap();
    assert!(cleared["valid_until"].is_null());
}
