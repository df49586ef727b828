mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn customer_lifecycle() {
    let app = TestApp::spawn().await;

    let response = app
        .post(
            "/customers",
            json!({ "name": "Umbrella Corp", "email": "billing@umbrella.test" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let customer: Value = response.json().await.unwrap();
    let path = format!("/customers/{}", customer["id"].as_str().unwrap());

    let updated: Value = app
        .put(&path, json!({ "phone": "+49 30 123456" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["name"], "Umbrella Corp");
    assert_eq!(updated["phone"], "+49 30 123456");

    let found: Value = app
        .get("/customers?search=UMBRELLA")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(found["total"], 1);

    assert_eq!(app.delete(&path).await.status().as_u16(), 204);
    assert_eq!(app.get(&path).await.status().as_u16(), 404);
}

#[tokio::test]
async fn invalid_customer_is_rejected() {
    let app = TestApp::spawn().await;

    let empty_name = app.post("/customers", json!({ "name": "" })).await;
    assert_eq!(empty_name.status().as_u16(), 422);

    let bad_email = app
        .post("/customers", json!({ "name": "Hooli", "email": "not-an-email" }))
        .await;
    assert_eq!(bad_email.status().as_u16(), 422);
}
