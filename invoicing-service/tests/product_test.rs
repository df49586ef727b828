mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn product_lifecycle() {
    let app = TestApp::spawn().await;

    let response = app
        .post(
            "/products",
            json!({ "sku": "CONS-1H", "name": "Consulting hour", "price": "95.00" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
    let product: Value = response.json().await.unwrap();
    assert_eq!(product["tax_rate"], "19");
    assert_eq!(product["unit"], "pc");
    assert_eq!(product["active"], true);
    let path = format!("/products/{}", product["id"].as_str().unwrap());

    let updated: Value = app
        .put(&path, json!({ "price": "110.00", "unit": "h", "active": false }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["sku"], "CONS-1H");
    assert_eq!(updated["price"], "110.00");
    assert_eq!(updated["unit"], "h");
    assert_eq!(updated["active"], false);

    let by_sku: Value = app.get("/products?search=cons-1").await.json().await.unwrap();
    assert_eq!(by_sku["total"], 1);

    assert_eq!(app.delete(&path).await.status().as_u16(), 204);
    assert_eq!(app.get(&path).await.status().as_u16(), 404);
}

#[tokio::test]
async fn duplicate_sku_is_a_conflict() {
    let app = TestApp::spawn().await;
    let body = json!({ "sku": "BOOK-7", "name": "Handbook", "price": "20", "tax_rate": 7 });

    assert_eq!(app.post("/products", body.clone()).await.status().as_u16(), 201);
    assert_eq!(app.post("/products", body).await.status().as_u16(), 409);
}

#[tokio::test]
async fn invalid_product_is_rejected() {
    let app = TestApp::spawn().await;

    let no_price = app
        .post("/products", json!({ "sku": "X", "name": "No price" }))
        .await;
    assert_eq!(no_price.status().as_u16(), 422);

    let bad_rate = app
        .post(
            "/products",
            json!({ "sku": "Y", "name": "Odd", "price": "1", "tax_rate": 150 }),
        )
        .await;
    assert_eq!(bad_rate.status().as_u16(), 422);
}
