mod common;

use axum::http::Method;
use serde_json::{json, Value};

use common::{response_json, TestApp};

async fn create_product(app: &TestApp, cookies: &str, name: &str, price: &str) -> String {
    let response = app
        .request_with_cookies(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": name, "price": price })),
            Some(cookies),
        )
        .await;
    assert_eq!(response.status(), 201);
    response_json(response).await["id"]
        .as_str()
        .expect("product id")
        .to_string()
}

async fn record_purchase(app: &TestApp, cookies: &str, product: &str, quantity: i32, date: &str) {
    let response = app
        .request_with_cookies(
            Method::POST,
            "/api/v1/purchases",
            Some(json!({ "product": product, "quantity": quantity, "purchase_date": date })),
            Some(cookies),
        )
        .await;
    assert_eq!(response.status(), 201);
}

async fn record_sale(
    app: &TestApp,
    cookies: &str,
    product: &str,
    quantity: i32,
    date: &str,
) -> axum::response::Response {
    app.request_with_cookies(
        Method::POST,
        "/api/v1/sales",
        Some(json!({ "product": product, "quantity": quantity, "sales_date": date })),
        Some(cookies),
    )
    .await
}

#[tokio::test]
async fn sale_is_rejected_when_stock_is_insufficient() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;
    let product = create_product(&app, &cookies, "Widget", "2.5").await;

    record_purchase(&app, &cookies, &product, 10, "2024-01-01T00:00:00Z").await;
    let response = record_sale(&app, &cookies, &product, 3, "2024-01-02T00:00:00Z").await;
    assert_eq!(response.status(), 201);

    // 10 purchased, 3 sold: 7 more is exactly coverable
    let response = record_sale(&app, &cookies, &product, 7, "2024-01-03T00:00:00Z").await;
    assert_eq!(response.status(), 201);

    // Stock is now exhausted
    let response = record_sale(&app, &cookies, &product, 1, "2024-01-04T00:00:00Z").await;
    assert_eq!(response.status(), 422);
    let body = response_json(response).await;
    assert!(
        body["message"]
            .as_str()
            .expect("error message")
            .contains("requested quantity exceeds available stock"),
        "unexpected message: {body}"
    );
}

#[tokio::test]
async fn sale_without_purchase_history_is_rejected() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;
    let product = create_product(&app, &cookies, "Widget", "2.5").await;

    let response = record_sale(&app, &cookies, &product, 1, "2024-01-01T00:00:00Z").await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn rejected_sale_writes_nothing() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;
    let product = create_product(&app, &cookies, "Widget", "2.5").await;

    let response = record_sale(&app, &cookies, &product, 5, "2024-01-01T00:00:00Z").await;
    assert_eq!(response.status(), 422);

    let response = app
        .request_with_cookies(Method::GET, "/api/v1/sales", None, Some(&cookies))
        .await;
    let sales = response_json(response).await;
    assert_eq!(sales.as_array().expect("sales list").len(), 0);
}

#[tokio::test]
async fn non_positive_sale_quantity_is_a_validation_error() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;
    let product = create_product(&app, &cookies, "Widget", "2.5").await;

    for quantity in [0, -3] {
        let response = record_sale(&app, &cookies, &product, quantity, "2024-01-01T00:00:00Z").await;
        assert_eq!(response.status(), 400);
    }
}

#[tokio::test]
async fn ledger_merges_purchases_and_sales_chronologically() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;
    let product = create_product(&app, &cookies, "Widget", "2.5").await;

    record_purchase(&app, &cookies, &product, 5, "2024-01-01T00:00:00Z").await;
    record_purchase(&app, &cookies, &product, 5, "2024-01-03T00:00:00Z").await;
    let response = record_sale(&app, &cookies, &product, 2, "2024-01-02T00:00:00Z").await;
    assert_eq!(response.status(), 201);

    let response = app
        .request(Method::GET, &format!("/api/v1/inventory?id={product}"), None)
        .await;
    assert_eq!(response.status(), 200);
    let ledger = response_json(response).await;
    let entries = ledger.as_array().expect("ledger entries");

    let shape: Vec<(String, i64)> = entries
        .iter()
        .map(|e| {
            (
                e["type"].as_str().expect("entry type").to_string(),
                e["quantity"].as_i64().expect("entry quantity"),
            )
        })
        .collect();
    assert_eq!(
        shape,
        vec![
            ("purchase".to_string(), 5),
            ("sale".to_string(), 2),
            ("purchase".to_string(), 5),
        ]
    );

    // Every entry carries the product's current unit price
    for entry in entries {
        assert_eq!(entry["unit"], "2.5");
    }
}

#[tokio::test]
async fn ledger_unit_price_reflects_current_product_price() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;
    let product = create_product(&app, &cookies, "Widget", "2.5").await;

    record_purchase(&app, &cookies, &product, 5, "2024-01-01T00:00:00Z").await;

    let response = app
        .request_with_cookies(
            Method::PUT,
            &format!("/api/v1/products/{product}"),
            Some(json!({ "name": "Widget", "price": "4.5" })),
            Some(&cookies),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .request(Method::GET, &format!("/api/v1/inventory?id={product}"), None)
        .await;
    let ledger = response_json(response).await;
    assert_eq!(ledger[0]["unit"], "4.5");
}

#[tokio::test]
async fn ledger_without_history_is_empty() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;
    let product = create_product(&app, &cookies, "Widget", "2.5").await;

    let response = app
        .request(Method::GET, &format!("/api/v1/inventory?id={product}"), None)
        .await;
    assert_eq!(response.status(), 200);
    let ledger = response_json(response).await;
    assert_eq!(ledger, json!([]));

    // Unknown products behave the same: empty, not an error
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/inventory?id={}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await, json!([]));
}

#[tokio::test]
async fn ledger_requires_the_id_parameter() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/inventory", None).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn repeated_ledger_reads_are_identical() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;
    let product = create_product(&app, &cookies, "Widget", "2.5").await;

    record_purchase(&app, &cookies, &product, 5, "2024-01-01T00:00:00Z").await;
    record_purchase(&app, &cookies, &product, 3, "2024-01-01T00:00:00Z").await;

    let uri = format!("/api/v1/inventory?id={product}");
    let first: Value = response_json(app.request(Method::GET, &uri, None).await).await;
    let second: Value = response_json(app.request(Method::GET, &uri, None).await).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn purchase_for_unknown_product_is_not_found() {
    let app = TestApp::new().await;
    let cookies = app.authenticated_cookies().await;

    let response = app
        .request_with_cookies(
            Method::POST,
            "/api/v1/purchases",
            Some(json!({
                "product": uuid::Uuid::new_v4(),
                "quantity": 5,
                "purchase_date": "2024-01-01T00:00:00Z"
            })),
            Some(&cookies),
        )
        .await;
    assert_eq!(response.status(), 404);
}
