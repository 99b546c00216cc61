//! End-to-end tests for order and order-item endpoints, including the
//! server-maintained order totals.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use orderd::config::Config;
use tower::ServiceExt;

/// Credential seeded by the users migration (must match m20250301_000001_create_users.rs)
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = orderd::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    orderd::api::router(state)
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn authenticate(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/user/authenticate",
            None,
            &serde_json::json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["token"].as_str().expect("token missing").to_string()
}

/// Create an order and return its JSON representation.
async fn create_order(app: &Router, token: &str, customer_name: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/order/add",
            Some(token),
            &serde_json::json!({ "customerName": customer_name }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Add an item and return its JSON representation.
async fn add_item(
    app: &Router,
    token: &str,
    order_id: i64,
    name: &str,
    quantity: i64,
    unit_price: f64,
) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/order/{order_id}/add/item"),
            Some(token),
            &serde_json::json!({ "name": name, "quantity": quantity, "unitPrice": unit_price }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn fetch_order_total(app: &Router, token: &str, order_id: i64) -> f64 {
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/order/{order_id}"), Some(token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["totalPrice"].as_f64().expect("totalPrice missing")
}

#[tokio::test]
async fn test_order_crud_flow() {
    let app = spawn_app().await;
    let token = authenticate(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let order = create_order(&app, &token, "Alice Johnson").await;
    let order_id = order["id"].as_i64().expect("order id missing");

    // The order number is generated server-side, the total starts at zero.
    let order_number = order["orderNumber"].as_str().unwrap();
    assert!(order_number.starts_with("ORD-"));
    assert_eq!(order["customerName"], "Alice Johnson");
    assert_eq!(order["totalPrice"].as_f64().unwrap(), 0.0);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/order/{order_id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["orderNumber"], order["orderNumber"]);

    // Update keeps the id and number, changes the customer fields.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/order/update/{order_id}"),
            Some(&token),
            &serde_json::json!({ "customerName": "Alice J.", "description": "rush order" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["id"], order["id"]);
    assert_eq!(updated["orderNumber"], order["orderNumber"]);
    assert_eq!(updated["customerName"], "Alice J.");
    assert_eq!(updated["description"], "rush order");

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/orders", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Deletion goes over PUT for wire compatibility.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/order/delete/{order_id}"),
            Some(&token),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(
        json["message"],
        format!("order was deleted with ID: {order_id}")
    );

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/order/{order_id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_validation_and_missing_ids() {
    let app = spawn_app().await;
    let token = authenticate(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Blank customer name.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/order/add",
            Some(&token),
            &serde_json::json!({ "customerName": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Non-positive path id.
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/order/0", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "Invalid order ID: 0. ID must be a positive integer"
    );

    // Valid id with no row behind it.
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/order/99999", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Order not found: 99999");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/order/update/99999",
            Some(&token),
            &serde_json::json!({ "customerName": "Nobody" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_mutations_maintain_order_total() {
    let app = spawn_app().await;
    let token = authenticate(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let order = create_order(&app, &token, "Warehouse Nine").await;
    let order_id = order["id"].as_i64().unwrap();

    // Two widgets at 10.0 each.
    let first = add_item(&app, &token, order_id, "Blue Widget", 2, 10.0).await;
    assert_eq!(first["quantity"], 2);
    assert_eq!(first["unitPrice"].as_f64().unwrap(), 10.0);
    assert_eq!(first["totalPrice"].as_f64().unwrap(), 20.0);
    assert_eq!(fetch_order_total(&app, &token, order_id).await, 20.0);

    // Three more at 5.0.
    let second = add_item(&app, &token, order_id, "Red Widget", 3, 5.0).await;
    assert_eq!(second["totalPrice"].as_f64().unwrap(), 15.0);
    assert_eq!(fetch_order_total(&app, &token, order_id).await, 35.0);

    // Shrinking the first line item drops the order total with it.
    let first_id = first["id"].as_i64().unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/order/update/item/{first_id}"),
            Some(&token),
            &serde_json::json!({ "name": "Blue Widget", "quantity": 1, "unitPrice": 10.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["totalPrice"].as_f64().unwrap(), 10.0);
    assert_eq!(fetch_order_total(&app, &token, order_id).await, 25.0);

    // Deleting it removes its contribution.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/order/delete/item/{first_id}"),
            Some(&token),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        format!("order item was deleted with ID: {first_id}")
    );
    assert_eq!(fetch_order_total(&app, &token, order_id).await, 15.0);

    // The price endpoint recomputes and reports the same number.
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/order/{order_id}/price"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["orderId"].as_i64().unwrap(), order_id);
    assert_eq!(json["totalPrice"].as_f64().unwrap(), 15.0);
}

#[tokio::test]
async fn test_item_validation_and_missing_parents() {
    let app = spawn_app().await;
    let token = authenticate(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Adding to a missing order.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/order/99999/add/item",
            Some(&token),
            &serde_json::json!({ "name": "Orphan", "quantity": 1, "unitPrice": 1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Order not found: 99999");

    let order = create_order(&app, &token, "Warehouse Nine").await;
    let order_id = order["id"].as_i64().unwrap();

    // Zero quantity and negative price are rejected.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/order/{order_id}/add/item"),
            Some(&token),
            &serde_json::json!({ "name": "Widget", "quantity": 0, "unitPrice": 1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/order/{order_id}/add/item"),
            Some(&token),
            &serde_json::json!({ "name": "Widget", "quantity": 1, "unitPrice": -1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No such item.
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/order/item/99999", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Order item not found: 99999");

    // Listing items of a missing order is a 404, not an empty list.
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/order/99999/items", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_orders_and_items() {
    let app = spawn_app().await;
    let token = authenticate(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let order = create_order(&app, &token, "Alice Johnson").await;
    create_order(&app, &token, "Bob Smith").await;
    let order_id = order["id"].as_i64().unwrap();

    add_item(&app, &token, order_id, "Blue Widget", 1, 2.5).await;
    add_item(&app, &token, order_id, "Red Widget", 1, 2.5).await;

    // Customer-name match is case-insensitive.
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/orders/search/alice", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["customerName"], "Alice Johnson");

    // Order-number prefix matches every generated order.
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/orders/search/ORD-", Some(&token)))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    // No hits is an empty list, not an error.
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/orders/search/zzz", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);

    // Item search is scoped to the order.
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/v1/order/{order_id}/items/search/widget"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/api/v1/order/{order_id}/items/search/blue"),
            Some(&token),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Blue Widget");
}

#[tokio::test]
async fn test_read_only_role_split() {
    let app = spawn_app().await;
    let admin_token = authenticate(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/user/register",
            Some(&admin_token),
            &serde_json::json!({ "username": "clara_03", "password": "s3cret-enough" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let order = create_order(&app, &admin_token, "Alice Johnson").await;
    let order_id = order["id"].as_i64().unwrap();
    let item = add_item(&app, &admin_token, order_id, "Blue Widget", 1, 2.5).await;
    let item_id = item["id"].as_i64().unwrap();

    let user_token = authenticate(&app, "clara_03", "s3cret-enough").await;

    // Reads are open to USER.
    for uri in [
        "/api/v1/orders".to_string(),
        format!("/api/v1/order/{order_id}"),
        format!("/api/v1/order/{order_id}/price"),
        format!("/api/v1/order/{order_id}/items"),
        format!("/api/v1/order/item/{item_id}"),
        "/api/v1/orders/search/alice".to_string(),
    ] {
        let response = app
            .clone()
            .oneshot(get_request(&uri, Some(&user_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }

    // Mutations are not.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/order/add",
            Some(&user_token),
            &serde_json::json!({ "customerName": "Intruder" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/order/{order_id}/add/item"),
            Some(&user_token),
            &serde_json::json!({ "name": "Sneaky", "quantity": 1, "unitPrice": 1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/order/delete/{order_id}"),
            Some(&user_token),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Nothing was mutated along the way.
    assert_eq!(fetch_order_total(&app, &admin_token, order_id).await, 2.5);
}

#[tokio::test]
async fn test_delete_order_removes_its_items() {
    let app = spawn_app().await;
    let token = authenticate(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let order = create_order(&app, &token, "Warehouse Nine").await;
    let order_id = order["id"].as_i64().unwrap();
    let item = add_item(&app, &token, order_id, "Blue Widget", 4, 3.0).await;
    let item_id = item["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/order/delete/{order_id}"),
            Some(&token),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The item went with the order.
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/order/item/{item_id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
