use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

/// Register an account and return its identity body (including `tokens`).
async fn register_account(app: &Router, email: &str) -> Value {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users",
            &json!({
                "email": email,
                "password": "password",
                "password_confirmation": "password",
            })
            .to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

fn auth_query(identity: &Value) -> String {
    format!(
        "email={}&token={}",
        identity["email"].as_str().unwrap(),
        identity["tokens"].as_str().unwrap()
    )
}

// --- register ---

#[tokio::test]
async fn register_returns_201_with_identity() {
    let app = app();
    let identity = register_account(&app, "grace@example.com").await;
    assert_eq!(identity["email"], "grace@example.com");
    assert!(identity["id"].is_u64());
    assert!(!identity["tokens"].as_str().unwrap().is_empty());
    assert!(identity.get("password").is_none());
}

#[tokio::test]
async fn register_mismatched_confirmation_returns_422() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/users",
            &json!({
                "email": "grace@example.com",
                "password": "password",
                "password_confirmation": "different",
            })
            .to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(
        body["errors"]["password_confirmation"][0],
        "doesn't match Password"
    );
}

#[tokio::test]
async fn register_blank_fields_aggregate_errors() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/users", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["errors"]["email"][0], "can't be blank");
    assert_eq!(body["errors"]["password"][0], "can't be blank");
}

#[tokio::test]
async fn register_duplicate_email_returns_422() {
    let app = app();
    register_account(&app, "grace@example.com").await;

    let resp = app
        .oneshot(json_request(
            "POST",
            "/users",
            &json!({
                "email": "grace@example.com",
                "password": "password",
                "password_confirmation": "password",
            })
            .to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["errors"]["email"][0], "has already been taken");
}

// --- sign in ---

#[tokio::test]
async fn sign_in_returns_201_with_same_token() {
    let app = app();
    let identity = register_account(&app, "grace@example.com").await;

    let resp = app
        .oneshot(json_request(
            "POST",
            "/users/sign_in",
            &json!({"email": "grace@example.com", "password": "password"}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["tokens"], identity["tokens"]);
    assert_eq!(body["id"], identity["id"]);
}

#[tokio::test]
async fn sign_in_wrong_password_returns_401() {
    let app = app();
    register_account(&app, "grace@example.com").await;

    let resp = app
        .oneshot(json_request(
            "POST",
            "/users/sign_in",
            &json!({"email": "grace@example.com", "password": "hunter2"}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Invalid email or password.");
}

#[tokio::test]
async fn sign_in_unknown_email_returns_401() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/users/sign_in",
            &json!({"email": "nobody@example.com", "password": "password"}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- current user ---

#[tokio::test]
async fn current_user_without_token_returns_401() {
    let app = app();
    register_account(&app, "grace@example.com").await;

    let resp = app
        .oneshot(get_request(
            "/api/users/current_user/edit?email=grace@example.com",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn current_user_with_token_returns_identity() {
    let app = app();
    let identity = register_account(&app, "grace@example.com").await;

    let resp = app
        .oneshot(get_request(&format!(
            "/api/users/current_user/edit?{}",
            auth_query(&identity)
        )))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["email"], "grace@example.com");
    assert_eq!(body["tokens"], identity["tokens"]);
}

// --- orders ---

#[tokio::test]
async fn list_orders_requires_authentication() {
    let app = app();
    let resp = app
        .oneshot(get_request("/api/orders?email=grace@example.com"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(
        body["error"],
        "You need to sign in or sign up before continuing."
    );
}

#[tokio::test]
async fn list_orders_initially_empty() {
    let app = app();
    let identity = register_account(&app, "grace@example.com").await;

    let resp = app
        .oneshot(get_request(&format!("/api/orders?{}", auth_query(&identity))))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_order_returns_200() {
    let app = app();
    let identity = register_account(&app, "grace@example.com").await;

    let resp = app
        .oneshot(json_request(
            "POST",
            &format!("/api/orders?{}", auth_query(&identity)),
            &json!({
                "total": "3.0",
                "total_quantity": 3,
                "special_instructions": "leave at the door",
            })
            .to_string(),
        ))
        .await
        .unwrap();

    // 200, not 201: the contract oddity clients depend on.
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total"], "3.0");
    assert_eq!(body["total_quantity"], 3);
    assert!(body["number"].as_str().unwrap().starts_with('R'));
}

#[tokio::test]
async fn create_order_null_instructions_returns_422() {
    let app = app();
    let identity = register_account(&app, "grace@example.com").await;

    let resp = app
        .oneshot(json_request(
            "POST",
            &format!("/api/orders?{}", auth_query(&identity)),
            &json!({
                "total": "3.0",
                "total_quantity": 3,
                "special_instructions": null,
            })
            .to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(
        body["errors"][0]["title"],
        "Special instructions can't be blank"
    );
}

#[tokio::test]
async fn orders_are_scoped_to_the_account() {
    let app = app();
    let grace = register_account(&app, "grace@example.com").await;
    let ada = register_account(&app, "ada@example.com").await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/orders?{}", auth_query(&grace)),
            &json!({
                "total": "9.99",
                "total_quantity": 1,
                "special_instructions": "gift wrap",
            })
            .to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get_request(&format!("/api/orders?{}", auth_query(&ada))))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body, json!([]));
}

// --- delete ---

#[tokio::test]
async fn delete_order_returns_204_then_404() {
    let app = app();
    let identity = register_account(&app, "grace@example.com").await;

    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/orders?{}", auth_query(&identity)),
            &json!({
                "total": "3.0",
                "total_quantity": 3,
                "special_instructions": "none",
            })
            .to_string(),
        ))
        .await
        .unwrap();
    let order = body_json(resp).await;
    let id = order["id"].as_u64().unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/orders/{id}?{}", auth_query(&identity)))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/orders/{id}?{}", auth_query(&identity)))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
