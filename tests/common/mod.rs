#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use notes_api::api::{create_router, AppState};
use notes_api::config::Config;

pub const SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: "sqlite::memory:".to_string(),
        token_secret: SECRET.to_string(),
        token_ttl_minutes: 30,
        db_max_connections: 1,
        db_min_connections: 1,
        request_timeout_secs: 30,
    }
}

pub async fn app() -> Router {
    let pool = notes_api::db::memory_pool().await.unwrap();
    create_router(AppState::new(pool, Arc::new(test_config())))
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Register `email` and return its access token.
pub async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/create-account",
        None,
        Some(serde_json::json!({
            "fullName": "Test User",
            "email": email,
            "password": "correct horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    body["accessToken"].as_str().unwrap().to_string()
}

pub async fn add_note(app: &Router, token: &str, title: &str, content: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/add-note",
        Some(token),
        Some(serde_json::json!({"title": title, "content": content})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    body["note"].clone()
}
