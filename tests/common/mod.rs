//! Shared helpers for the integration tests.
//!
//! Each test file is its own crate, so helpers used by only one of them
//! would warn as dead code in the others.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use task_tracker::app::api::{router, AppState};
use task_tracker::app::storage::TaskStore;

/// Router over a fresh, unseeded in-memory store.
pub fn test_app() -> Router {
    let store = TaskStore::open_in_memory().expect("in-memory store should open");
    router(AppState::new(store))
}

/// Sends one request and returns the status plus the JSON body (`Null` when empty).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => Request::builder().method(method).uri(uri).body(Body::empty()),
    }
    .expect("request should build");

    send_request(app, request).await
}

/// Sends a raw body, for malformed JSON cases.
pub async fn send_raw(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");

    send_request(app, request).await
}

async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, value)
}

/// Creates a task and returns the stored record.
pub async fn create_task(app: &Router, body: Value) -> Value {
    let (status, task) = send(app, Method::POST, "/api/tasks", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {task}");
    task
}

pub async fn create_titled(app: &Router, title: &str, due_date: Option<&str>, status: &str) -> Value {
    create_task(
        app,
        json!({ "title": title, "dueDate": due_date, "status": status }),
    )
    .await
}

/// Titles of a listing, in response order.
pub fn titles(tasks: &Value) -> Vec<String> {
    tasks
        .as_array()
        .expect("listing should be an array")
        .iter()
        .map(|task| task["title"].as_str().unwrap_or_default().to_string())
        .collect()
}
