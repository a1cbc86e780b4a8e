//! API endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use vantage_gateway::{ContextHandle, DbPool, api, viewport};

mod common;
use common::{initial_context, setup_test_db};

/// Build a test API router over an ephemeral context
fn build_test_router(db: DbPool) -> axum::Router {
    let context = ContextHandle::ephemeral(initial_context());
    let (signals, _tracker) = viewport::spawn_tracker(context.clone());

    let state = Arc::new(api::ApiState {
        db,
        context,
        viewport: signals,
    });

    api::router(state)
}

async fn get_json(app: &axum::Router, uri: &str) -> Value {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn post_json(app: &axum::Router, uri: &str, body: &Value) -> StatusCode {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    response.status()
}

#[tokio::test]
async fn test_health_endpoint() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let json = get_json(&app, "/health").await;

    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "vantage-gateway");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_endpoint() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let json = get_json(&app, "/ready").await;

    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_get_context_initial_state() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let json = get_json(&app, "/api/context").await;

    assert_eq!(json["page"], "dashboard");
    assert_eq!(json["view"], "default");
    assert_eq!(json["selectedItems"], json!([]));
    assert_eq!(json["searchQuery"], "");
    assert_eq!(json["recentActions"], json!([]));
    assert!(json["timestamp"].is_i64());
    assert_eq!(json["viewport"]["width"], json!(1920.0));
    assert_eq!(json["viewport"]["visibleArea"]["bottom"], json!(1080.0));

    // Empty optionals are present as explicit nulls, never omitted
    let keys = json.as_object().unwrap();
    assert!(keys.contains_key("lastSelectedItem"));
    assert!(json["lastSelectedItem"].is_null());
    assert!(keys.contains_key("visibleData"));
    assert!(json["visibleData"].is_null());
}

#[tokio::test]
async fn test_update_selection_then_get() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let status = post_json(
        &app,
        "/api/context/update",
        &json!({
            "type": "selection",
            "payload": {
                "items": [{"type": "contact", "id": "c-1", "data": {"name": "Acme"}}],
                "mode": "set"
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let json = get_json(&app, "/api/context").await;
    assert_eq!(json["selectedItems"].as_array().unwrap().len(), 1);
    assert_eq!(json["lastSelectedItem"]["id"], "c-1");
    assert_eq!(json["recentActions"][0]["type"], "select");
    assert_eq!(json["recentActions"][0]["target"], "1 items");
}

#[tokio::test]
async fn test_update_page_with_string_payload() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let status = post_json(
        &app,
        "/api/context/update",
        &json!({"type": "page", "payload": "leads"}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let json = get_json(&app, "/api/context").await;
    assert_eq!(json["page"], "leads");
    assert_eq!(json["recentActions"][0]["type"], "navigate");
    assert_eq!(json["recentActions"][0]["target"], "leads");
}

#[tokio::test]
async fn test_update_page_preserves_view() {
    let db = setup_test_db();
    let app = build_test_router(db);

    post_json(
        &app,
        "/api/context/update",
        &json!({"type": "view", "payload": "kanban"}),
    )
    .await;
    post_json(
        &app,
        "/api/context/update",
        &json!({"type": "page", "payload": "deals"}),
    )
    .await;

    let json = get_json(&app, "/api/context").await;
    assert_eq!(json["page"], "deals");
    assert_eq!(json["view"], "kanban");
}

#[tokio::test]
async fn test_update_component_map_merges() {
    let db = setup_test_db();
    let app = build_test_router(db);

    post_json(
        &app,
        "/api/context/update",
        &json!({
            "type": "component",
            "payload": {
                "sidebar": {"open": true},
                "table": {"page": 3}
            }
        }),
    )
    .await;
    post_json(
        &app,
        "/api/context/update",
        &json!({"type": "component", "payload": {"sidebar": {"open": false}}}),
    )
    .await;

    let json = get_json(&app, "/api/context").await;
    assert_eq!(json["componentStates"]["sidebar"], json!({"open": false}));
    assert_eq!(json["componentStates"]["table"], json!({"page": 3}));
}

#[tokio::test]
async fn test_update_unknown_kind_is_accepted() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let status = post_json(
        &app,
        "/api/context/update",
        &json!({"type": "viewport", "payload": {"scrollY": 100}}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let json = get_json(&app, "/api/context").await;
    assert_eq!(json["page"], "dashboard");
    assert_eq!(json["recentActions"], json!([]));
}

#[tokio::test]
async fn test_update_malformed_payload_is_dropped() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let status = post_json(
        &app,
        "/api/context/update",
        &json!({"type": "search", "payload": {"q": 1}}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let json = get_json(&app, "/api/context").await;
    assert_eq!(json["searchQuery"], "");
    assert_eq!(json["recentActions"], json!([]));
}

#[tokio::test]
async fn test_clear_resets_context() {
    let db = setup_test_db();
    let app = build_test_router(db);

    post_json(
        &app,
        "/api/context/update",
        &json!({"type": "search", "payload": "acme"}),
    )
    .await;

    let status = post_json(&app, "/api/context/clear", &json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let json = get_json(&app, "/api/context").await;
    assert_eq!(json["searchQuery"], "");
    assert_eq!(json["recentActions"], json!([]));
}

#[tokio::test]
async fn test_summary_endpoint() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let json = get_json(&app, "/api/context/summary").await;

    assert_eq!(
        json["summary"],
        "Page: dashboard, View: default, Selected: 0, Actions: 0"
    );
}

#[tokio::test]
async fn test_serialized_endpoint() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/context/serialized")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert_eq!(content_type, "application/json");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["page"], "dashboard");
}

#[tokio::test]
async fn test_message_records_action() {
    let db = setup_test_db();
    let app = build_test_router(db);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/message")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"content": "  Pull up the Meridian deal  "}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["recentActions"][0]["type"], "message");
    assert_eq!(json["recentActions"][0]["target"], "Pull up the Meridian deal");
    assert!(json["recentActions"][0]["metadata"].is_null());
}
