//! REST endpoints over the context store

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::context::{ContextUpdate, UiContext, UpdateEnvelope};

/// Summary response
#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Message submission from the shell's input box
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub content: String,
}

/// Build the context REST router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/context", get(get_context))
        .route("/api/context/serialized", get(get_serialized))
        .route("/api/context/summary", get(get_summary))
        .route("/api/context/update", post(post_update))
        .route("/api/context/clear", post(post_clear))
        .route("/api/message", post(post_message))
        .with_state(state)
}

/// Current context snapshot
async fn get_context(State(state): State<Arc<ApiState>>) -> Json<UiContext> {
    Json(state.context.snapshot().await)
}

/// Pre-serialized snapshot, exactly what agents receive
async fn get_serialized(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let body = state.context.serialized_snapshot().await;
    ([(header::CONTENT_TYPE, "application/json")], body)
}

/// One-line context summary
async fn get_summary(State(state): State<Arc<ApiState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        summary: state.context.summary().await,
    })
}

/// Apply a raw update envelope
///
/// Unknown kinds are accepted and ignored, so shells can ship new update
/// types ahead of the gateway.
async fn post_update(
    State(state): State<Arc<ApiState>>,
    Json(envelope): Json<UpdateEnvelope>,
) -> StatusCode {
    state.context.apply_envelope(envelope).await;
    StatusCode::NO_CONTENT
}

/// Reset the context and drop the persisted session
async fn post_clear(State(state): State<Arc<ApiState>>) -> StatusCode {
    state.context.clear().await;
    StatusCode::NO_CONTENT
}

/// Record a submitted message on the action trail and return the snapshot
/// the caller forwards to its assistant
async fn post_message(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<MessageRequest>,
) -> Json<UiContext> {
    let content = request.content.trim().to_string();
    state
        .context
        .apply(ContextUpdate::Action {
            action_type: "message".to_string(),
            target: content,
            metadata: None,
        })
        .await;

    Json(state.context.snapshot().await)
}
