//! WebSocket surface for live context streaming
//!
//! The shell opens one socket, reports updates and geometry over it, and
//! receives a `context` frame after every observable mutation.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::ApiState;
use crate::context::{UiContext, UpdateEnvelope};
use crate::viewport::ViewportSignal;

/// Outgoing frame buffer per connection
const OUTGOING_CAPACITY: usize = 32;

/// Incoming WebSocket message from the shell
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsIncoming {
    /// Apply a context update envelope
    Update { envelope: UpdateEnvelope },
    /// Report scroll offsets
    Scroll { x: f64, y: f64 },
    /// Report window dimensions
    Resize { width: f64, height: f64 },
    /// Request the current snapshot
    GetContext,
    /// Ping to keep the connection alive
    Ping,
}

/// Outgoing WebSocket message to the shell
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsOutgoing {
    /// Connection established
    Connected { connection_id: String },
    /// Context snapshot after a mutation or on request
    Context { context: UiContext },
    /// Pong response
    Pong,
    /// Error occurred
    Error { message: String },
}

/// Build WebSocket router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(ws_upgrade))
        .with_state(state)
}

/// Handle WebSocket upgrade request
async fn ws_upgrade(State(state): State<Arc<ApiState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ApiState>) {
    let connection_id = Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();

    // Send connected message
    let connected = WsOutgoing::Connected {
        connection_id: connection_id.clone(),
    };
    if let Ok(msg) = serde_json::to_string(&connected) {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            return;
        }
    }

    tracing::info!(connection_id = %connection_id, "WebSocket connected");

    // Channel for sending frames back to the client
    let (tx, mut rx) = mpsc::channel::<WsOutgoing>(OUTGOING_CAPACITY);

    // Subscribe this connection to context mutations. The listener runs on
    // the mutating task; a full buffer drops the frame rather than block.
    let frames = tx.clone();
    let subscription = state
        .context
        .subscribe(Box::new(move |context| {
            if frames
                .try_send(WsOutgoing::Context {
                    context: context.clone(),
                })
                .is_err()
            {
                tracing::debug!("context frame dropped, client buffer full");
            }
        }))
        .await;

    // Forward frames from the channel to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    let state_for_recv = Arc::clone(&state);
    let connection_for_recv = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Err(e) = handle_message(&text, &state_for_recv, &tx).await {
                        let error = WsOutgoing::Error {
                            message: e.to_string(),
                        };
                        let _ = tx.send(error).await;
                    }
                }
                Message::Close(_) => {
                    tracing::info!(connection_id = %connection_for_recv, "WebSocket closed by client");
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.context.unsubscribe(subscription).await;
    tracing::info!(connection_id = %connection_id, "WebSocket disconnected");
}

/// Handle a single incoming message
async fn handle_message(
    text: &str,
    state: &Arc<ApiState>,
    tx: &mpsc::Sender<WsOutgoing>,
) -> crate::Result<()> {
    let incoming: WsIncoming = serde_json::from_str(text)?;

    match incoming {
        WsIncoming::Update { envelope } => {
            state.context.apply_envelope(envelope).await;
        }
        WsIncoming::Scroll { x, y } => {
            state.viewport.report(ViewportSignal::Scroll { x, y });
        }
        WsIncoming::Resize { width, height } => {
            state.viewport.report(ViewportSignal::Resize { width, height });
        }
        WsIncoming::GetContext => {
            let context = state.context.snapshot().await;
            tx.send(WsOutgoing::Context { context })
                .await
                .map_err(|e| crate::Error::Channel(e.to_string()))?;
        }
        WsIncoming::Ping => {
            tx.send(WsOutgoing::Pong)
                .await
                .map_err(|e| crate::Error::Channel(e.to_string()))?;
        }
    }

    Ok(())
}
