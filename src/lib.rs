//! Vantage Gateway - UI context gateway for conversational CRM assistants
//!
//! This library provides the core functionality for the Vantage gateway:
//! - An observable store of what the user currently sees and does
//! - Synchronous subscriptions with isolated listener failures
//! - Debounced session persistence to a durable `SQLite` slot
//! - A channel-fed viewport tracker for scroll/resize geometry
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               Presentation Shell                     │
//! │   pages  │  selections  │  filters  │  viewport     │
//! └────────────────────┬────────────────────────────────┘
//!                      │ REST / WebSocket
//! ┌────────────────────▼────────────────────────────────┐
//! │                Vantage Gateway                       │
//! │   Context Store  │  Broker  │  Slots  │  Viewport   │
//! └────────────────────┬────────────────────────────────┘
//!                      │ serialized snapshots
//! ┌────────────────────▼────────────────────────────────┐
//! │              Assistant / Agents                      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod daemon;
pub mod db;
pub mod error;
pub mod persistence;
pub mod viewport;

pub use config::Config;
pub use context::{
    ContextHandle, ContextStore, ContextUpdate, SelectedItem, SelectionMode, SessionProjection,
    SubscriptionId, UiContext, UpdateEnvelope, UserAction, ViewportInfo, VisibleData,
};
pub use daemon::Gateway;
pub use db::{DbConn, DbPool, SlotRepo};
pub use error::{Error, Result};
pub use persistence::DebouncedSaver;
pub use viewport::{ViewportSignal, ViewportSignals};
