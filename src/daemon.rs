//! Gateway daemon - the main service
//!
//! Wires the durable slot store, the context store, the viewport tracker,
//! and the HTTP/WebSocket surface together and runs until interrupted.

use std::sync::Arc;

use crate::api::{ApiServer, ApiState};
use crate::context::{ContextHandle, UiContext, ViewportInfo};
use crate::db::{self, DbPool, SlotRepo};
use crate::viewport;
use crate::{Config, Result};

/// The Vantage gateway daemon
pub struct Gateway {
    config: Config,
    db: DbPool,
}

impl Gateway {
    /// Create a new gateway instance
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be initialized
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.db_path();
        let db = db::init(&db_path)?;

        tracing::info!(path = %db_path.display(), "database initialized");

        Ok(Self { config, db })
    }

    /// Database pool (for CLI subcommands operating on the same data dir)
    #[must_use]
    pub fn db(&self) -> DbPool {
        self.db.clone()
    }

    /// Build the shared context handle with restore-on-init
    fn build_context(&self) -> ContextHandle {
        let store = &self.config.store;
        let initial = UiContext::initial(
            store.initial_page.clone(),
            store.initial_view.clone(),
            ViewportInfo::with_dimensions(store.viewport_width, store.viewport_height),
        );

        ContextHandle::with_persistence(
            initial,
            SlotRepo::new(self.db.clone()),
            &store.slot_name,
            store.debounce,
        )
    }

    /// Run the gateway until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the API server fails
    pub async fn run(self) -> Result<()> {
        let context = self.build_context();
        tracing::info!(summary = %context.summary().await, "context store ready");

        // Viewport tracker lives for the process lifetime
        let (signals, _tracker) = viewport::spawn_tracker(context.clone());

        let state = Arc::new(ApiState {
            db: self.db.clone(),
            context,
            viewport: signals,
        });

        let server = ApiServer::new(state, self.config.api.port);
        let server_task = server.spawn();

        tracing::info!(port = self.config.api.port, "gateway running, ctrl-c to stop");

        tokio::select! {
            result = server_task => {
                match result {
                    Ok(inner) => inner?,
                    Err(e) => return Err(crate::Error::Config(format!("server task failed: {e}"))),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
            }
        }

        Ok(())
    }
}
