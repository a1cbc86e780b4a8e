//! Shared handle over the context store
//!
//! API handlers, the viewport tracker, and the daemon all hold clones of
//! one [`ContextHandle`]. The handle serializes access through a mutex,
//! wires observable mutations to the debounced saver, and performs the
//! restore-on-construction pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::db::SlotRepo;
use crate::persistence::DebouncedSaver;

use super::broker::{Listener, SubscriptionId};
use super::store::ContextStore;
use super::types::UiContext;
use super::update::{ContextUpdate, UpdateEnvelope};

struct Persistence {
    slots: SlotRepo,
    slot_name: String,
    saver: DebouncedSaver,
}

struct HandleInner {
    store: Mutex<ContextStore>,
    persistence: Option<Persistence>,
}

/// Cloneable async facade over the context store
#[derive(Clone)]
pub struct ContextHandle {
    inner: Arc<HandleInner>,
}

impl ContextHandle {
    /// Handle without persistence; state lives for the process only
    #[must_use]
    pub fn ephemeral(initial: UiContext) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                store: Mutex::new(ContextStore::new(initial)),
                persistence: None,
            }),
        }
    }

    /// Handle backed by a durable slot
    ///
    /// Restores the persisted projection when the slot holds one. Corrupt
    /// or unreadable slots are logged and the initial context is used
    /// instead.
    #[must_use]
    pub fn with_persistence(
        initial: UiContext,
        slots: SlotRepo,
        slot_name: &str,
        debounce: Duration,
    ) -> Self {
        let mut store = ContextStore::new(initial);
        match slots.load(slot_name) {
            Ok(Some(projection)) => {
                store.restore(projection);
                tracing::info!(slot = %slot_name, "restored persisted session");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(slot = %slot_name, error = %e, "session restore failed, starting fresh");
            }
        }

        let saver = DebouncedSaver::new(slots.clone(), slot_name, debounce);
        Self {
            inner: Arc::new(HandleInner {
                store: Mutex::new(store),
                persistence: Some(Persistence {
                    slots,
                    slot_name: slot_name.to_string(),
                    saver,
                }),
            }),
        }
    }

    /// Apply a typed update and schedule a debounced save
    pub async fn apply(&self, update: ContextUpdate) {
        let projection = {
            let mut store = self.inner.store.lock().await;
            store.apply(update);
            store.projection()
        };

        if let Some(persistence) = &self.inner.persistence {
            persistence.saver.schedule(projection).await;
        }
    }

    /// Apply a raw envelope; unknown kinds are silent no-ops
    pub async fn apply_envelope(&self, envelope: UpdateEnvelope) {
        if let Some(update) = envelope.into_update() {
            self.apply(update).await;
        }
    }

    /// Silently update scroll offsets
    pub async fn scroll_to(&self, x: f64, y: f64) {
        let mut store = self.inner.store.lock().await;
        store.scroll_to(x, y);
    }

    /// Silently update viewport dimensions
    pub async fn resize_to(&self, width: f64, height: f64) {
        let mut store = self.inner.store.lock().await;
        store.resize_to(width, height);
    }

    /// Reset to the initial context, delete the slot, notify listeners
    ///
    /// Any pending debounced save is cancelled first so a stale projection
    /// cannot land after the reset.
    pub async fn clear(&self) {
        if let Some(persistence) = &self.inner.persistence {
            persistence.saver.cancel().await;
        }

        {
            let mut store = self.inner.store.lock().await;
            store.clear();
        }

        if let Some(persistence) = &self.inner.persistence {
            if let Err(e) = persistence.slots.delete(&persistence.slot_name) {
                tracing::warn!(slot = %persistence.slot_name, error = %e, "slot delete failed");
            }
        }
    }

    /// Copy of the current context with a fresh timestamp
    pub async fn snapshot(&self) -> UiContext {
        let store = self.inner.store.lock().await;
        store.snapshot()
    }

    /// Snapshot rendered as a JSON string
    pub async fn serialized_snapshot(&self) -> String {
        let store = self.inner.store.lock().await;
        store.serialized_snapshot()
    }

    /// One-line context description
    pub async fn summary(&self) -> String {
        let store = self.inner.store.lock().await;
        store.summary()
    }

    /// Register a listener for observable mutations
    pub async fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let mut store = self.inner.store.lock().await;
        store.subscribe(listener)
    }

    /// Remove a listener; false when the id is unknown
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut store = self.inner.store.lock().await;
        store.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::types::ViewportInfo;
    use crate::db;

    fn initial() -> UiContext {
        UiContext::initial("dashboard", "default", ViewportInfo::with_dimensions(1920.0, 1080.0))
    }

    #[tokio::test]
    async fn ephemeral_handle_applies_updates() {
        let handle = ContextHandle::ephemeral(initial());
        handle
            .apply(ContextUpdate::Search("acme".to_string()))
            .await;

        let snapshot = handle.snapshot().await;
        assert_eq!(snapshot.search_query, "acme");
        assert_eq!(snapshot.recent_actions.len(), 1);
    }

    #[tokio::test]
    async fn restore_applies_persisted_projection() {
        let slots = SlotRepo::new(db::init_memory().unwrap());
        let handle = ContextHandle::with_persistence(
            initial(),
            slots.clone(),
            "ui-context",
            Duration::from_millis(10),
        );

        handle
            .apply(ContextUpdate::Page("contacts".to_string()))
            .await;
        handle.apply(ContextUpdate::View("list".to_string())).await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        // A second handle over the same slot picks up the saved projection
        let restored = ContextHandle::with_persistence(
            initial(),
            slots,
            "ui-context",
            Duration::from_millis(10),
        );
        let snapshot = restored.snapshot().await;
        assert_eq!(snapshot.page, "contacts");
        assert_eq!(snapshot.view, "list");
        // Ephemeral state is not persisted
        assert!(snapshot.recent_actions.is_empty());
    }

    #[tokio::test]
    async fn clear_deletes_slot_and_resets_state() {
        let slots = SlotRepo::new(db::init_memory().unwrap());
        let handle = ContextHandle::with_persistence(
            initial(),
            slots.clone(),
            "ui-context",
            Duration::from_millis(10),
        );

        handle
            .apply(ContextUpdate::Search("beta".to_string()))
            .await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(slots.exists("ui-context").unwrap());

        handle.clear().await;

        assert!(!slots.exists("ui-context").unwrap());
        let snapshot = handle.snapshot().await;
        assert_eq!(snapshot.page, "dashboard");
        assert_eq!(snapshot.search_query, "");
    }

    #[tokio::test]
    async fn clear_cancels_pending_save() {
        let slots = SlotRepo::new(db::init_memory().unwrap());
        let handle = ContextHandle::with_persistence(
            initial(),
            slots.clone(),
            "ui-context",
            Duration::from_millis(50),
        );

        handle
            .apply(ContextUpdate::Search("stale".to_string()))
            .await;
        handle.clear().await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!slots.exists("ui-context").unwrap());
    }

    #[tokio::test]
    async fn string_page_envelope_navigates() {
        let handle = ContextHandle::ephemeral(initial());
        handle
            .apply_envelope(UpdateEnvelope {
                kind: "page".to_string(),
                payload: serde_json::json!("leads"),
            })
            .await;

        let snapshot = handle.snapshot().await;
        assert_eq!(snapshot.page, "leads");
        let actions = snapshot.recent_actions.as_slice();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, "navigate");
        assert_eq!(actions[0].target, "leads");
    }

    #[tokio::test]
    async fn unknown_envelope_kind_is_a_no_op() {
        let handle = ContextHandle::ephemeral(initial());
        let before = handle.snapshot().await;

        handle
            .apply_envelope(UpdateEnvelope {
                kind: "viewport".to_string(),
                payload: serde_json::json!({"scrollY": 100}),
            })
            .await;

        let after = handle.snapshot().await;
        assert_eq!(after.page, before.page);
        assert!(after.recent_actions.is_empty());
    }

    #[tokio::test]
    async fn viewport_methods_do_not_schedule_saves() {
        let slots = SlotRepo::new(db::init_memory().unwrap());
        let handle = ContextHandle::with_persistence(
            initial(),
            slots.clone(),
            "ui-context",
            Duration::from_millis(10),
        );

        handle.scroll_to(0.0, 250.0).await;
        handle.resize_to(1280.0, 720.0).await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(!slots.exists("ui-context").unwrap());
        let snapshot = handle.snapshot().await;
        assert_eq!(snapshot.viewport.scroll_y, 250.0);
        assert_eq!(snapshot.viewport.visible_area.bottom, 970.0);
    }
}
