//! Synchronous subscription broker
//!
//! Listeners run on the mutating thread, in subscription order, after the
//! mutation has fully applied. A failing listener never takes the others
//! down with it.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::types::UiContext;

/// Opaque token returned by `subscribe`, used to unsubscribe
pub type SubscriptionId = u64;

/// Callback invoked with the post-mutation context
pub type Listener = Box<dyn Fn(&UiContext) + Send + Sync>;

/// Registry of synchronous context listeners
#[derive(Default)]
pub struct SubscriberRegistry {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: SubscriptionId,
}

impl SubscriberRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, returning its subscription id
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener
    ///
    /// Returns false when the id is unknown or already removed, so repeated
    /// unsubscribes are harmless.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Invoke every listener with the current context
    ///
    /// A panicking listener is caught and logged; the remaining listeners
    /// still run.
    pub fn notify(&self, context: &UiContext) {
        for (id, listener) in &self.listeners {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(context))) {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic".to_string());
                tracing::error!(subscription = *id, detail = %detail, "context listener panicked");
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
