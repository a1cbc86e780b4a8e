//! Debounced session persistence
//!
//! Context mutations arrive in bursts (typing a search query, shift-click
//! selecting). Each mutation schedules a save of the projection captured at
//! that moment and cancels the previous one, so a burst collapses into a
//! single write of the final state roughly half a second after it settles.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::context::SessionProjection;
use crate::db::SlotRepo;

/// Default delay between the last mutation and the slot write
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Debounced writer for one session slot
pub struct DebouncedSaver {
    slots: SlotRepo,
    slot_name: String,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedSaver {
    /// Create a saver targeting the named slot
    #[must_use]
    pub fn new(slots: SlotRepo, slot_name: impl Into<String>, delay: Duration) -> Self {
        Self {
            slots,
            slot_name: slot_name.into(),
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedule a save of the given projection, replacing any pending save
    ///
    /// The projection is captured now; a later schedule call supersedes it
    /// entirely. Write failures are logged, never surfaced.
    pub async fn schedule(&self, projection: SessionProjection) {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let slots = self.slots.clone();
        let name = self.slot_name.clone();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = slots.save(&name, &projection) {
                tracing::warn!(slot = %name, error = %e, "session save failed");
            } else {
                tracing::debug!(slot = %name, "session saved");
            }
        }));
    }

    /// Abort any pending save without writing
    pub async fn cancel(&self) {
        let mut pending = self.pending.lock().await;
        if let Some(task) = pending.take() {
            task.abort();
        }
    }
}
