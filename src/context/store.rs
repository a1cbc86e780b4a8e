//! Observable context store
//!
//! Owns the single [`UiContext`] value, applies typed updates, records the
//! action trail, and notifies subscribers synchronously after each
//! observable mutation. Apply and serialize paths carry soft latency
//! budgets; overruns are logged, never enforced.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use super::actions::UserAction;
use super::broker::{Listener, SubscriberRegistry, SubscriptionId};
use super::types::{SelectedItem, SessionProjection, UiContext, now_millis};
use super::update::{ContextUpdate, SelectionMode};

/// Soft budget for applying one update, notification included
const APPLY_BUDGET: Duration = Duration::from_millis(1);

/// Soft budget for serializing one snapshot
const SERIALIZE_BUDGET: Duration = Duration::from_millis(10);

/// Observable context store
pub struct ContextStore {
    context: UiContext,
    /// Pristine copy that `clear` resets to
    initial: UiContext,
    subscribers: SubscriberRegistry,
}

impl ContextStore {
    /// Create a store seeded with the given initial context
    #[must_use]
    pub fn new(initial: UiContext) -> Self {
        Self {
            context: initial.clone(),
            initial,
            subscribers: SubscriberRegistry::new(),
        }
    }

    /// Current context as held by the store
    #[must_use]
    pub const fn context(&self) -> &UiContext {
        &self.context
    }

    /// Apply a typed update: mutate, refresh the timestamp, notify
    pub fn apply(&mut self, update: ContextUpdate) {
        let started = Instant::now();

        self.mutate(update);
        self.context.timestamp = now_millis();
        self.subscribers.notify(&self.context);

        let elapsed = started.elapsed();
        if elapsed > APPLY_BUDGET {
            tracing::warn!(
                elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
                "context update exceeded 1ms apply budget"
            );
        }
    }

    fn mutate(&mut self, update: ContextUpdate) {
        match update {
            ContextUpdate::Page(page) => {
                self.context.page.clone_from(&page);
                self.record(UserAction::new("navigate", page));
            }
            ContextUpdate::View(view) => {
                self.context.view = view;
            }
            ContextUpdate::Selection { items, mode } => {
                self.apply_selection(items, mode);
            }
            ContextUpdate::Data {
                items,
                total_count,
                data_type,
            } => {
                self.context.visible_data = Some(super::types::VisibleData {
                    items,
                    total_count,
                    data_type,
                });
            }
            ContextUpdate::Filter(payload) => {
                let target = serde_json::to_string(&payload).unwrap_or_default();
                for (key, value) in payload {
                    self.context.filters.insert(key, value);
                }
                self.record(UserAction::new("filter", target));
            }
            ContextUpdate::Search(query) => {
                self.context.search_query.clone_from(&query);
                self.record(UserAction::new("search", query));
            }
            ContextUpdate::Action {
                action_type,
                target,
                metadata,
            } => {
                self.record(UserAction::with_metadata(action_type, target, metadata));
            }
            ContextUpdate::Component(payload) => {
                for (id, state) in payload {
                    self.context.component_states.insert(id, state);
                }
            }
        }
    }

    fn apply_selection(&mut self, items: Vec<SelectedItem>, mode: SelectionMode) {
        let count = items.len();
        match mode {
            SelectionMode::Set => {
                self.context.last_selected_item = items.last().cloned();
                self.context.selected_items = items;
                self.record(UserAction::new("select", format!("{count} items")));
            }
            SelectionMode::Add => {
                if let Some(last) = items.last() {
                    self.context.last_selected_item = Some(last.clone());
                }
                self.context.selected_items.extend(items);
                self.record(UserAction::new("select", format!("added {count} items")));
            }
            SelectionMode::Remove => {
                let ids: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
                self.context
                    .selected_items
                    .retain(|item| !ids.contains(item.id.as_str()));
                // last_selected_item stays as-is even when it was just removed
                self.record(UserAction::new("deselect", format!("removed {count} items")));
            }
            SelectionMode::Clear => {
                self.context.selected_items.clear();
                self.context.last_selected_item = None;
                self.record(UserAction::new("deselect", "cleared all"));
            }
        }
    }

    fn record(&mut self, action: UserAction) {
        self.context.recent_actions.record(action);
    }

    /// Silently update scroll offsets
    ///
    /// No action, no notification, no timestamp refresh: geometry is noise
    /// to subscribers and never persisted.
    pub const fn scroll_to(&mut self, x: f64, y: f64) {
        self.context.viewport.scroll_to(x, y);
    }

    /// Silently update viewport dimensions and recompute the visible rect
    pub const fn resize_to(&mut self, width: f64, height: f64) {
        self.context.viewport.resize_to(width, height);
    }

    /// Copy of the current context with a fresh timestamp
    ///
    /// Reading never touches the stored timestamp.
    #[must_use]
    pub fn snapshot(&self) -> UiContext {
        let mut snapshot = self.context.clone();
        snapshot.timestamp = now_millis();
        snapshot
    }

    /// Snapshot rendered as a JSON string
    ///
    /// Serialization failure is logged and yields `"{}"` so callers always
    /// receive parseable JSON.
    #[must_use]
    pub fn serialized_snapshot(&self) -> String {
        let started = Instant::now();

        let serialized = match serde_json::to_string(&self.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "context serialization failed");
                "{}".to_string()
            }
        };

        let elapsed = started.elapsed();
        if elapsed > SERIALIZE_BUDGET {
            tracing::warn!(
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "context serialization exceeded 10ms budget"
            );
        }

        serialized
    }

    /// One-line context description for logs and agent prompts
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Page: {}, View: {}, Selected: {}, Actions: {}",
            self.context.page,
            self.context.view,
            self.context.selected_items.len(),
            self.context.recent_actions.len()
        )
    }

    /// Persisted subset of the current context
    #[must_use]
    pub fn projection(&self) -> SessionProjection {
        SessionProjection {
            page: Some(self.context.page.clone()),
            view: Some(self.context.view.clone()),
            filters: Some(self.context.filters.clone()),
            search_query: Some(self.context.search_query.clone()),
            component_states: Some(self.context.component_states.clone()),
        }
    }

    /// Overlay a persisted projection onto the current context
    ///
    /// Absent fields keep their current values. Does not notify: restore
    /// runs during construction, before anyone can subscribe.
    pub fn restore(&mut self, projection: SessionProjection) {
        if let Some(page) = projection.page {
            self.context.page = page;
        }
        if let Some(view) = projection.view {
            self.context.view = view;
        }
        if let Some(filters) = projection.filters {
            self.context.filters = filters;
        }
        if let Some(query) = projection.search_query {
            self.context.search_query = query;
        }
        if let Some(states) = projection.component_states {
            self.context.component_states = states;
        }
        self.context.timestamp = now_millis();
    }

    /// Reset to the initial context and notify listeners
    pub fn clear(&mut self) {
        self.context = self.initial.clone();
        self.context.timestamp = now_millis();
        self.subscribers.notify(&self.context);
    }

    /// Register a listener for observable mutations
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Remove a listener; false when the id is unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
