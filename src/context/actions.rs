//! Recent-action ring
//!
//! The context keeps a short trail of what the user just did so agents can
//! ground their replies ("you just filtered by status"). The trail is a
//! bounded FIFO: recording past capacity evicts the oldest entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::now_millis;

/// A recorded user action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    /// Action kind (e.g. "navigate", "select", "search")
    #[serde(rename = "type")]
    pub action_type: String,
    /// What the action was aimed at
    pub target: String,
    /// Epoch milliseconds when the action was recorded
    pub timestamp: i64,
    /// Structured detail; explicit `null` on the wire when absent
    pub metadata: Option<Value>,
}

impl UserAction {
    /// Action stamped with the current time
    #[must_use]
    pub fn new(action_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            target: target.into(),
            timestamp: now_millis(),
            metadata: None,
        }
    }

    /// Action with structured detail attached
    #[must_use]
    pub fn with_metadata(
        action_type: impl Into<String>,
        target: impl Into<String>,
        metadata: Option<Value>,
    ) -> Self {
        Self {
            metadata,
            ..Self::new(action_type, target)
        }
    }
}

/// Bounded FIFO of recent user actions
///
/// Serializes transparently as a JSON array, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionRing {
    actions: Vec<UserAction>,
}

impl ActionRing {
    /// Retained action count before eviction kicks in
    pub const CAPACITY: usize = 10;

    /// Append an action, evicting the oldest past capacity
    pub fn record(&mut self, action: UserAction) {
        self.actions.push(action);
        if self.actions.len() > Self::CAPACITY {
            self.actions.remove(0);
        }
    }

    /// Drop all recorded actions
    pub fn reset(&mut self) {
        self.actions.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Recorded actions, oldest first
    #[must_use]
    pub fn as_slice(&self) -> &[UserAction] {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_evicts_oldest_past_capacity() {
        let mut ring = ActionRing::default();
        for i in 0..12 {
            ring.record(UserAction::new("navigate", format!("page-{i}")));
        }

        assert_eq!(ring.len(), ActionRing::CAPACITY);
        // The first two entries were evicted; order is preserved
        assert_eq!(ring.as_slice()[0].target, "page-2");
        assert_eq!(ring.as_slice()[9].target, "page-11");
    }

    #[test]
    fn ring_keeps_insertion_order_under_capacity() {
        let mut ring = ActionRing::default();
        ring.record(UserAction::new("select", "3 items"));
        ring.record(UserAction::new("search", "acme"));

        assert_eq!(ring.len(), 2);
        assert_eq!(ring.as_slice()[0].action_type, "select");
        assert_eq!(ring.as_slice()[1].action_type, "search");
    }

    #[test]
    fn action_serializes_metadata_as_explicit_null() {
        let action = UserAction::new("navigate", "contacts");
        let json: Value = serde_json::to_value(&action).unwrap();

        assert_eq!(json["type"], "navigate");
        assert_eq!(json["target"], "contacts");
        assert!(json["metadata"].is_null());
        assert!(json["timestamp"].is_i64());
    }

    #[test]
    fn ring_serializes_as_plain_array() {
        let mut ring = ActionRing::default();
        ring.record(UserAction::new("search", "beta"));

        let json: Value = serde_json::to_value(&ring).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["target"], "beta");
    }
}
