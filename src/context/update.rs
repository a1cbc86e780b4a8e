//! Typed context updates and their raw wire envelopes
//!
//! Clients post `{ "type": ..., "payload": ... }` envelopes. Known kinds
//! deserialize into [`ContextUpdate`]; unknown kinds are first-class no-ops
//! so shells can ship new update types before the gateway understands them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{SelectedItem, StateMap};

/// Update kinds the store understands, matching the `type` tag on the wire
const KNOWN_KINDS: [&str; 8] = [
    "page",
    "view",
    "selection",
    "data",
    "filter",
    "search",
    "action",
    "component",
];

/// Raw wire envelope before interpretation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEnvelope {
    /// Update kind tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload
    #[serde(default)]
    pub payload: Value,
}

impl UpdateEnvelope {
    /// Interpret the envelope as a typed update
    ///
    /// Unknown kinds yield `None` and log at debug. Known kinds whose
    /// payload does not match the declared shape also yield `None`, after
    /// a warning.
    #[must_use]
    pub fn into_update(self) -> Option<ContextUpdate> {
        if !KNOWN_KINDS.contains(&self.kind.as_str()) {
            tracing::debug!(kind = %self.kind, "ignoring unknown update kind");
            return None;
        }

        let raw = serde_json::json!({ "type": self.kind, "payload": self.payload });
        match serde_json::from_value(raw) {
            Ok(update) => Some(update),
            Err(e) => {
                tracing::warn!(kind = %self.kind, error = %e, "discarding malformed update payload");
                None
            }
        }
    }
}

/// How a selection update combines with the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Replace the selection
    Set,
    /// Append to the selection, duplicates allowed
    Add,
    /// Drop selected items whose id matches
    Remove,
    /// Empty the selection
    Clear,
}

/// Closed set of context mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ContextUpdate {
    /// Navigate to a page; the current view carries over
    Page(String),
    /// Switch the view within the current page
    View(String),
    /// Mutate the selection per [`SelectionMode`]
    Selection {
        #[serde(default)]
        items: Vec<SelectedItem>,
        mode: SelectionMode,
    },
    /// Replace the visible-data snapshot wholesale
    #[serde(rename_all = "camelCase")]
    Data {
        items: Vec<Value>,
        total_count: u64,
        #[serde(rename = "type")]
        data_type: String,
    },
    /// Shallow-merge the payload map into the active filters
    Filter(StateMap),
    /// Replace the search query
    Search(String),
    /// Record an arbitrary action on the trail
    Action {
        #[serde(rename = "type")]
        action_type: String,
        target: String,
        #[serde(default)]
        metadata: Option<Value>,
    },
    /// Shallow-merge componentId → state entries into the component map
    Component(StateMap),
}
