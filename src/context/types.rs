//! Core state types for the observable UI context
//!
//! Everything here is a wire type: snapshots cross the HTTP/WebSocket
//! boundary as camelCase JSON with nullable fields rendered as explicit
//! `null`, never omitted.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::actions::ActionRing;

/// String-keyed map of opaque JSON values (filters, component state)
pub type StateMap = serde_json::Map<String, Value>;

/// An item the user currently has selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    /// Domain type of the item (e.g. "contact", "deal")
    #[serde(rename = "type")]
    pub item_type: String,
    /// Stable identifier within that type
    pub id: String,
    /// Item payload as shown to the user
    pub data: Value,
}

/// Snapshot of the data currently visible to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleData {
    /// Rows in view
    pub items: Vec<Value>,
    /// Total matching count, which may exceed the rows in view
    pub total_count: u64,
    /// Domain type of the rows
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Sort direction for the active view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Rectangle of the page currently on screen, in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Viewport geometry reported by the presentation shell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportInfo {
    pub scroll_y: f64,
    pub scroll_x: f64,
    pub width: f64,
    pub height: f64,
    pub visible_area: VisibleRect,
}

impl ViewportInfo {
    /// Viewport at scroll origin with the given dimensions
    #[must_use]
    pub const fn with_dimensions(width: f64, height: f64) -> Self {
        Self {
            scroll_y: 0.0,
            scroll_x: 0.0,
            width,
            height,
            visible_area: VisibleRect {
                top: 0.0,
                bottom: height,
                left: 0.0,
                right: width,
            },
        }
    }

    /// Update scroll offsets; dimensions and the visible rect stay as-is
    pub const fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    /// Update dimensions and recompute the visible rect from the current
    /// scroll position
    pub const fn resize_to(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.visible_area = VisibleRect {
            top: self.scroll_y,
            bottom: self.scroll_y + height,
            left: self.scroll_x,
            right: self.scroll_x + width,
        };
    }
}

/// Full observable UI context
///
/// One value per process; mutated through typed updates and read as
/// snapshots with a fresh timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiContext {
    /// Active page identifier
    pub page: String,
    /// Active view within the page
    pub view: String,
    pub selected_items: Vec<SelectedItem>,
    /// Most recently selected item; removal does not recompute this
    pub last_selected_item: Option<SelectedItem>,
    pub visible_data: Option<VisibleData>,
    pub filters: StateMap,
    pub search_query: String,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub recent_actions: ActionRing,
    pub viewport: ViewportInfo,
    pub component_states: StateMap,
    /// Epoch milliseconds of the last mutation (snapshot time on reads)
    pub timestamp: i64,
}

impl UiContext {
    /// Fresh context for a new session
    #[must_use]
    pub fn initial(page: impl Into<String>, view: impl Into<String>, viewport: ViewportInfo) -> Self {
        Self {
            page: page.into(),
            view: view.into(),
            selected_items: Vec::new(),
            last_selected_item: None,
            visible_data: None,
            filters: StateMap::new(),
            search_query: String::new(),
            sort_by: None,
            sort_order: None,
            recent_actions: ActionRing::default(),
            viewport,
            component_states: StateMap::new(),
            timestamp: now_millis(),
        }
    }
}

/// Subset of the context persisted across sessions
///
/// Every field is optional so older or partially written slots overlay
/// cleanly: absent fields keep their in-memory values on restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProjection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<StateMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_states: Option<StateMap>,
}

/// Current time as epoch milliseconds
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
