//! Observable UI context store
//!
//! Combines:
//! - The context state shape and its wire contract
//! - Typed updates applied through a single store
//! - Synchronous subscriptions with isolated listener failures
//! - A bounded trail of recent user actions

mod actions;
mod broker;
mod handle;
mod store;
mod types;
mod update;

pub use actions::{ActionRing, UserAction};
pub use broker::{Listener, SubscriberRegistry, SubscriptionId};
pub use handle::ContextHandle;
pub use store::ContextStore;
pub use types::{
    SelectedItem, SessionProjection, SortOrder, StateMap, UiContext, ViewportInfo, VisibleData,
    VisibleRect, now_millis,
};
pub use update::{ContextUpdate, SelectionMode, UpdateEnvelope};
