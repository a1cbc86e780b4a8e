//! Shared test utilities

use vantage_gateway::{DbPool, UiContext, ViewportInfo, db};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Initial context matching the default gateway configuration
#[must_use]
pub fn initial_context() -> UiContext {
    UiContext::initial(
        "dashboard",
        "default",
        ViewportInfo::with_dimensions(1920.0, 1080.0),
    )
}
