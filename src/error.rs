//! Error types for Vantage gateway

use thiserror::Error;

/// Result type alias for Vantage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Vantage gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
