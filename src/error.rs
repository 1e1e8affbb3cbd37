//! Error types for the Reviewdeck dashboard core
//!
//! This module provides structured error handling using thiserror for
//! error definitions and anyhow for error propagation at the edges.
//!
//! Propagation policy (see individual modules):
//! - Read paths recover locally: a `Query` failure degrades to the previous
//!   (or empty) data set and is logged, never thrown to the view.
//! - Write paths return the error to the caller so the initiating flow can
//!   surface it.
//! - An absent row on a single-row fetch is `Ok(None)`, not an error.

use thiserror::Error;

/// Main error type for Reviewdeck operations
#[derive(Error, Debug)]
pub enum ReviewdeckError {
    /// Persistence gateway read failed (transport, auth, malformed filter)
    #[error("Query error: {0}")]
    Query(String),

    /// Persistence gateway upsert failed (constraint violation, transport)
    #[error("Write error: {0}")]
    Write(String),

    /// Row expected but absent where absence is not a valid outcome
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP transport error
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Change feed subscription or stream error
    #[error("Change feed error: {0}")]
    Feed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Reviewdeck operations
pub type Result<T> = std::result::Result<T, ReviewdeckError>;

impl ReviewdeckError {
    /// True for the distinguished absent-row outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReviewdeckError::NotFound(_))
    }
}

/// Convert anyhow::Error to ReviewdeckError
impl From<anyhow::Error> for ReviewdeckError {
    fn from(err: anyhow::Error) -> Self {
        ReviewdeckError::Other(err.to_string())
    }
}
