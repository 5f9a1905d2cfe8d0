//! Error types for the local data store.

use thiserror::Error;

/// Result type alias for local store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during local store operations.
///
/// Every variant means the store could not serve the request; callers treat
/// them as "store unavailable" and propagate them unchanged.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
