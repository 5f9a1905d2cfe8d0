//! Error types for the requirer endpoint.

use dbrouter_state::StateError;
use thiserror::Error;

/// Result type alias for requirer operations.
pub type RequirerResult<T> = Result<T, RequirerError>;

/// Errors surfaced by requirer operations.
///
/// Missing remote data is never an error; reads return `None` instead.
/// The only failure is the local store itself.
#[derive(Debug, Error)]
pub enum RequirerError {
    #[error(transparent)]
    Store(#[from] StateError),
}
