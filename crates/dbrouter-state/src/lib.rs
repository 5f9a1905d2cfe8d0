//! dbrouter-state — durable local data for db-router requirer endpoints.
//!
//! Backed by [redb](https://docs.rs/redb), holds the values an endpoint
//! publishes to its peers and the registry of prefixes it has declared, so
//! both survive process restarts.
//!
//! # Architecture
//!
//! Every value is a [`LocalValue`] JSON-serialized into a single redb table
//! with `&str` keys. Keys are namespaced per endpoint
//! (`{role}.{relation_role}.{endpoint}.local-data.{field}`, see
//! [`StoreNamespace`]) so several endpoints can share one backend.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`).
//! Callers that only need reads and writes should depend on the
//! [`LocalStore`] trait instead.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::{LocalStore, StateStore};
pub use types::*;
