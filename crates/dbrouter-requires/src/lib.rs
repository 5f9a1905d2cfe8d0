//! dbrouter-requires — the requirer side of the db-router relation.
//!
//! A requirer declares one or more prefixes (logical database requests
//! multiplexed over a single relation), publishes identifying data for each,
//! and watches the provider's replies until the exchange is complete.
//!
//! # Architecture
//!
//! ```text
//! External scheduler
//!   ├── on_joined / on_changed  → raise connected, recompute availability
//!   └── on_departed / on_broken → lower all, recompute or reset registry
//!
//! Requirer
//!   ├── Relations (connections, app scope + per-unit scope)
//!   ├── LocalStore (prefix registry, published fields)
//!   └── FlagSink (connected, available, available.proxy, available.ssl)
//! ```

pub mod config;
pub mod error;
pub mod fields;
pub mod flags;
pub mod relation;
pub mod requirer;

pub use config::RequirerConfig;
pub use error::{RequirerError, RequirerResult};
pub use flags::{FlagSet, FlagSink, Readiness};
pub use relation::{Connection, Relations};
pub use requirer::{RelationEvent, Requirer};
