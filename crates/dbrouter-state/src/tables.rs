//! redb table definitions for the local data store.

use redb::TableDefinition;

/// Endpoint-local values keyed by `{role}.{relation_role}.{endpoint}.local-data.{field}`.
pub const LOCAL_DATA: TableDefinition<&str, &[u8]> = TableDefinition::new("local_data");
