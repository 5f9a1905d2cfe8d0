//! Connection model — the peer links a requirer is attached to.
//!
//! A [`Connection`] mirrors what the relation transport knows about one
//! relation: the data the remote application published once for all its
//! units, the data each remote unit published on its own, the set of
//! currently linked units, and what this side wants to publish back. The
//! transport fills these in; the requirer only reads them and writes
//! `to_publish`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

/// One active peer link.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    id: String,
    /// Remote application-scope data.
    app_data: HashMap<String, String>,
    /// Per-unit broadcast data: unit name → key/value pairs.
    /// Ordered by unit number so the lowest-numbered unit wins fallback reads.
    units: BTreeMap<UnitName, HashMap<String, String>>,
    /// Outgoing data this side publishes.
    to_publish: HashMap<String, String>,
}

impl Connection {
    /// Create a connection with no linked units.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Link a remote unit. Already linked units keep their data.
    pub fn join_unit(&mut self, unit: &str) {
        self.units.entry(UnitName::new(unit)).or_default();
        debug!(relation = %self.id, %unit, "unit joined");
    }

    /// Unlink a remote unit, dropping its data. Returns true if it was linked.
    pub fn depart_unit(&mut self, unit: &str) -> bool {
        let existed = self.units.remove(&UnitName::new(unit)).is_some();
        debug!(relation = %self.id, %unit, existed, "unit departed");
        existed
    }

    /// Names of the currently linked remote units.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(|u| u.0.as_str())
    }

    pub fn has_units(&self) -> bool {
        !self.units.is_empty()
    }

    /// Record a value from the remote application scope.
    pub fn set_app_data(&mut self, key: &str, value: &str) {
        self.app_data.insert(key.to_string(), value.to_string());
    }

    /// Record a value broadcast by one remote unit, linking the unit if needed.
    pub fn set_unit_data(&mut self, unit: &str, key: &str, value: &str) {
        self.units
            .entry(UnitName::new(unit))
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Non-empty application-scope value for `key`.
    pub fn received_app(&self, key: &str) -> Option<&str> {
        non_empty(self.app_data.get(key))
    }

    /// First non-empty value for `key` across linked units, lowest unit number first.
    pub fn received_unit(&self, key: &str) -> Option<&str> {
        self.units.values().find_map(|data| non_empty(data.get(key)))
    }

    /// Stage a value for publication to the remote side.
    pub fn publish(&mut self, key: &str, value: &str) {
        self.to_publish.insert(key.to_string(), value.to_string());
    }

    /// Value currently staged for publication.
    pub fn published(&self, key: &str) -> Option<&str> {
        self.to_publish.get(key).map(String::as_str)
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// Unit name (`app/N`) ordered by application, then numerically by unit number.
///
/// Names without a numeric suffix sort before numbered units of the same
/// application; the full name breaks remaining ties.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UnitName(String);

impl UnitName {
    fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    fn sort_key(&self) -> (&str, Option<u64>, &str) {
        match self.0.rsplit_once('/') {
            Some((app, number)) => (app, number.parse().ok(), self.0.as_str()),
            None => (self.0.as_str(), None, self.0.as_str()),
        }
    }
}

impl Ord for UnitName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for UnitName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The ordered set of active connections for one endpoint.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    connections: Vec<Connection>,
}

impl Relations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection, replacing any existing one with the same ID.
    pub fn add(&mut self, connection: Connection) {
        match self.connections.iter_mut().find(|c| c.id == connection.id) {
            Some(existing) => *existing = connection,
            None => self.connections.push(connection),
        }
    }

    /// Remove a connection by ID.
    pub fn remove(&mut self, id: &str) -> Option<Connection> {
        let idx = self.connections.iter().position(|c| c.id == id)?;
        Some(self.connections.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Connection> {
        self.connections.iter_mut().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Connection> {
        self.connections.iter_mut()
    }

    /// True if any connection still has at least one linked unit.
    pub fn any_units(&self) -> bool {
        self.connections.iter().any(Connection::has_units)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_read_as_absent() {
        let mut conn = Connection::new("db-router:3");
        conn.set_app_data("db_host", "");
        conn.set_unit_data("mysql/0", "db_host", "");

        assert!(conn.received_app("db_host").is_none());
        assert!(conn.received_unit("db_host").is_none());
    }

    #[test]
    fn unit_scope_skips_units_without_value() {
        let mut conn = Connection::new("db-router:3");
        conn.join_unit("mysql/0");
        conn.set_unit_data("mysql/1", "db_host", "10.0.0.6");

        assert_eq!(conn.received_unit("db_host"), Some("10.0.0.6"));
    }

    #[test]
    fn lowest_unit_number_wins_fallback() {
        let mut conn = Connection::new("db-router:3");
        conn.set_unit_data("mysql/10", "db_host", "ten");
        conn.set_unit_data("mysql/2", "db_host", "two");

        assert_eq!(conn.received_unit("db_host"), Some("two"));
        assert_eq!(conn.units().collect::<Vec<_>>(), ["mysql/2", "mysql/10"]);
    }

    #[test]
    fn depart_unit_drops_its_data() {
        let mut conn = Connection::new("db-router:3");
        conn.set_unit_data("mysql/0", "db_host", "10.0.0.5");

        assert!(conn.depart_unit("mysql/0"));
        assert!(!conn.depart_unit("mysql/0"));
        assert!(!conn.has_units());
        assert!(conn.received_unit("db_host").is_none());
    }

    #[test]
    fn join_unit_keeps_existing_data() {
        let mut conn = Connection::new("db-router:3");
        conn.set_unit_data("mysql/0", "db_host", "10.0.0.5");
        conn.join_unit("mysql/0");

        assert_eq!(conn.units().collect::<Vec<_>>(), ["mysql/0"]);
        assert_eq!(conn.received_unit("db_host"), Some("10.0.0.5"));
    }

    #[test]
    fn add_replaces_same_id() {
        let mut relations = Relations::new();
        relations.add(Connection::new("db-router:3"));

        let mut replacement = Connection::new("db-router:3");
        replacement.join_unit("mysql/0");
        relations.add(replacement);

        assert_eq!(relations.len(), 1);
        assert!(relations.any_units());
    }

    #[test]
    fn remove_by_id() {
        let mut relations = Relations::new();
        relations.add(Connection::new("db-router:3"));
        relations.add(Connection::new("db-router:4"));

        assert!(relations.remove("db-router:3").is_some());
        assert!(relations.remove("db-router:3").is_none());
        let ids: Vec<&str> = relations.iter().map(Connection::id).collect();
        assert_eq!(ids, ["db-router:4"]);
    }
}
