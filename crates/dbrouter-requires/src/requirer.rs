//! Requirer endpoint — prefix registry, remote data merge, and readiness.
//!
//! The [`Requirer`] owns the active [`Relations`], a [`LocalStore`] handle
//! scoped to its [`StoreNamespace`], and a [`FlagSink`]. The external
//! scheduler calls the `on_*` methods (or [`Requirer::handle`]) after the
//! transport has updated the connections; each call recomputes readiness
//! from the current state and runs to completion.
//!
//! Remote values are resolved application scope first, on every connection,
//! before falling back to per-unit broadcast data for peers that predate
//! the application-scope channel.

use std::collections::BTreeMap;

use dbrouter_state::{LocalStore, LocalValue, StateError, StoreNamespace};
use tracing::{debug, info, warn};

use crate::config::RequirerConfig;
use crate::error::RequirerResult;
use crate::fields::{self, prefixed};
use crate::flags::{FlagSink, Readiness};
use crate::relation::Relations;

/// Relation lifecycle events delivered by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationEvent {
    Joined,
    Changed,
    Departed,
    Broken,
}

/// Requirer side of a db-router relation.
pub struct Requirer<S, F> {
    endpoint_name: String,
    namespace: StoreNamespace,
    store: S,
    flags: F,
    relations: Relations,
}

impl<S: LocalStore, F: FlagSink> Requirer<S, F> {
    /// Create a requirer with no connections.
    pub fn new(config: &RequirerConfig, store: S, flags: F) -> Self {
        Self {
            endpoint_name: config.endpoint_name.clone(),
            namespace: config.namespace(),
            store,
            flags,
            relations: Relations::new(),
        }
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    pub fn namespace(&self) -> &StoreNamespace {
        &self.namespace
    }

    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    /// Mutable access for the transport to add, remove, and update connections.
    pub fn relations_mut(&mut self) -> &mut Relations {
        &mut self.relations
    }

    pub fn flags(&self) -> &F {
        &self.flags
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the given readiness flag is currently raised.
    pub fn is_ready(&self, readiness: Readiness) -> bool {
        self.flags.is_set(&readiness.flag_name(&self.endpoint_name))
    }

    // ── Local data ─────────────────────────────────────────────────

    fn set_local(&self, field: &str, value: &LocalValue) -> RequirerResult<()> {
        self.store.set(&self.namespace.key(field), value)?;
        Ok(())
    }

    fn get_local_text(&self, field: &str) -> RequirerResult<Option<String>> {
        let value = self.store.get(&self.namespace.key(field))?;
        Ok(value.and_then(LocalValue::into_text))
    }

    /// Registered prefixes in insertion order. Empty if none were ever registered.
    ///
    /// A registry stored as anything but a list is a store deserialization error.
    pub fn prefixes(&self) -> RequirerResult<Vec<String>> {
        let key = self.namespace.key(fields::PREFIXES);
        match self.store.get(&key)? {
            None => Ok(Vec::new()),
            Some(value) => value.into_list().ok_or_else(|| {
                StateError::Deserialize(format!("prefix registry at {key} is not a list")).into()
            }),
        }
    }

    /// Database name this side published for `prefix`.
    pub fn database(&self, prefix: &str) -> RequirerResult<Option<String>> {
        self.get_local_text(&prefixed(prefix, fields::DATABASE))
    }

    /// Username this side published for `prefix`.
    pub fn username(&self, prefix: &str) -> RequirerResult<Option<String>> {
        self.get_local_text(&prefixed(prefix, fields::USERNAME))
    }

    /// Hostname this side published for `prefix`.
    pub fn hostname(&self, prefix: &str) -> RequirerResult<Option<String>> {
        self.get_local_text(&prefixed(prefix, fields::HOSTNAME))
    }

    // ── Remote data ────────────────────────────────────────────────

    /// Resolve a remote value.
    ///
    /// The first connection with a non-empty application-scope value wins.
    /// Only if no connection has one are per-unit values consulted.
    pub fn received(&self, key: &str) -> Option<&str> {
        self.relations
            .iter()
            .find_map(|conn| conn.received_app(key))
            .or_else(|| self.relations.iter().find_map(|conn| conn.received_unit(key)))
    }

    /// Resolve `prefix + suffix` for every registered prefix and every suffix.
    pub fn read_suffixes(
        &self,
        suffixes: &[&str],
    ) -> RequirerResult<BTreeMap<String, Option<&str>>> {
        let mut data = BTreeMap::new();
        for prefix in self.prefixes()? {
            for suffix in suffixes {
                let key = prefixed(&prefix, suffix);
                let value = self.received(&key);
                data.insert(key, value);
            }
        }
        Ok(data)
    }

    pub fn db_host(&self) -> Option<&str> {
        self.received(fields::DB_HOST)
    }

    pub fn ssl_ca(&self) -> Option<&str> {
        self.received(fields::SSL_CA)
    }

    pub fn ssl_cert(&self) -> Option<&str> {
        self.received(fields::SSL_CERT)
    }

    pub fn ssl_key(&self) -> Option<&str> {
        self.received(fields::SSL_KEY)
    }

    pub fn wait_timeout(&self) -> Option<&str> {
        self.received(fields::WAIT_TIMEOUT)
    }

    /// `wait_timeout` in seconds, `None` if absent or not an integer.
    pub fn wait_timeout_secs(&self) -> Option<u64> {
        self.wait_timeout().and_then(|v| v.trim().parse().ok())
    }

    pub fn password(&self, prefix: &str) -> Option<&str> {
        self.received(&prefixed(prefix, fields::PASSWORD))
    }

    /// Raw allowed-units value for `prefix` (space separated unit names).
    pub fn allowed_units(&self, prefix: &str) -> Option<&str> {
        self.received(&prefixed(prefix, fields::ALLOWED_UNITS))
    }

    pub fn allowed_unit_list(&self, prefix: &str) -> Vec<&str> {
        self.allowed_units(prefix)
            .map(|v| v.split_whitespace().collect())
            .unwrap_or_default()
    }

    // ── Completeness ───────────────────────────────────────────────

    /// `db_host` plus a password for every registered prefix.
    ///
    /// Never complete while the registry is empty.
    pub fn db_router_data_complete(&self) -> RequirerResult<bool> {
        if self.db_host().is_none() || self.prefixes()?.is_empty() {
            return Ok(false);
        }
        let data = self.read_suffixes(&[fields::PASSWORD])?;
        Ok(data.values().all(Option::is_some))
    }

    /// `db_host` plus password and allowed units for every prefix.
    ///
    /// The first prefix is the router's own; proxied databases are any
    /// beyond it, so a single registered prefix is never proxy complete.
    pub fn proxy_db_data_complete(&self) -> RequirerResult<bool> {
        if self.prefixes()?.len() <= 1 || self.db_host().is_none() {
            return Ok(false);
        }
        let data = self.read_suffixes(&[fields::PASSWORD, fields::ALLOWED_UNITS])?;
        Ok(data.values().all(Option::is_some))
    }

    /// CA material received. Certificate and key are optional.
    pub fn ssl_data_complete(&self) -> bool {
        self.ssl_ca().is_some()
    }

    // ── Reactor ────────────────────────────────────────────────────

    /// Dispatch a lifecycle event.
    pub fn handle(&mut self, event: RelationEvent) -> RequirerResult<()> {
        debug!(endpoint = %self.endpoint_name, ?event, "relation event");
        match event {
            RelationEvent::Joined => self.on_joined(),
            RelationEvent::Changed => self.on_changed(),
            RelationEvent::Departed => self.on_departed(),
            RelationEvent::Broken => self.on_broken(),
        }
    }

    pub fn on_joined(&mut self) -> RequirerResult<()> {
        let connected = !self.relations.is_empty();
        self.set_or_clear(Readiness::Connected, connected);
        self.set_or_clear_available()
    }

    pub fn on_changed(&mut self) -> RequirerResult<()> {
        self.on_joined()
    }

    pub fn on_broken(&mut self) -> RequirerResult<()> {
        self.on_departed()
    }

    /// Lower every signal, then either recompute them (units remain) or
    /// reset the prefix registry (no connection has a unit left).
    ///
    /// The reset is per endpoint, not per remote application: several
    /// linked applications that all have zero units trigger it too.
    pub fn on_departed(&mut self) -> RequirerResult<()> {
        for readiness in Readiness::ALL {
            self.set_or_clear(readiness, false);
        }

        if self.relations.any_units() {
            return self.on_joined();
        }

        // Forces a fresh negotiation instead of waiting on stale prefixes.
        self.set_local(fields::PREFIXES, &LocalValue::List(Vec::new()))?;
        info!(endpoint = %self.endpoint_name, "last unit departed, prefix registry reset");
        Ok(())
    }

    /// Recompute the three availability predicates and raise or lower each flag.
    pub fn set_or_clear_available(&mut self) -> RequirerResult<()> {
        let base = self.db_router_data_complete()?;
        let proxy = self.proxy_db_data_complete()?;
        let ssl = self.ssl_data_complete();
        debug!(endpoint = %self.endpoint_name, base, proxy, ssl, "availability recomputed");

        self.set_or_clear(Readiness::Available, base);
        self.set_or_clear(Readiness::AvailableProxy, proxy);
        self.set_or_clear(Readiness::AvailableSsl, ssl);
        Ok(())
    }

    fn set_or_clear(&mut self, readiness: Readiness, on: bool) {
        let name = readiness.flag_name(&self.endpoint_name);
        if on {
            self.flags.set_flag(&name);
        } else {
            self.flags.clear_flag(&name);
        }
    }

    // ── Publishing ─────────────────────────────────────────────────

    /// Append `prefix` to the registry unless already present.
    ///
    /// Only registers while at least one connection exists; the registry is
    /// written at most once per call.
    pub fn set_prefix(&mut self, prefix: &str) -> RequirerResult<()> {
        if self.relations.is_empty() {
            warn!(endpoint = %self.endpoint_name, %prefix, "no connections, prefix not registered");
            return Ok(());
        }
        let mut prefixes = self.prefixes()?;
        if prefixes.iter().any(|p| p == prefix) {
            return Ok(());
        }
        prefixes.push(prefix.to_string());
        self.set_local(fields::PREFIXES, &LocalValue::List(prefixes))?;
        info!(endpoint = %self.endpoint_name, %prefix, "prefix registered");
        Ok(())
    }

    /// Register `prefix` and publish the router's credentials request.
    pub fn configure_db_router(
        &mut self,
        username: &str,
        hostname: &str,
        prefix: &str,
    ) -> RequirerResult<()> {
        let info = [
            (prefixed(prefix, fields::USERNAME), username),
            (prefixed(prefix, fields::HOSTNAME), hostname),
            (fields::PRIVATE_ADDRESS.to_string(), hostname),
        ];
        self.set_prefix(prefix)?;
        self.publish_all(&info)
    }

    /// Register `prefix` and publish a proxied database request.
    pub fn configure_proxy_db(
        &mut self,
        database: &str,
        username: &str,
        hostname: &str,
        prefix: &str,
    ) -> RequirerResult<()> {
        let info = [
            (prefixed(prefix, fields::DATABASE), database),
            (prefixed(prefix, fields::USERNAME), username),
            (prefixed(prefix, fields::HOSTNAME), hostname),
        ];
        self.set_prefix(prefix)?;
        self.publish_all(&info)
    }

    /// Publish to every connection and mirror each field into the local store.
    fn publish_all(&mut self, info: &[(String, &str)]) -> RequirerResult<()> {
        if self.relations.is_empty() {
            warn!(endpoint = %self.endpoint_name, "no connections, nothing published");
            return Ok(());
        }
        for conn in self.relations.iter_mut() {
            for (key, value) in info {
                conn.publish(key, value);
            }
        }
        for (key, value) in info {
            self.set_local(key, &LocalValue::from(*value))?;
        }
        debug!(
            endpoint = %self.endpoint_name,
            fields = info.len(),
            connections = self.relations.len(),
            "published"
        );
        Ok(())
    }
}
