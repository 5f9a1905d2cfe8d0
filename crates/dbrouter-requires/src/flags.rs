//! Readiness signals raised and cleared by the requirer.
//!
//! Signals are level-triggered: setting an already set flag or clearing an
//! already clear one is a no-op. The notification substrate that reacts to
//! them sits behind [`FlagSink`]; [`FlagSet`] is an in-memory implementation.

use std::collections::BTreeSet;

/// The four readiness conditions an endpoint reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    /// At least one connection is present.
    Connected,
    /// Base db-router data complete.
    Available,
    /// Proxied database data complete.
    AvailableProxy,
    /// TLS material received.
    AvailableSsl,
}

impl Readiness {
    pub const ALL: [Readiness; 4] = [
        Readiness::Connected,
        Readiness::Available,
        Readiness::AvailableProxy,
        Readiness::AvailableSsl,
    ];

    fn suffix(self) -> &'static str {
        match self {
            Readiness::Connected => "connected",
            Readiness::Available => "available",
            Readiness::AvailableProxy => "available.proxy",
            Readiness::AvailableSsl => "available.ssl",
        }
    }

    /// Flag name for this condition on the given endpoint, e.g. `db-router.available.ssl`.
    pub fn flag_name(self, endpoint: &str) -> String {
        format!("{endpoint}.{}", self.suffix())
    }
}

/// Named boolean flags consumed by the notification substrate.
pub trait FlagSink {
    fn set_flag(&mut self, name: &str);
    fn clear_flag(&mut self, name: &str);
    fn is_set(&self, name: &str) -> bool;
}

/// In-memory flag set.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: BTreeSet<String>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all currently set flags, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }
}

impl FlagSink for FlagSet {
    fn set_flag(&mut self, name: &str) {
        if self.flags.insert(name.to_string()) {
            tracing::debug!(flag = %name, "flag set");
        }
    }

    fn clear_flag(&mut self, name: &str) {
        if self.flags.remove(name) {
            tracing::debug!(flag = %name, "flag cleared");
        }
    }

    fn is_set(&self, name: &str) -> bool {
        self.flags.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_names() {
        let names: Vec<String> = Readiness::ALL
            .iter()
            .map(|r| r.flag_name("mysql-router"))
            .collect();
        assert_eq!(
            names,
            [
                "mysql-router.connected",
                "mysql-router.available",
                "mysql-router.available.proxy",
                "mysql-router.available.ssl",
            ]
        );
    }

    #[test]
    fn set_and_clear_are_level_triggered() {
        let mut flags = FlagSet::new();
        flags.set_flag("db-router.available");
        flags.set_flag("db-router.available");
        assert_eq!(flags.iter().count(), 1);

        flags.clear_flag("db-router.available");
        flags.clear_flag("db-router.available");
        assert!(!flags.is_set("db-router.available"));
    }
}
