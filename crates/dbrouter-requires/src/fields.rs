//! Field names exchanged over the db-router relation.

/// Address of the database the provider exposes.
pub const DB_HOST: &str = "db_host";
pub const SSL_CA: &str = "ssl_ca";
pub const SSL_CERT: &str = "ssl_cert";
pub const SSL_KEY: &str = "ssl_key";
/// Optional, never gates readiness.
pub const WAIT_TIMEOUT: &str = "wait_timeout";
pub const PRIVATE_ADDRESS: &str = "private-address";

/// Local-only field holding the prefix registry.
pub const PREFIXES: &str = "prefixes";

pub const USERNAME: &str = "_username";
pub const HOSTNAME: &str = "_hostname";
pub const DATABASE: &str = "_database";
pub const PASSWORD: &str = "_password";
pub const ALLOWED_UNITS: &str = "_allowed_units";

/// Build a per-prefix field name, e.g. `prefixed("router", PASSWORD)` is `router_password`.
pub fn prefixed(prefix: &str, suffix: &str) -> String {
    format!("{prefix}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_field_names() {
        assert_eq!(prefixed("router", PASSWORD), "router_password");
        assert_eq!(prefixed("app1", ALLOWED_UNITS), "app1_allowed_units");
    }
}
