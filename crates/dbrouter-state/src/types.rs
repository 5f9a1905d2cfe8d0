//! Value and key types for the local data store.
//!
//! Values are either a single string (a published field) or a list of
//! strings (the prefix registry). Both serialize to plain JSON so the stored
//! bytes stay readable with any JSON tool.

use serde::{Deserialize, Serialize};

/// Suffix segment separating the namespace from the field name.
const LOCAL_DATA_SEGMENT: &str = "local-data";

// ── Values ─────────────────────────────────────────────────────────

/// A value persisted in the local store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LocalValue {
    Text(String),
    List(Vec<String>),
}

impl LocalValue {
    /// Borrow the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LocalValue::Text(s) => Some(s),
            LocalValue::List(_) => None,
        }
    }

    /// Borrow the list, if this is a list value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            LocalValue::Text(_) => None,
            LocalValue::List(items) => Some(items),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            LocalValue::Text(s) => Some(s),
            LocalValue::List(_) => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<String>> {
        match self {
            LocalValue::Text(_) => None,
            LocalValue::List(items) => Some(items),
        }
    }
}

impl From<&str> for LocalValue {
    fn from(s: &str) -> Self {
        LocalValue::Text(s.to_string())
    }
}

impl From<String> for LocalValue {
    fn from(s: String) -> Self {
        LocalValue::Text(s)
    }
}

impl From<Vec<String>> for LocalValue {
    fn from(items: Vec<String>) -> Self {
        LocalValue::List(items)
    }
}

// ── Namespacing ────────────────────────────────────────────────────

/// Identity of one endpoint instance inside a shared store.
///
/// Components are escaped (`%` as `%25`, `.` as `%2E`) before joining, so
/// every key has exactly three dot-free namespace segments and two
/// namespaces that differ in any component never produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreNamespace {
    pub role: String,
    pub relation_role: String,
    pub endpoint_name: String,
}

impl StoreNamespace {
    pub fn new(role: &str, relation_role: &str, endpoint_name: &str) -> Self {
        Self {
            role: role.to_string(),
            relation_role: relation_role.to_string(),
            endpoint_name: endpoint_name.to_string(),
        }
    }

    /// Common prefix of every key in this namespace, including the trailing dot.
    pub fn key_prefix(&self) -> String {
        format!(
            "{}.{}.{}.{LOCAL_DATA_SEGMENT}.",
            escape(&self.role),
            escape(&self.relation_role),
            escape(&self.endpoint_name)
        )
    }

    /// Full store key for a field.
    pub fn key(&self, field: &str) -> String {
        format!("{}{field}", self.key_prefix())
    }

    /// Strip the namespace from a store key, returning the field name.
    pub fn field<'a>(&self, key: &'a str) -> Option<&'a str> {
        let prefix = self.key_prefix();
        key.strip_prefix(prefix.as_str())
    }
}

fn escape(component: &str) -> String {
    component.replace('%', "%25").replace('.', "%2E")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_serializes_as_json_string() {
        let bytes = serde_json::to_vec(&LocalValue::from("10.0.0.5")).unwrap();
        assert_eq!(bytes, br#""10.0.0.5""#);
    }

    #[test]
    fn list_serializes_as_json_array() {
        let value = LocalValue::from(vec!["router".to_string(), "app1".to_string()]);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert_eq!(bytes, br#"["router","app1"]"#);

        let back: LocalValue = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.as_list().unwrap(), ["router", "app1"]);
        assert!(back.as_text().is_none());
    }

    #[test]
    fn namespace_key_layout() {
        let ns = StoreNamespace::new("reactive.conversations", "requires", "db-router");
        assert_eq!(
            ns.key("prefixes"),
            "reactive%2Econversations.requires.db-router.local-data.prefixes"
        );
        assert_eq!(ns.field(&ns.key("p_username")), Some("p_username"));
    }

    #[test]
    fn namespaces_do_not_collide() {
        let a = StoreNamespace::new("reactive", "requires", "db-router");
        let b = StoreNamespace::new("reactive", "requires", "shared-db");
        assert_ne!(a.key("prefixes"), b.key("prefixes"));
        assert!(a.field(&b.key("prefixes")).is_none());
    }

    #[test]
    fn dotted_components_do_not_collide() {
        let a = StoreNamespace::new("reactive.conversations", "requires", "db-router");
        let b = StoreNamespace::new("reactive", "conversations.requires", "db-router");
        assert_ne!(a.key("prefixes"), b.key("prefixes"));

        let c = StoreNamespace::new("reactive", "requires", "db.router");
        let d = StoreNamespace::new("reactive", "requires.db", "router");
        assert_ne!(c.key("prefixes"), d.key("prefixes"));
    }

    #[test]
    fn escaped_text_does_not_alias_a_dot() {
        let a = StoreNamespace::new("reactive", "requires", "db.router");
        let b = StoreNamespace::new("reactive", "requires", "db%2Erouter");
        assert_ne!(a.key("prefixes"), b.key("prefixes"));
    }

    #[test]
    fn field_with_dots_stays_in_its_namespace() {
        let a = StoreNamespace::new("a", "b", "c");
        let b = StoreNamespace::new("a.b.c.local-data", "d", "e");
        assert_ne!(a.key("d.e.local-data.f"), b.key("f"));
    }
}
