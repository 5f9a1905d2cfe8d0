//! Requirer endpoint configuration (TOML).

use std::path::{Path, PathBuf};

use dbrouter_state::{StateResult, StateStore, StoreNamespace};
use serde::{Deserialize, Serialize};

fn default_endpoint_name() -> String {
    "db-router".to_string()
}

fn default_role() -> String {
    "reactive.conversations".to_string()
}

fn default_relation_role() -> String {
    "requires".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequirerConfig {
    /// Endpoint name; prefixes every readiness flag.
    #[serde(default = "default_endpoint_name")]
    pub endpoint_name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_relation_role")]
    pub relation_role: String,
    /// Local store file. In-memory when unset.
    pub store_path: Option<PathBuf>,
}

impl Default for RequirerConfig {
    fn default() -> Self {
        Self {
            endpoint_name: default_endpoint_name(),
            role: default_role(),
            relation_role: default_relation_role(),
            store_path: None,
        }
    }
}

impl RequirerConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Store namespace owned by this endpoint.
    pub fn namespace(&self) -> StoreNamespace {
        StoreNamespace::new(&self.role, &self.relation_role, &self.endpoint_name)
    }

    /// Open the configured local store.
    pub fn open_store(&self) -> StateResult<StateStore> {
        match &self.store_path {
            Some(path) => StateStore::open(path),
            None => StateStore::open_in_memory(),
        }
    }
}
