//! Document store configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which document store backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MongoDB via the official driver
    Mongodb,
    /// In-process store, optionally seeded from a JSON file
    Memory,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mongodb => f.write_str("mongodb"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// Connection string (mongodb backend)
    #[serde(default = "default_uri")]
    pub uri: String,
    /// Database name
    #[serde(default = "default_database")]
    pub database: String,
    /// Collection holding job postings
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Upper bound for a single fetch, including draining the cursor
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
    /// JSON array or JSON-lines file loaded into the memory backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_path: Option<PathBuf>,
}

fn default_backend() -> StoreBackend {
    StoreBackend::Mongodb
}

fn default_uri() -> String {
    "mongodb://localhost:27017/".to_string()
}

fn default_database() -> String {
    "projet".to_string()
}

fn default_collection() -> String {
    "produits".to_string()
}

fn default_query_timeout() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            uri: default_uri(),
            database: default_database(),
            collection: default_collection(),
            query_timeout_secs: default_query_timeout(),
            seed_path: None,
        }
    }
}
