//! Configuration for the job board API

mod chart;
mod http;
mod logging;
mod store;

pub use chart::ChartConfig;
pub use http::{CorsConfig, HttpConfig};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use store::{StoreBackend, StoreConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP API server configuration
    #[serde(default)]
    pub http: HttpConfig,
    /// Document store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Chart rendering configuration
    #[serde(default)]
    pub chart: ChartConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize as TOML, used by `jobboard init`.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate all configuration fields.
    ///
    /// Every problem is collected and reported in one error.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // HTTP validation
        if self.http.listen_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "http listen_addr '{}' is not a valid socket address",
                self.http.listen_addr
            ));
        }
        if self.http.cors.enabled && self.http.cors.allowed_origins.is_empty() {
            errors.push("cors allowed_origins must not be empty when cors is enabled".to_string());
        }

        // Store validation
        match self.store.backend {
            StoreBackend::Mongodb => {
                if !self.store.uri.starts_with("mongodb://")
                    && !self.store.uri.starts_with("mongodb+srv://")
                {
                    errors.push(format!(
                        "store uri '{}' must start with mongodb:// or mongodb+srv://",
                        self.store.uri
                    ));
                }
                if self.store.database.is_empty() {
                    errors.push("store database must not be empty".to_string());
                }
                if self.store.collection.is_empty() {
                    errors.push("store collection must not be empty".to_string());
                }
            }
            StoreBackend::Memory => {}
        }
        if self.store.query_timeout_secs == 0 {
            errors.push("store query_timeout_secs must be positive".to_string());
        }

        // Chart validation
        if self.chart.width < 200 || self.chart.height < 100 {
            errors.push(format!(
                "chart size must be at least 200x100, got {}x{}",
                self.chart.width, self.chart.height
            ));
        }
        if self.chart.width > 8192 || self.chart.height > 8192 {
            errors.push("chart width and height must be <= 8192".to_string());
        }
        if self.chart.render_timeout_secs == 0 {
            errors.push("chart render_timeout_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> Config {
        Config::default()
    }

    // ========================================================================
    // Config::validate
    // ========================================================================

    #[test]
    fn default_config_passes_validation() {
        assert!(valid_config().validate().is_ok(), "default config should be valid");
    }

    #[test]
    fn validate_rejects_bad_listen_addr() {
        let mut cfg = valid_config();
        cfg.http.listen_addr = "localhost".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("is not a valid socket address"));
    }

    #[test]
    fn validate_rejects_empty_origins_when_cors_enabled() {
        let mut cfg = valid_config();
        cfg.http.cors.allowed_origins.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("cors allowed_origins must not be empty"));

        cfg.http.cors.enabled = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_mongodb_uri() {
        let mut cfg = valid_config();
        cfg.store.uri = "postgres://localhost".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("must start with mongodb://"));
    }

    #[test]
    fn validate_ignores_uri_for_memory_backend() {
        let mut cfg = valid_config();
        cfg.store.backend = StoreBackend::Memory;
        cfg.store.uri = String::new();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        let mut cfg = valid_config();
        cfg.store.query_timeout_secs = 0;
        cfg.chart.render_timeout_secs = 0;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("query_timeout_secs must be positive"));
        assert!(msg.contains("render_timeout_secs must be positive"));
    }

    #[test]
    fn validate_rejects_tiny_chart() {
        let mut cfg = valid_config();
        cfg.chart.width = 10;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("chart size must be at least 200x100"));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.store.database = String::new();
        cfg.store.collection = String::new();
        cfg.chart.height = 9000;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("store database must not be empty"));
        assert!(msg.contains("store collection must not be empty"));
        assert!(msg.contains("chart width and height must be <= 8192"));
    }

    // ========================================================================
    // Defaults and loading
    // ========================================================================

    #[test]
    fn default_values_match_original_deployment() {
        let cfg = valid_config();
        assert_eq!(cfg.store.backend, StoreBackend::Mongodb);
        assert_eq!(cfg.store.uri, "mongodb://localhost:27017/");
        assert_eq!(cfg.store.database, "projet");
        assert_eq!(cfg.store.collection, "produits");
        assert!(cfg.http.cors.enabled);
        assert!(cfg.http.cors.allows_any_origin());
        assert!(cfg.http.cors.allow_credentials);
        assert_eq!(cfg.chart.width, 1400);
        assert_eq!(cfg.chart.height, 600);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nbackend = \"memory\"\n\n[logging]\nlevel = \"debug\"").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.store.collection, "produits");
        assert_eq!(cfg.logging.level, LogLevel::Debug);
        assert_eq!(cfg.http.listen_addr, "127.0.0.1:8000");
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store\nbackend = 3").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(cfg.store.database, "projet");
    }

    #[test]
    fn toml_output_round_trips() {
        let text = valid_config().to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.http.listen_addr, "127.0.0.1:8000");
        assert_eq!(parsed.chart.max_categories, 30);
    }
}
