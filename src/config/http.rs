//! HTTP API server configuration

use serde::{Deserialize, Serialize};

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Listen address for HTTP server (e.g., "0.0.0.0:8000")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin resource sharing policy.
///
/// The default is wide open: any origin, method and header, with credentials.
/// Browsers reject a literal `*` alongside credentials, so a `"*"` origin is
/// served by echoing the caller's origin back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Attach the CORS layer at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Allowed origins; `"*"` allows any
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
    /// Send `Access-Control-Allow-Credentials: true`
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
}

fn default_true() -> bool {
    true
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: default_origins(),
            allow_credentials: true,
        }
    }
}
