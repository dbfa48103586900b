//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: TYPED_HANDLER_, nested keys split on `__`)
//! 2. Current working directory: ./typed-handler.toml
//! 3. Default values
//!
//! ```toml
//! service_name = "users-api"
//! log_level = "debug"
//! body_limit_bytes = 1048576
//!
//! [errors]
//! format = "text"
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::Result;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "typed-handler.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TYPED_HANDLER_";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Service name, used in logs
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Tracing filter directive (e.g. "info", "typed_handler=trace")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Port the demo service listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body size
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,

    /// Error response format
    #[serde(default)]
    pub errors: ErrorConfig,
}

/// Error writer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorConfig {
    #[serde(default)]
    pub format: ErrorFormat,

    /// JSON key holding the message (json format only)
    #[serde(default = "default_error_field")]
    pub field: String,
}

/// How error responses are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFormat {
    /// `text/plain` body with the error message
    Text,
    /// `{"<field>": "<message>"}`
    #[default]
    Json,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            format: ErrorFormat::default(),
            field: default_error_field(),
        }
    }
}

fn default_service_name() -> String {
    "typed-handler".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Request body limit used when none is configured
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

fn default_body_limit_bytes() -> usize {
    DEFAULT_BODY_LIMIT_BYTES
}

fn default_error_field() -> String {
    "error".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Reads ./typed-handler.toml when present; environment variables
    /// (TYPED_HANDLER_ prefix) override file values.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        tracing::debug!("Searching for config file: {}", path.display());

        let mut figment = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()));

        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // Environment variables have highest priority
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Useful for testing or non-standard deployments. A missing file leaves
    /// the defaults in place.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Load from config file (if exists)
            .merge(Toml::file(path.as_ref()))
            // Override with environment variables
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Layer rejecting request bodies over `body_limit_bytes`
    pub fn body_limit_layer(&self) -> RequestBodyLimitLayer {
        RequestBodyLimitLayer::new(self.body_limit_bytes)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            port: default_port(),
            body_limit_bytes: default_body_limit_bytes(),
            errors: ErrorConfig::default(),
        }
    }
}
