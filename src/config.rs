//! Configuration management for mock-pay.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::session::{StoreConfig, DEFAULT_SESSION_TTL, DEFAULT_SWEEP_INTERVAL};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Session lifetime configuration.
    pub session: SessionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable graceful shutdown.
    pub graceful_shutdown: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            graceful_shutdown: true,
        }
    }
}

/// Session lifetime section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Seconds a session stays live after creation.
    pub ttl_secs: u64,
    /// Seconds between background sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_SESSION_TTL.as_secs(),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or a full filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup (for testing).
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MOCK_PAY_HOST") {
            self.server.host = host;
        }

        // Hosting platforms commonly hand the port over as plain PORT.
        let port = lookup("MOCK_PAY_PORT").or_else(|| lookup("PORT"));
        if let Some(port) = port.and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(ttl) = lookup("MOCK_PAY_SESSION_TTL").and_then(|v| v.parse().ok()) {
            self.session.ttl_secs = ttl;
        }

        if let Some(secs) = lookup("MOCK_PAY_SWEEP_INTERVAL").and_then(|v| v.parse().ok()) {
            self.session.sweep_interval_secs = secs;
        }

        if let Some(level) = lookup("MOCK_PAY_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ttl) = args.session_ttl {
            self.session.ttl_secs = ttl;
        }

        if let Some(secs) = args.sweep_interval {
            self.session.sweep_interval_secs = secs;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Session store settings.
    pub fn to_store_config(&self) -> Result<StoreConfig, ConfigError> {
        if self.session.ttl_secs == 0 {
            return Err(ConfigError::InvalidValue("session.ttl_secs", "0".into()));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "session.sweep_interval_secs",
                "0".into(),
            ));
        }

        Ok(StoreConfig {
            ttl: Duration::from_secs(self.session.ttl_secs),
            sweep_interval: Duration::from_secs(self.session.sweep_interval_secs),
        })
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        let mut server_config = ServerConfig::new(host.to_string(), self.server.port)
            .with_store(self.to_store_config()?);

        if !self.server.graceful_shutdown {
            server_config = server_config.without_graceful_shutdown();
        }

        Ok(server_config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
    /// Invalid host address.
    #[error("invalid host address: {0}")]
    InvalidHost(String),
    /// Out-of-range setting.
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
