//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the listen address.
const ENV_LISTEN_ADDR: &str = "TEAMDIR_LISTEN_ADDR";

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Path Slack posts slash commands and outgoing webhooks to.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Request timeout in seconds (applies to full request lifecycle).
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Enable health check endpoint.
    #[serde(default = "default_true")]
    pub health_enabled: bool,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_webhook_path() -> String {
    "/slack".to_string()
}

fn default_max_body_size() -> usize {
    64 * 1024 // 64KB, Slack payloads are a few hundred bytes
}

fn default_request_timeout() -> u64 {
    30
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            webhook_path: default_webhook_path(),
            max_body_size: default_max_body_size(),
            request_timeout: default_request_timeout(),
            health_enabled: true,
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var(ENV_LISTEN_ADDR) {
            config.listen_addr = addr;
        }

        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.webhook_path.starts_with('/') {
            anyhow::bail!("webhook_path must start with '/': {}", self.webhook_path);
        }
        if self.webhook_path == HEALTH_PATH {
            anyhow::bail!("webhook_path collides with {}", HEALTH_PATH);
        }
        if self.max_body_size == 0 {
            anyhow::bail!("max_body_size must be greater than zero");
        }
        Ok(())
    }

    /// Get request timeout as Duration.
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
