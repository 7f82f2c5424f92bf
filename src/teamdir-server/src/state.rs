//! Application state management.

use std::sync::Arc;
use std::time::{Duration, Instant};

use teamdir_slack::{DirectoryProvider, DirectorySearch, RuntimeConfig};

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

/// Application state shared across request handlers.
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Search pipeline with the baseline runtime configuration.
    pub search: DirectorySearch,
    /// Start time.
    start_time: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("search", &self.search)
            .field("start_time", &self.start_time)
            .finish()
    }
}

impl AppState {
    /// Create state backed by the Slack Web API.
    pub fn new(config: ServerConfig, runtime: RuntimeConfig) -> AppResult<Self> {
        runtime
            .validate()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let search =
            DirectorySearch::from_config(runtime).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self::with_search(config, search))
    }

    /// Create state over an explicit directory provider.
    pub fn with_provider(
        config: ServerConfig,
        runtime: RuntimeConfig,
        provider: Arc<dyn DirectoryProvider>,
    ) -> Self {
        Self::with_search(config, DirectorySearch::new(runtime, provider))
    }

    fn with_search(config: ServerConfig, search: DirectorySearch) -> Self {
        Self {
            config,
            search,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Version reported by the health endpoint.
    pub fn version(&self) -> &str {
        let version = self.search.config().version();
        if version.is_empty() {
            env!("CARGO_PKG_VERSION")
        } else {
            version
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_secret() {
        let result = AppState::new(ServerConfig::default(), RuntimeConfig::new(""));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_version_falls_back_to_crate_version() {
        let state = AppState::new(ServerConfig::default(), RuntimeConfig::new("secret")).unwrap();
        assert_eq!(state.version(), env!("CARGO_PKG_VERSION"));

        let state = AppState::new(
            ServerConfig::default(),
            RuntimeConfig::new("secret").with_build_info("2024.1", "/srv"),
        )
        .unwrap();
        assert_eq!(state.version(), "2024.1");
    }
}
