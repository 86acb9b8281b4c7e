//! Console configuration: backend base URLs, timeouts and the state directory.
//!
//! Every field has a default so a partial (or absent) config file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::ServiceKey;

/// Directory name used under `$HOME` for persisted console state
pub const DEFAULT_STATE_DIR_NAME: &str = ".ticketing-console";

/// Console configuration loaded from a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL per backend service. May carry a path prefix.
    pub services: BTreeMap<ServiceKey, String>,
    /// Global per-request timeout, 0 disables it
    pub request_timeout_secs: u64,
    /// Order-view polling interval
    pub poll_interval_secs: u64,
    /// Where session, drafts and history are persisted
    pub state_dir: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            services: default_services(),
            request_timeout_secs: 10,
            poll_interval_secs: 3,
            state_dir: None,
        }
    }
}

/// Ports of the local development stack
fn default_services() -> BTreeMap<ServiceKey, String> {
    [
        (ServiceKey::Gateway, "http://127.0.0.1:8080"),
        (ServiceKey::Order, "http://127.0.0.1:8081"),
        (ServiceKey::Inventory, "http://127.0.0.1:8082"),
        (ServiceKey::Query, "http://127.0.0.1:8083"),
        (ServiceKey::Worker, "http://127.0.0.1:8084"),
        (ServiceKey::Nginx, "http://127.0.0.1:8088"),
    ]
    .into_iter()
    .map(|(key, url)| (key, url.to_string()))
    .collect()
}

impl ConsoleConfig {
    /// Load configuration from a JSON file
    ///
    /// Services missing from the file keep their default base URL.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let mut config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        for (key, url) in default_services() {
            config.services.entry(key).or_insert(url);
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (service, url) in &self.services {
            let url = url.trim();
            if url.is_empty() {
                anyhow::bail!("Base URL for service '{}' must be specified", service);
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!(
                    "Base URL for service '{}' must start with http:// or https://",
                    service
                );
            }
        }

        if self.poll_interval_secs == 0 {
            anyhow::bail!("Poll interval must be at least one second");
        }

        Ok(())
    }

    /// Base URL for a service, without a trailing slash
    pub fn base_url(&self, service: ServiceKey) -> Option<&str> {
        self.services
            .get(&service)
            .map(|url| url.trim().trim_end_matches('/'))
    }

    /// Request timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Resolve the state directory: explicit setting, then `$HOME`, then cwd
    pub fn resolved_state_dir(&self) -> PathBuf {
        if let Some(dir) = &self.state_dir {
            return dir.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) if !home.is_empty() => PathBuf::from(home).join(DEFAULT_STATE_DIR_NAME),
            _ => PathBuf::from(DEFAULT_STATE_DIR_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.services.len(), 6);
        assert_eq!(config.base_url(ServiceKey::Order), Some("http://127.0.0.1:8081"));
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let mut config = ConsoleConfig::default();
        config
            .services
            .insert(ServiceKey::Query, "http://proxy/api/query/".to_string());
        assert_eq!(config.base_url(ServiceKey::Query), Some("http://proxy/api/query"));
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = ConsoleConfig::default();
        config
            .services
            .insert(ServiceKey::Worker, "ftp://127.0.0.1".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("worker"));
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let config = ConsoleConfig {
            poll_interval_secs: 0,
            ..ConsoleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = ConsoleConfig {
            request_timeout_secs: 0,
            ..ConsoleConfig::default()
        };
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.json");
        fs::write(
            &path,
            r#"{"services":{"order":"https://orders.example"},"poll_interval_secs":5}"#,
        )
        .unwrap();

        let config = ConsoleConfig::load_from_file(&path).unwrap();
        assert_eq!(config.base_url(ServiceKey::Order), Some("https://orders.example"));
        assert_eq!(config.base_url(ServiceKey::Gateway), Some("http://127.0.0.1:8080"));
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_written_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.json");
        let config = ConsoleConfig {
            state_dir: Some(dir.path().join("state")),
            ..ConsoleConfig::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = ConsoleConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.resolved_state_dir(), dir.path().join("state"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = ConsoleConfig::load_from_file("/nonexistent/console.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration"));
    }
}
