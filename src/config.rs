use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "railcheck.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where the service under test lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Per-request timeout for functional checks.
    pub request_timeout_ms: u64,
    /// Per-request timeout for the response-time probes.
    pub probe_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_ms: 10_000,
            probe_timeout_ms: 5_000,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Thresholds for the performance suite.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceConfig {
    pub response_time_limit_ms: u64,
    /// Total requests issued by the concurrency check.
    pub concurrent_requests: usize,
    /// Maximum requests in flight at once.
    pub concurrency: usize,
    pub large_dataset_platforms: usize,
    pub large_dataset_slots: usize,
    pub large_dataset_budget_ms: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            response_time_limit_ms: 2000,
            concurrent_requests: 20,
            concurrency: 5,
            large_dataset_platforms: 8,
            large_dataset_slots: 60,
            large_dataset_budget_ms: 1000,
        }
    }
}

impl PerformanceConfig {
    pub fn response_time_limit(&self) -> Duration {
        Duration::from_millis(self.response_time_limit_ms)
    }

    pub fn large_dataset_budget(&self) -> Duration {
        Duration::from_millis(self.large_dataset_budget_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("test_report.json"),
        }
    }
}

impl Config {
    /// Load the config at `path`, or `railcheck.toml` in `workdir` when no path is given.
    ///
    /// A missing default file yields defaults. An explicitly requested file must exist.
    pub fn load(workdir: &Path, path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (workdir.join(DEFAULT_CONFIG_FILE), false),
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }
}
