use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slack_mcp_core::FetchOptions;
use slack_mcp_sdk::config::DEFAULT_BASE_URL;
use slack_mcp_sdk::RetryConfig;
use std::path::Path;
use std::time::Duration;

/// Optional file-based tuning. Credentials never live here; they come from
/// the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub server: RuntimeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_exclude_archived")]
    pub exclude_archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_bootstrap_wait_secs")]
    pub bootstrap_wait_secs: u64,

    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    1000
}

fn default_exclude_archived() -> bool {
    true
}

fn default_bootstrap_wait_secs() -> u64 {
    30
}

fn default_tool_timeout_secs() -> u64 {
    120
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            exclude_archived: default_exclude_archived(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bootstrap_wait_secs: default_bootstrap_wait_secs(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if !config_path.exists() {
            tracing::info!(
                path = %config_path.display(),
                "Configuration file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read configuration file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse configuration file")?;

        if config.fetch.page_size == 0 || config.fetch.max_pages == 0 {
            anyhow::bail!("fetch.page_size and fetch.max_pages must be greater than zero");
        }

        Ok(config)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            page_size: self.fetch.page_size,
            max_pages: self.fetch.max_pages,
            exclude_archived: self.fetch.exclude_archived,
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.slack.max_retries,
            ..RetryConfig::default()
        }
    }

    pub fn slack_timeout(&self) -> Duration {
        Duration::from_secs(self.slack.timeout_secs)
    }

    pub fn bootstrap_wait(&self) -> Duration {
        Duration::from_secs(self.server.bootstrap_wait_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.server.tool_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.fetch_options(), FetchOptions::default());
        assert_eq!(config.bootstrap_wait(), Duration::from_secs(30));
        assert_eq!(config.tool_timeout(), Duration::from_secs(120));
        assert_eq!(config.slack.base_url, "https://slack.com/api/");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[fetch]\nmax_pages = 10\n\n[slack]\nmax_retries = 0\n\n[server]\ntool_timeout_secs = 5"
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.fetch.max_pages, 10);
        assert_eq!(config.fetch.page_size, 100);
        assert!(config.fetch.exclude_archived);
        assert_eq!(config.retry_config().max_retries, 0);
        assert_eq!(config.tool_timeout(), Duration::from_secs(5));
        assert_eq!(config.bootstrap_wait(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\npage_size = \"lots\"").unwrap();
        assert!(ServerConfig::load(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\nmax_pages = 0").unwrap();
        assert!(ServerConfig::load(file.path()).is_err());
    }
}
