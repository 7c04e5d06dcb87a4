use std::path::PathBuf;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

use crate::error::DashboardError;

/// Prefix shared by every environment variable the dashboard reads.
pub const ENV_PREFIX: &str = "GEO_DASHBOARD_";

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Fixture file with the project records. The bundled fixture is used when unset.
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,

    /// Rows added to the table per "load more"
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Simulated latency of the project fetch
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,

    /// Simulated latency of the session lookup
    #[serde(default = "default_auth_delay_ms")]
    pub auth_delay_ms: u64,

    /// Whether the session lookup returns the demo user or nobody
    #[serde(default = "default_auto_sign_in")]
    pub auto_sign_in: bool,

    #[serde(default = "default_demo_user")]
    pub demo_user: String,

    /// Input poll timeout; also the frame step of the map transition
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    /// Tracing output goes here. Logging is off when unset, the terminal belongs to the UI.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_page_size() -> usize {
    50
}

fn default_load_delay_ms() -> u64 {
    500
}

fn default_auth_delay_ms() -> u64 {
    300
}

fn default_auto_sign_in() -> bool {
    true
}

fn default_demo_user() -> String {
    "Demo User".to_string()
}

fn default_tick_rate_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fixture_path: None,
            page_size: default_page_size(),
            load_delay_ms: default_load_delay_ms(),
            auth_delay_ms: default_auth_delay_ms(),
            auto_sign_in: default_auto_sign_in(),
            demo_user: default_demo_user(),
            tick_rate_ms: default_tick_rate_ms(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize `GEO_DASHBOARD_*` variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;
        config.validate()?;

        Ok(config)
    }

    /// Build a configuration from explicit key/value pairs (keys carry the prefix).
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(pairs)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), DashboardError> {
        if self.page_size == 0 {
            return Err(DashboardError::InvalidConfig(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.tick_rate_ms == 0 {
            return Err(DashboardError::InvalidConfig(
                "tick_rate_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> (String, String) {
        (format!("{}{}", ENV_PREFIX, key), value.to_string())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = Config::from_pairs(Vec::new()).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.load_delay_ms, 500);
        assert_eq!(config.auth_delay_ms, 300);
        assert!(config.auto_sign_in);
        assert_eq!(config.demo_user, "Demo User");
        assert!(config.fixture_path.is_none());
        assert!(config.log_file.is_none());
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let config = Config::from_pairs(vec![
            pair("PAGE_SIZE", "10"),
            pair("AUTO_SIGN_IN", "false"),
            pair("FIXTURE_PATH", "/tmp/projects.json"),
            ("UNRELATED".to_string(), "ignored".to_string()),
        ])
        .unwrap();
        assert_eq!(config.page_size, 10);
        assert!(!config.auto_sign_in);
        assert_eq!(config.fixture_path, Some(PathBuf::from("/tmp/projects.json")));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(Config::from_pairs(vec![pair("PAGE_SIZE", "0")]).is_err());
    }
}
