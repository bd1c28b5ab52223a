//! Configuration management.
//!
//! Settings come from (lowest to highest precedence) built-in defaults, an
//! optional TOML file, `GUTENDEX_DATASET_*` environment variables, and
//! finally command-line flags applied by the binary.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "https://gutendex.com"
//! timeout_secs = 120
//! connect_timeout_secs = 10
//!
//! [harvest]
//! delay_secs = 3
//! max_pages = 10
//!
//! [retry]
//! max_attempts = 3
//! initial_delay_ms = 2000
//! max_delay_secs = 60
//! ```
//!
//! Nested keys map to environment variables with a double underscore, e.g.
//! `GUTENDEX_DATASET_HARVEST__DELAY_SECS=5`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sources::GUTENDEX_API_BASE;
use crate::utils::RetryConfig;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "GUTENDEX_DATASET";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "gutendex-dataset.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Pipeline pacing and limits
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Retry policy for HTTP requests
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Upstream API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root; listing pages live under `<base_url>/books/`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Custom user agent (defaults to `gutendex-dataset/<version>`)
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Whole-request timeout; book bodies can be several megabytes
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_base_url() -> String {
    GUTENDEX_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Pipeline pacing and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Pause after each written record, in seconds
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,

    /// Stop after this many listing pages
    #[serde(default)]
    pub max_pages: Option<usize>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            max_pages: None,
        }
    }
}

impl HarvestConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

fn default_delay_secs() -> u64 {
    3
}

/// Retry policy for HTTP requests.
///
/// The default of a single attempt means transient failures are not retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RetrySettings {
    /// Build the runtime retry configuration
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_secs(self.max_delay_secs),
            ..RetryConfig::default()
        }
    }
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay_ms() -> u64 {
    2000
}

fn default_max_delay_secs() -> u64 {
    60
}

/// Load configuration from a file, with environment overrides on top
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?;

    settings.try_deserialize()
}

/// Load configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Find a configuration file in the usual places.
///
/// Checks `./gutendex-dataset.toml`, then
/// `<config dir>/gutendex-dataset/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("gutendex-dataset").join("config.toml"))
        .filter(|path| path.is_file())
}
