//! Configuration loading and config file resolution
//!
//! Settings come from a small TOML file. A missing file is never fatal: the
//! client logs a warning and runs on compiled defaults.
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `CHESSEYE_CONFIG` environment variable
//! 3. `<config dir>/chesseye/config.toml`
//! 4. Compiled defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default board recognition API
pub const DEFAULT_API_BASE_URL: &str = "https://board2fen-api-2-3w4qy.sevalla.app";

/// Default external board editor
pub const DEFAULT_EDITOR_BASE_URL: &str = "https://lichess.org/editor";

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "CHESSEYE_CONFIG";

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV_VAR: &str = "CHESSEYE_API_BASE_URL";

/// Client configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Base URL of the board recognition API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Base URL of the external board editor
    #[serde(default = "default_editor_base_url")]
    pub editor_base_url: String,

    /// Confidence below which a prediction is flagged as low confidence
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f64,

    /// Fewest pieces a prediction needs to count as a real detection
    #[serde(default = "default_min_piece_count")]
    pub min_piece_count: usize,

    /// How long the submission success message shows before the editor
    /// button replaces it
    #[serde(default = "default_success_message_duration_ms")]
    pub success_message_duration_ms: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_editor_base_url() -> String {
    DEFAULT_EDITOR_BASE_URL.to_string()
}

fn default_low_confidence_threshold() -> f64 {
    0.3
}

fn default_min_piece_count() -> usize {
    2
}

fn default_success_message_duration_ms() -> u64 {
    1500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            editor_base_url: default_editor_base_url(),
            low_confidence_threshold: default_low_confidence_threshold(),
            min_piece_count: default_min_piece_count(),
            success_message_duration_ms: default_success_message_duration_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check URLs and numeric ranges
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("api_base_url", &self.api_base_url),
            ("editor_base_url", &self.editor_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::Config(format!("{} '{}' is not a valid URL: {}", name, value, e)))?;
        }

        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(Error::Config(format!(
                "low_confidence_threshold must be within 0.0-1.0, got {}",
                self.low_confidence_threshold
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Replace `api_base_url`, validating the new value
    pub fn with_api_base_url(mut self, api_base_url: &str) -> Result<Self> {
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self.validate()?;
        Ok(self)
    }

    /// API base URL without a trailing slash
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn success_message_duration(&self) -> Duration {
        Duration::from_millis(self.success_message_duration_ms)
    }

    /// Write config atomically (temp file + rename)
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = path.with_extension("toml.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)?;

        info!("Wrote configuration to {}", path.display());
        Ok(())
    }
}

/// Resolves which config file to load
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Config file path by priority, `None` when no candidate exists
    ///
    /// Explicit paths (CLI, environment) are returned even if missing so the
    /// caller can report them.
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        default_config_path().filter(|path| path.exists())
    }

    /// Load configuration, falling back to defaults when no file exists
    ///
    /// A file that exists but fails to parse or validate is an error.
    pub fn load(&self) -> Result<TomlConfig> {
        let Some(path) = self.config_path() else {
            info!("No config file found, using compiled defaults");
            return Ok(TomlConfig::default());
        };

        if !path.exists() {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            return Ok(TomlConfig::default());
        }

        let config = TomlConfig::load(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration and apply the API URL override
    ///
    /// `api_url` (typically from the command line) wins over the
    /// `CHESSEYE_API_BASE_URL` environment variable, which wins over the file.
    pub fn resolve(&self, api_url: Option<&str>) -> Result<TomlConfig> {
        let config = self.load()?;

        let env_url = std::env::var(API_URL_ENV_VAR).ok().filter(|url| !url.is_empty());
        match api_url.or(env_url.as_deref()) {
            Some(url) => config.with_api_base_url(url),
            None => Ok(config),
        }
    }
}

/// Per-user config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chesseye").join("config.toml"))
}
