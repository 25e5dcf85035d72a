//! Configuration management for wingman-mentions
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Environment variable overriding `api.base_url`.
pub const ENV_API_URL: &str = "WINGMAN_API_URL";

/// Environment variable overriding `api.token`.
pub const ENV_API_TOKEN: &str = "WINGMAN_API_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Mention autocomplete behaviour
    #[serde(default)]
    pub mentions: MentionConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Wingman API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the network search endpoint, relative to `base_url`
    #[serde(default = "default_search_path")]
    pub search_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Mention autocomplete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionConfig {
    /// Quiet period before a search reaches the network, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Number of candidates requested per search
    #[serde(default = "default_mention_page_size")]
    pub page_size: u32,

    /// Drop responses that arrive after a newer search was issued
    #[serde(default = "default_discard_stale")]
    pub discard_stale_responses: bool,
}

/// Display and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,

    /// Highlight mentions in the compose prompt
    #[serde(default = "default_highlight_mentions")]
    pub highlight_mentions: bool,

    /// Pretty-print JSON output
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
}

/// Compose history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,

    /// Path to history file
    #[serde(default = "default_history_file")]
    pub file_path: PathBuf,

    /// Enable history persistence
    #[serde(default = "default_persist_history")]
    pub persist: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_search_path() -> String {
    "/network/search".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_mention_page_size() -> u32 {
    10
}

fn default_discard_stale() -> bool {
    true
}

fn default_color_output() -> bool {
    true
}

fn default_highlight_mentions() -> bool {
    true
}

fn default_pretty_json() -> bool {
    true
}

fn default_max_history_size() -> usize {
    500
}

fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wingman_history")
}

fn default_persist_history() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
            timeout: default_timeout(),
            token: None,
        }
    }
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            page_size: default_mention_page_size(),
            discard_stale_responses: default_discard_stale(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: default_color_output(),
            highlight_mentions: default_highlight_mentions(),
            pretty_json: default_pretty_json(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
            file_path: default_history_file(),
            persist: default_persist_history(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults when the
    /// default file does not exist.
    ///
    /// An explicitly requested file that does not exist is an error.
    ///
    /// # Arguments
    /// * `path` - Optional path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Apply `WINGMAN_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using a custom lookup
    fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api.token = Some(token);
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wingman")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("api.base_url".to_string()).into());
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                value: self.api.base_url.clone(),
            }
            .into());
        }
        if self.api.timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.mentions.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "mentions.page_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Render the effective configuration as commented TOML
    pub fn to_toml_with_comments(&self) -> Result<String> {
        // Never echo the token back to the terminal.
        let mut redacted = self.clone();
        if redacted.api.token.is_some() {
            redacted.api.token = Some("***".to_string());
        }

        let body = toml::to_string_pretty(&redacted)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        let mut out = String::from("# wingman-mentions configuration\n");
        out.push_str(&format!(
            "# Environment overrides: {ENV_API_URL}, {ENV_API_TOKEN}\n\n"
        ));
        out.push_str(&body);
        Ok(out)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout)
    }
}

impl MentionConfig {
    /// Debounce window as Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
