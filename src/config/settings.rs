//! Configuration settings structures for pos-rs
//!
//! Everything here can be loaded from TOML files and `POS_*` environment
//! variables. Sections that are absent fall back to their `Default` impls.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{
    ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig, RotationStrategy, TimeUnit,
};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "pos-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_request_timeout() -> u64 {
    30
}

fn default_keep_alive_timeout() -> u64 {
    75
}

fn default_vika_base_url() -> String {
    "https://api.vika.cn/fusion/v1".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_page_size() -> u32 {
    1000
}

fn default_max_rate() -> f64 {
    1.5
}

fn default_cache_ttl() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/pos-rs.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation_strategy() -> String {
    "size".to_string()
}

fn default_max_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_files() -> usize {
    5
}

// ============================================================================
// Application / Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive_timeout")]
    pub keep_alive_timeout: u64,
}

impl ServerConfig {
    /// Full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            keep_alive_timeout: default_keep_alive_timeout(),
        }
    }
}

// ============================================================================
// Vika datasheet service
// ============================================================================

/// One datasheet on the spreadsheet service.
///
/// `token` overrides [`VikaConfig::token`] for sheets living in another space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasheetConfig {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasheetsConfig {
    #[serde(default)]
    pub members: DatasheetConfig,

    /// Recharge and consumption records
    #[serde(default)]
    pub ledger: DatasheetConfig,

    #[serde(default)]
    pub products: DatasheetConfig,

    /// Stock-take records
    #[serde(default)]
    pub inventory: DatasheetConfig,

    /// Single admin profile row
    #[serde(default)]
    pub profile: DatasheetConfig,
}

impl DatasheetsConfig {
    /// Every sheet paired with its config key, in a stable order.
    pub fn entries(&self) -> [(&'static str, &DatasheetConfig); 5] {
        [
            ("members", &self.members),
            ("ledger", &self.ledger),
            ("products", &self.products),
            ("inventory", &self.inventory),
            ("profile", &self.profile),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VikaConfig {
    #[serde(default = "default_vika_base_url")]
    pub base_url: String,

    /// Default API token for every datasheet without its own
    #[serde(default)]
    pub token: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Page size used when walking every page of a sheet
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub datasheets: DatasheetsConfig,
}

impl VikaConfig {
    /// Token to use for `sheet`, preferring the sheet-level override.
    pub fn token_for<'a>(&'a self, sheet: &'a DatasheetConfig) -> &'a str {
        sheet
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.token)
    }
}

impl Default for VikaConfig {
    fn default() -> Self {
        Self {
            base_url: default_vika_base_url(),
            token: String::new(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            page_size: default_page_size(),
            datasheets: DatasheetsConfig::default(),
        }
    }
}

// ============================================================================
// Call governor / cache
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Maximum sustained outbound calls per second
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            max_rate: default_max_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lifetime of a cached read in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: default_cache_ttl(),
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    /// "size", "hourly", "daily" or "never"
    #[serde(default = "default_rotation_strategy")]
    pub strategy: String,

    /// Maximum file size in bytes before rotation
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Rotated files kept next to the active one
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            strategy: default_rotation_strategy(),
            max_size: default_max_size(),
            max_files: default_max_files(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub append: bool,

    /// "full", "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub rotation: RotationSettings,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: true,
            format: default_log_format(),
            rotation: RotationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Turns the file representation into the runtime [`LoggerConfig`].
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger", e.to_string()))
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.file.format", e.to_string()))?;
        let rotation = self.rotation.into_rotation_config()?;

        Ok(FileConfig {
            enabled: self.enabled,
            path: PathBuf::from(self.path),
            append: self.append,
            format,
            rotation,
        })
    }
}

impl RotationSettings {
    pub fn into_rotation_config(self) -> Result<RotationConfig, ConfigError> {
        let strategy = match self.strategy.to_ascii_lowercase().as_str() {
            "size" => RotationStrategy::Size,
            "hourly" => RotationStrategy::Time(TimeUnit::Hourly),
            "daily" | "time" => RotationStrategy::Time(TimeUnit::Daily),
            "never" => RotationStrategy::Never,
            other => {
                return Err(ConfigError::validation(
                    "logger.file.rotation.strategy",
                    format!(
                        "Invalid rotation strategy '{other}'. Valid strategies are: size, hourly, daily, never"
                    ),
                ));
            }
        };

        RotationConfig::new(strategy, self.max_size, self.max_files)
            .map_err(|e| ConfigError::validation("logger.file.rotation", e.to_string()))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub vika: VikaConfig,

    #[serde(default)]
    pub governor: GovernorConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logger: LoggerSettings,
}
