//! Configuration validation logic
//!
//! Each section validates itself and reports the first offending field by its
//! dotted path, e.g. `vika.datasheets.members.id`.

use crate::config::error::ConfigError;
use crate::config::settings::{
    CacheConfig, FileSettings, GovernorConfig, LoggerSettings, ServerConfig, Settings, VikaConfig,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const VALID_ROTATION_STRATEGIES: &[&str] = &["size", "time", "hourly", "daily", "never"];

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl VikaConfig {
    /// # Validation Rules
    /// - Base URL must be http(s)
    /// - Timeouts and page size must be greater than 0
    /// - Every datasheet needs an id and a resolvable token
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::validation(
                "vika.base_url",
                format!("Base URL '{}' must start with http:// or https://", self.base_url),
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "vika.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::validation(
                "vika.connect_timeout",
                "Connect timeout must be greater than 0 seconds.",
            ));
        }

        if self.page_size == 0 || self.page_size > 1000 {
            return Err(ConfigError::validation(
                "vika.page_size",
                "Page size must be between 1 and 1000.",
            ));
        }

        for (name, sheet) in self.datasheets.entries() {
            if sheet.id.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("vika.datasheets.{name}.id"),
                    "Datasheet id is required.".to_string(),
                ));
            }

            if self.token_for(sheet).trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("vika.datasheets.{name}.token"),
                    "No API token configured. Set vika.token or a per-datasheet token.".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl GovernorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_rate.is_finite() || self.max_rate <= 0.0 {
            return Err(ConfigError::validation(
                "governor.max_rate",
                format!("Max rate must be a positive number of calls per second, got {}", self.max_rate),
            ));
        }
        Ok(())
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.ttl_seconds == 0 {
            return Err(ConfigError::validation(
                "cache.ttl_seconds",
                "Cache TTL must be greater than 0 seconds when the cache is enabled.",
            ));
        }
        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        if !VALID_ROTATION_STRATEGIES.contains(&self.rotation.strategy.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.rotation.strategy",
                format!(
                    "Invalid rotation strategy '{}'. Valid strategies are: {}",
                    self.rotation.strategy,
                    VALID_ROTATION_STRATEGIES.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl Settings {
    /// Validates every section and returns the first error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.vika.validate()?;
        self.governor.validate()?;
        self.cache.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::valid_settings;

    fn field_of(settings: &Settings) -> String {
        settings
            .validate()
            .unwrap_err()
            .field()
            .map(str::to_string)
            .unwrap_or_default()
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_default_settings_need_vika_setup() {
        assert_eq!(field_of(&Settings::default()), "vika.datasheets.members.id");
    }

    #[test]
    fn test_server_port_zero() {
        let mut settings = valid_settings();
        settings.server.port = 0;
        assert_eq!(field_of(&settings), "server.port");
    }

    #[test]
    fn test_vika_base_url_scheme() {
        let mut settings = valid_settings();
        settings.vika.base_url = "ftp://api.vika.cn".to_string();
        assert_eq!(field_of(&settings), "vika.base_url");
    }

    #[test]
    fn test_vika_page_size_bounds() {
        let mut settings = valid_settings();
        settings.vika.page_size = 1001;
        assert_eq!(field_of(&settings), "vika.page_size");
    }

    #[test]
    fn test_missing_token_names_the_sheet() {
        let mut settings = valid_settings();
        settings.vika.token.clear();
        settings.vika.datasheets.members.token = Some("members-only".to_string());
        assert_eq!(field_of(&settings), "vika.datasheets.ledger.token");
    }

    #[test]
    fn test_missing_datasheet_id() {
        let mut settings = valid_settings();
        settings.vika.datasheets.inventory.id = "  ".to_string();
        assert_eq!(field_of(&settings), "vika.datasheets.inventory.id");
    }

    #[test]
    fn test_governor_rate_must_be_positive_and_finite() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut settings = valid_settings();
            settings.governor.max_rate = rate;
            assert_eq!(field_of(&settings), "governor.max_rate", "rate {rate}");
        }
    }

    #[test]
    fn test_cache_ttl_zero_only_matters_when_enabled() {
        let mut settings = valid_settings();
        settings.cache.ttl_seconds = 0;
        assert_eq!(field_of(&settings), "cache.ttl_seconds");

        settings.cache.enabled = false;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_logger_level_and_outputs() {
        let mut settings = valid_settings();
        settings.logger.level = "verbose".to_string();
        assert_eq!(field_of(&settings), "logger.level");

        let mut settings = valid_settings();
        settings.logger.console.enabled = false;
        assert_eq!(field_of(&settings), "logger");
    }

    #[test]
    fn test_file_logging_needs_path() {
        let mut settings = valid_settings();
        settings.logger.file.enabled = true;
        settings.logger.file.path = String::new();
        assert_eq!(field_of(&settings), "logger.file.path");
    }
}
