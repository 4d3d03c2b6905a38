//! Command-line interface
//!
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files + `POS_*` variables)
//! - Command execution and validation

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use crate::config::error::ConfigError;
use crate::config::{Environment as AppEnvironment, settings::Settings};
use crate::logger::init_logger;

/// Loads configuration, applies CLI overrides and validates the result.
///
/// Returns the settings together with the environment layer they came from.
///
/// # Errors
/// Returns ConfigError if loading, merging or validation fails
pub fn load_and_merge_config(cli: &Cli) -> Result<(Settings, AppEnvironment), ConfigError> {
    let merger = ConfigurationMerger::from_cli(cli)?;
    let settings = merger.merge_cli_args(cli)?;
    Ok((settings, merger.environment()))
}

/// Installs the global tracing subscriber described by `settings.logger`.
///
/// # Errors
/// Returns error if the logger configuration is invalid or a subscriber is
/// already installed
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings.logger.clone().into_logger_config()?;
    init_logger(logger_config)
}
