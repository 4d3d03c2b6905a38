//! Configuration merger for CLI arguments and config files
//!
//! CLI arguments override file and environment configuration. The merged
//! settings are validated once, after every override is applied.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, settings::Settings};

/// Applies CLI overrides on top of loaded configuration.
pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Loads the base configuration the way the CLI asks for it.
    ///
    /// `--config` selects a single file, otherwise the layered loader reads
    /// `POS_CONFIG_DIR` / `POS_CONFIG_FILE`. `--env` replaces `POS_APP_ENV`.
    ///
    /// # Errors
    /// Returns ConfigError if the files cannot be read or deserialized
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match cli.config.as_deref() {
            Some(path) => Self::file_loader(path)?,
            None => ConfigLoader::new()?,
        };
        let loader = match cli.env {
            Some(env) => loader.environment_override(env.into()),
            None => loader,
        };

        let environment = loader.environment();
        Ok(Self::new(loader.load_unvalidated()?, environment))
    }

    fn file_loader(path: &Path) -> Result<ConfigLoader, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::validation(
                "config_file",
                format!("Configuration path is not a file: '{}'", path.display()),
            ));
        }
        Ok(ConfigLoader::with_file(path))
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// Precedence, highest first: `serve --log-level`, `--verbose`/`--quiet`,
    /// then configuration files and environment variables.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        apply_global_overrides(&mut config, cli);
        if let Some(ref command) = cli.command {
            apply_command_overrides(&mut config, command);
        }

        config.validate()?;

        Ok(config)
    }

    /// Get the current configuration (useful for inspection)
    pub fn config(&self) -> &Settings {
        &self.base_config
    }

    /// Environment layer the configuration was loaded for.
    pub fn environment(&self) -> Environment {
        self.environment
    }
}

fn apply_global_overrides(config: &mut Settings, cli: &Cli) {
    if cli.verbose {
        config.logger.level = "debug".to_string();
    } else if cli.quiet {
        config.logger.level = "error".to_string();
    }
}

fn apply_command_overrides(config: &mut Settings, command: &Commands) {
    match command {
        Commands::Serve {
            host,
            port,
            log_level,
            dry_run: _,
        } => {
            if let Some(host_addr) = host {
                config.server.host = host_addr.clone();
            }

            if let Some(port_num) = port {
                config.server.port = *port_num;
            }

            if let Some(level) = log_level {
                config.logger.level = (*level).into();
            }
        }
    }
}
