//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Back-office API for a retail shop kept in Vika datasheets
#[derive(Parser, Debug)]
#[command(name = "pos-rs")]
#[command(about = "Back-office API for a retail shop kept in Vika datasheets")]
#[command(long_about = "
pos-rs serves the member, ledger, product, inventory and profile API of a
small retail shop whose records live in Vika datasheets. Every outbound call
goes through a rate-limited queue and reads are cached briefly.

EXAMPLES:
    # Start the server with default configuration
    pos-rs serve

    # Start server on custom host and port
    pos-rs serve --host 0.0.0.0 --port 8080

    # Use custom configuration file
    pos-rs --config /path/to/config.toml serve

    # Run in development mode with verbose logging
    pos-rs --env development --verbose serve

    # Check configuration without starting server
    pos-rs serve --dry-run

The API token is best supplied through POS_VIKA__TOKEN.
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Use a single TOML file instead of the layered `config/` directory.
    /// `POS_*` environment variables still apply on top of it.
    ///
    /// Example: --config /etc/pos-rs/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is loaded, in place of
    /// `POS_APP_ENV`.
    ///
    /// Available values: development (dev), test, staging, production (prod)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Raises the log level to debug. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Lowers the log level to error. Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    ///
    /// Examples:
    ///   pos-rs serve                           # Start with defaults
    ///   pos-rs serve --host 0.0.0.0 --port 80 # Bind to all interfaces on port 80
    ///   pos-rs serve --dry-run                 # Validate config without starting
    Serve {
        /// Host address to bind to
        ///
        /// Use 127.0.0.1 for localhost only, or 0.0.0.0 to accept connections
        /// from any interface.
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on (1-65535)
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        ///
        /// Takes precedence over the configuration file and --verbose/--quiet.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        ///
        /// Loads and validates the full configuration, prints a summary and
        /// exits without binding a port or calling the spreadsheet service.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Checks argument combinations clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }

    /// Whether the chosen command only validates configuration.
    pub fn is_dry_run(&self) -> bool {
        matches!(self.command, Some(Commands::Serve { dry_run: true, .. }))
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["pos-rs", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["pos-rs", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = Cli::try_parse_from(["pos-rs"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.env.is_none());
        assert!(!cli.is_dry_run());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from(["pos-rs", "serve", "--host", "0.0.0.0", "--port", "8080"])
            .unwrap();
        let Some(Commands::Serve {
            host,
            port,
            log_level,
            dry_run,
        }) = cli.command
        else {
            panic!("Expected Serve command");
        };
        assert_eq!(host, Some("0.0.0.0".to_string()));
        assert_eq!(port, Some(8080));
        assert!(log_level.is_none());
        assert!(!dry_run);
    }

    #[test]
    fn test_dry_run_flag() {
        let cli = Cli::try_parse_from(["pos-rs", "serve", "--dry-run"]).unwrap();
        assert!(cli.is_dry_run());
    }

    #[test]
    fn test_env_aliases() {
        let cli = Cli::try_parse_from(["pos-rs", "--env", "prod"]).unwrap();
        assert!(matches!(cli.env, Some(Environment::Production)));

        let cli = Cli::try_parse_from(["pos-rs", "-e", "staging"]).unwrap();
        assert!(matches!(cli.env, Some(Environment::Staging)));
    }

    #[test]
    fn test_port_zero_rejected() {
        let err = Cli::try_parse_from(["pos-rs", "serve", "--port", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["pos-rs", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
