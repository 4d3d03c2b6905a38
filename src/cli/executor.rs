//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::ServeCommandHandler;
use super::parser::{Cli, Commands};
use crate::config::{Environment, settings::Settings};
use crate::error::{AppError, AppResult};

/// Execute a CLI command with the given settings
///
/// No subcommand means `serve` with configured defaults.
///
/// # Errors
/// Returns errors from command handlers or argument validation
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> AppResult<()> {
    validate_command_args(cli)?;

    let dry_run = match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => *dry_run,
        None => false,
    };

    ServeCommandHandler::new(settings, environment)
        .execute(dry_run)
        .await
}

fn validate_command_args(cli: &Cli) -> AppResult<()> {
    cli.validate().map_err(|msg| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason: msg,
    })?;

    if let Some(Commands::Serve {
        host: Some(host),
        port: Some(port),
        ..
    }) = &cli.command
        && *port < 1024
        && host == "0.0.0.0"
    {
        tracing::warn!(port, "Binding to 0.0.0.0 on a privileged port requires elevated privileges");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parser::Cli;
    use crate::config::settings::tests::valid_settings;
    use clap::Parser;

    #[tokio::test]
    async fn test_execute_serve_dry_run() {
        let cli = Cli::try_parse_from(["pos-rs", "serve", "--dry-run"]).unwrap();

        let result = execute_command(&cli, valid_settings(), Environment::Test).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_command_args() {
        let cli = Cli::try_parse_from(["pos-rs", "serve", "--port", "8080"]).unwrap();
        assert!(validate_command_args(&cli).is_ok());
    }

    #[test]
    fn test_validate_conflicting_args() {
        let cli = Cli {
            command: None,
            config: None,
            env: None,
            verbose: true,
            quiet: true,
        };

        let err = validate_command_args(&cli).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
