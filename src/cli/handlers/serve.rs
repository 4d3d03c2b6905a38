//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use crate::config::{Environment, settings::Settings};
use crate::error::AppResult;
use crate::server::Server;

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    /// Execute the serve command with optional dry-run support
    ///
    /// # Arguments
    /// * `dry_run` - If true, validates configuration and exits without starting server
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Server startup errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.config, self.environment).run().await?;
        Ok(())
    }

    /// Validate configuration without starting the server
    ///
    /// The application state is built as well, so client construction
    /// problems surface here. No request reaches the spreadsheet service.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        Server::build_state(&self.config)?;

        println!("✓ Configuration is valid ({})", self.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!("✓ Spreadsheet service: {}", self.config.vika.base_url);
        for (name, sheet) in self.config.vika.datasheets.entries() {
            match sheet.view_id.as_deref() {
                Some(view) => println!("✓ Datasheet {name}: {} (view {view})", sheet.id),
                None => println!("✓ Datasheet {name}: {}", sheet.id),
            }
        }
        println!(
            "✓ Outbound rate: {} calls/s, cache TTL {}s",
            self.config.governor.max_rate, self.config.cache.ttl_seconds
        );

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::tests::valid_settings;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_serve_handler_new() {
        let config = valid_settings();
        let handler = ServeCommandHandler::new(config.clone(), Environment::Test);
        assert_eq!(handler.config(), &config);
    }

    #[tokio::test]
    async fn test_serve_handler_dry_run() {
        let handler = ServeCommandHandler::new(valid_settings(), Environment::Test);

        assert!(handler.execute(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_serve_handler_dry_run_invalid_config() {
        let mut config = valid_settings();
        config.server.port = 0;
        let handler = ServeCommandHandler::new(config, Environment::Test);

        let err = handler.execute(true).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration { ref key, .. } if key == "server.port"));
    }
}
