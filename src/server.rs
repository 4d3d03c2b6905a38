//! Server module for managing HTTP server lifecycle
//!
//! This module wires the spreadsheet client, call governor, cache and
//! services together, then serves the router until a shutdown signal.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::cache::CacheManager;
use crate::config::{Environment, settings::Settings};
use crate::external::build_http_client;
use crate::external::vika::{DatasheetTransport, VikaClient};
use crate::governor::CallGovernor;
use crate::repositories::gateway::SheetGateway;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
    environment: Environment,
}

impl Server {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    /// Builds the application state from settings.
    ///
    /// Nothing here touches the network; the first outbound call happens on
    /// the first request.
    pub fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
        let http = build_http_client(&settings.vika)
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
        let transport: Arc<dyn DatasheetTransport> =
            Arc::new(VikaClient::new(http, settings.vika.clone()));

        let gateway = SheetGateway::new(
            transport,
            CallGovernor::from_config(&settings.governor),
            CacheManager::new(&settings.cache),
            settings.vika.page_size,
        );

        Ok(AppState::new(gateway, &settings.vika.datasheets))
    }

    /// Start the server and run until shutdown signal
    ///
    /// # Errors
    /// - HTTP client construction errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %self.environment,
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            request_timeout = %self.settings.server.request_timeout,
            "Server configuration loaded"
        );

        // Tokens are never logged, only whether one is present
        tracing::info!(
            base_url = %self.settings.vika.base_url,
            page_size = self.settings.vika.page_size,
            token_configured = !self.settings.vika.token.is_empty(),
            "Spreadsheet service configuration loaded"
        );
        for (name, sheet) in self.settings.vika.datasheets.entries() {
            tracing::debug!(
                sheet = name,
                datasheet_id = %sheet.id,
                view_id = sheet.view_id.as_deref().unwrap_or("-"),
                own_token = sheet.token.is_some(),
                "Datasheet configured"
            );
        }

        tracing::info!(
            max_rate = self.settings.governor.max_rate,
            cache_enabled = self.settings.cache.enabled,
            cache_ttl_seconds = self.settings.cache.ttl_seconds,
            "Call governor and cache configured"
        );

        tracing::info!(
            level = %self.settings.logger.level,
            console_enabled = %self.settings.logger.console.enabled,
            file_enabled = %self.settings.logger.file.enabled,
            "Logger configuration loaded"
        );
        if self.environment.is_production()
            && matches!(self.settings.logger.level.to_lowercase().as_str(), "debug" | "trace")
        {
            tracing::warn!(level = %self.settings.logger.level, "Verbose logging enabled in production");
        }

        let state = Self::build_state(&self.settings)?;
        tracing::info!("Application state created");

        let router = create_router(state);
        tracing::info!("Router configured");

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires, leaving the
/// other one in charge.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
