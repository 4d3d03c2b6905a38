use std::time::Duration;

use crate::config::VikaConfig;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds the shared HTTP client for the spreadsheet service.
///
/// One client is built by the composition root and cloned into every
/// consumer; clones share the connection pool.
///
/// # Features
/// - **Timeouts**: request and connect timeouts from [`VikaConfig`]
/// - **Connection pooling**: idle connections kept for 90s
/// - **HTTP/2**: adaptive window sizing and keep-alive pings
/// - **Compression**: gzip responses are decoded transparently
/// - **TLS**: Rustls only
pub fn build_http_client(config: &VikaConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        .gzip(true)
        .user_agent(USER_AGENT)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_config() {
        assert!(build_http_client(&VikaConfig::default()).is_ok());
    }

    #[test]
    fn user_agent_names_the_crate() {
        assert!(USER_AGENT.starts_with("pos-rs/"));
    }
}
