//! Health check endpoint handlers.
//!
//! Health reports on this process only. The spreadsheet service is not
//! called, so probes never spend the outbound rate budget.

use axum::extract::State;
use jiff::Timestamp;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{HealthResponse, HealthStatus};
use crate::envelope::Envelope;
use crate::state::AppState;

pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health_check))
}

/// Basic health check endpoint.
///
/// # Responses
/// - `200 OK` - Service is up
///
/// # Example Response
/// ```json
/// {
///   "success": true,
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "timestamp": "2025-10-15T04:00:00Z",
///     "pendingCalls": 0,
///     "cachedEntries": 12
///   },
///   "message": "OK"
/// }
/// ```
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = Envelope<HealthResponse>)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Envelope<HealthResponse> {
    Envelope::ok(
        HealthResponse {
            status: HealthStatus::Healthy,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Timestamp::now().to_string(),
            pending_calls: state.gateway.governor().pending(),
            cached_entries: state.gateway.cache().len(),
        },
        "OK",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Healthy).unwrap();
        assert_eq!(json, "\"healthy\"");
    }
}
