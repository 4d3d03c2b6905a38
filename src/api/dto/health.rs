use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

/// Process health; the spreadsheet service is not contacted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// RFC 3339 instant the check ran
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: String,
    /// Calls waiting for or holding the outbound call slot
    pub pending_calls: usize,
    pub cached_entries: usize,
}
