//! Data Transfer Objects for API requests and responses.
//!
//! Domain request bodies (`NewMember`, `ProductPatch`, ...) live in
//! [`crate::models`]; this module only holds HTTP-specific shapes:
//! - `params` - Query-string parameters
//! - `batch` - Bodies acting on several records
//! - `health` - Health check response

mod batch;
mod health;
mod params;

pub use batch::{BatchDeleteRequest, BatchLedgerRequest, BatchStockRequest};
pub use health::{HealthResponse, HealthStatus};
pub use params::{AnalysisParams, LedgerParams, MemberQueryParams, RecentParams, SearchParams};
