use async_trait::async_trait;

use super::error::TransportError;
use super::types::{Fields, Record, RecordPage, RecordQuery, RecordUpdate};
use crate::config::DatasheetConfig;

/// Largest batch the records endpoint accepts in one write.
pub const MAX_RECORDS_PER_WRITE: usize = 10;

/// Record-level access to one spreadsheet service.
///
/// Implementations perform exactly one outbound request per call; pacing,
/// caching and batching belong to the caller.
#[async_trait]
pub trait DatasheetTransport: Send + Sync {
    async fn query(
        &self,
        sheet: &DatasheetConfig,
        query: &RecordQuery,
    ) -> Result<RecordPage, TransportError>;

    async fn create(
        &self,
        sheet: &DatasheetConfig,
        records: Vec<Fields>,
    ) -> Result<Vec<Record>, TransportError>;

    async fn update(
        &self,
        sheet: &DatasheetConfig,
        records: Vec<RecordUpdate>,
    ) -> Result<Vec<Record>, TransportError>;

    async fn delete(
        &self,
        sheet: &DatasheetConfig,
        record_ids: &[String],
    ) -> Result<(), TransportError>;
}
