use crate::error::AppResult;
use crate::external::vika::{Formula, RecordQuery, SortOrder};
use crate::models::ledger::field;
use crate::models::{LedgerEntry, NewLedgerEntry};

use super::gateway::Sheet;

/// Recharge and consumption records, newest date first.
#[derive(Clone)]
pub struct LedgerRepository {
    sheet: Sheet,
}

impl LedgerRepository {
    pub fn new(sheet: Sheet) -> Self {
        Self { sheet }
    }

    fn base_query(&self) -> RecordQuery {
        RecordQuery::new()
            .view(self.sheet.view_id())
            .sort(field::DATE, SortOrder::Desc)
    }

    /// Every entry matching `filter`, or every entry when `None`.
    pub async fn list(&self, filter: Option<Formula>) -> AppResult<Vec<LedgerEntry>> {
        let mut query = self.base_query();
        if let Some(filter) = filter {
            query = query.filter(filter);
        }
        let records = self.sheet.query_all(query).await?;
        Ok(records.iter().map(LedgerEntry::from_record).collect())
    }

    /// The `limit` newest entries.
    pub async fn recent(&self, limit: u32) -> AppResult<Vec<LedgerEntry>> {
        let query = self.base_query().max_records(Some(limit));
        let page = self.sheet.query(query).await?;
        Ok(page.records.iter().map(LedgerEntry::from_record).collect())
    }

    pub async fn create(&self, entries: &[NewLedgerEntry]) -> AppResult<Vec<LedgerEntry>> {
        let fields = entries.iter().map(NewLedgerEntry::to_fields).collect();
        let created = self.sheet.create(fields).await?;
        Ok(created.iter().map(LedgerEntry::from_record).collect())
    }

    pub async fn delete(&self, record_ids: Vec<String>) -> AppResult<()> {
        self.sheet.delete(record_ids).await
    }
}
