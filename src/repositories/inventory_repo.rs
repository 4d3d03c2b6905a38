use crate::error::{AppError, AppResult};
use crate::external::vika::{Fields, Formula, RecordQuery};
use crate::models::InventoryRecord;

use super::gateway::Sheet;

/// Stock-take records.
#[derive(Clone)]
pub struct InventoryRepository {
    sheet: Sheet,
}

impl InventoryRepository {
    pub fn new(sheet: Sheet) -> Self {
        Self { sheet }
    }

    pub async fn list(&self, filter: Option<Formula>) -> AppResult<Vec<InventoryRecord>> {
        let mut query = RecordQuery::new().view(self.sheet.view_id());
        if let Some(filter) = filter {
            query = query.filter(filter);
        }
        let records = self.sheet.query_all(query).await?;
        Ok(records.iter().map(InventoryRecord::from_record).collect())
    }

    pub async fn create(&self, fields: Fields) -> AppResult<InventoryRecord> {
        let created = self.sheet.create(vec![fields]).await?;
        created
            .first()
            .map(InventoryRecord::from_record)
            .ok_or_else(|| AppError::from(anyhow::anyhow!("create returned no inventory record")))
    }

    pub async fn delete(&self, record_ids: Vec<String>) -> AppResult<()> {
        self.sheet.delete(record_ids).await
    }
}
