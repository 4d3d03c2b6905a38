use crate::error::{AppError, AppResult};
use crate::external::vika::{Fields, Formula, RecordQuery, RecordUpdate};
use crate::models::Product;

use super::gateway::Sheet;

#[derive(Clone)]
pub struct ProductRepository {
    sheet: Sheet,
}

impl ProductRepository {
    pub fn new(sheet: Sheet) -> Self {
        Self { sheet }
    }

    /// Products in the configured view, optionally filtered.
    pub async fn list(&self, filter: Option<Formula>) -> AppResult<Vec<Product>> {
        let mut query = RecordQuery::new().view(self.sheet.view_id());
        if let Some(filter) = filter {
            query = query.filter(filter);
        }
        let records = self.sheet.query_all(query).await?;
        Ok(records.iter().map(Product::from_record).collect())
    }

    pub async fn find_by_id(&self, record_id: &str) -> AppResult<Option<Product>> {
        let record = self.sheet.get(record_id).await?;
        Ok(record.as_ref().map(Product::from_record))
    }

    pub async fn create(&self, fields: Fields) -> AppResult<Product> {
        let created = self.sheet.create(vec![fields]).await?;
        created
            .first()
            .map(Product::from_record)
            .ok_or_else(|| AppError::from(anyhow::anyhow!("create returned no product record")))
    }

    /// Applies several updates, batched per request limit.
    pub async fn update_many(&self, updates: Vec<RecordUpdate>) -> AppResult<Vec<Product>> {
        let updated = self.sheet.update(updates).await?;
        Ok(updated.iter().map(Product::from_record).collect())
    }

    pub async fn update(&self, record_id: &str, fields: Fields) -> AppResult<Product> {
        self.update_many(vec![RecordUpdate::new(record_id, fields)])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("product", "recordId", record_id))
    }

    pub async fn delete(&self, record_id: &str) -> AppResult<()> {
        self.sheet.delete(vec![record_id.to_string()]).await
    }
}
