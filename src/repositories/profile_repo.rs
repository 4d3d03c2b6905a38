use crate::error::{AppError, AppResult};
use crate::external::vika::{Fields, Formula, RecordQuery, RecordUpdate};
use crate::models::Profile;
use crate::models::profile::field;

use super::gateway::Sheet;

#[derive(Clone)]
pub struct ProfileRepository {
    sheet: Sheet,
}

impl ProfileRepository {
    pub fn new(sheet: Sheet) -> Self {
        Self { sheet }
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<Profile>> {
        let query = RecordQuery::new()
            .view(self.sheet.view_id())
            .filter(Formula::equals(field::USERNAME, username))
            .max_records(Some(1));
        let page = self.sheet.query(query).await?;
        Ok(page.records.first().map(Profile::from_record))
    }

    pub async fn update(&self, record_id: &str, fields: Fields) -> AppResult<Profile> {
        let updated = self
            .sheet
            .update(vec![RecordUpdate::new(record_id, fields)])
            .await?;
        updated
            .first()
            .map(Profile::from_record)
            .ok_or_else(|| AppError::not_found("profile", "recordId", record_id))
    }
}
