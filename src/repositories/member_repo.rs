//! Member repository over the members datasheet.

use crate::error::{AppError, AppResult};
use crate::external::vika::{Fields, Formula, RecordQuery, RecordUpdate};
use crate::models::member::field;
use crate::models::{Member, NewMember};

use super::gateway::Sheet;

/// Member repository holding a handle on the members sheet.
///
/// Cloning is cheap; all clones share the gateway's governor and cache.
#[derive(Clone)]
pub struct MemberRepository {
    sheet: Sheet,
}

impl MemberRepository {
    pub fn new(sheet: Sheet) -> Self {
        Self { sheet }
    }

    /// Queries one page of members.
    ///
    /// # Arguments
    /// * `view_id` - View to read through; the configured view when `None`
    /// * `formula` - Caller-written `filterByFormula`
    /// * `max_records` - Upper bound on returned members
    pub async fn query(
        &self,
        view_id: Option<String>,
        formula: Option<String>,
        max_records: Option<u32>,
    ) -> AppResult<Vec<Member>> {
        let mut query = RecordQuery::new()
            .view(view_id.or_else(|| self.sheet.view_id()))
            .max_records(max_records);
        if let Some(formula) = formula.filter(|f| !f.trim().is_empty()) {
            query = query.filter(Formula::raw(formula));
        }
        let page = self.sheet.query(query).await?;
        Ok(page.records.iter().map(Member::from_record).collect())
    }

    /// Lists every member across all pages.
    pub async fn list_all(&self) -> AppResult<Vec<Member>> {
        let query = RecordQuery::new().view(self.sheet.view_id());
        let records = self.sheet.query_all(query).await?;
        Ok(records.iter().map(Member::from_record).collect())
    }

    /// Finds a member by record id.
    ///
    /// # Returns
    /// `Some(Member)` if found, `None` otherwise
    pub async fn find_by_id(&self, record_id: &str) -> AppResult<Option<Member>> {
        let record = self.sheet.get(record_id).await?;
        Ok(record.as_ref().map(Member::from_record))
    }

    /// Like [`find_by_id`](Self::find_by_id) but always reads the sheet.
    pub async fn fetch_by_id(&self, record_id: &str) -> AppResult<Option<Member>> {
        let record = self.sheet.fetch(record_id).await?;
        Ok(record.as_ref().map(Member::from_record))
    }

    /// Finds every member registered with `phone`.
    pub async fn find_by_phone(&self, phone: &str) -> AppResult<Vec<Member>> {
        let query = RecordQuery::new().filter(Formula::equals(field::PHONE, phone.trim()));
        let records = self.sheet.query_all(query).await?;
        Ok(records.iter().map(Member::from_record).collect())
    }

    pub async fn create(&self, new_member: &NewMember) -> AppResult<Member> {
        let created = self.sheet.create(vec![new_member.to_fields()]).await?;
        created
            .first()
            .map(Member::from_record)
            .ok_or_else(|| AppError::from(anyhow::anyhow!("create returned no member record")))
    }

    /// Writes `fields` onto an existing member.
    ///
    /// # Returns
    /// The member as stored after the update
    pub async fn update(&self, record_id: &str, fields: Fields) -> AppResult<Member> {
        let updated = self
            .sheet
            .update(vec![RecordUpdate::new(record_id, fields)])
            .await?;
        updated
            .first()
            .map(Member::from_record)
            .ok_or_else(|| AppError::not_found("member", "recordId", record_id))
    }

    pub async fn delete(&self, record_id: &str) -> AppResult<()> {
        self.sheet.delete(vec![record_id.to_string()]).await
    }
}
