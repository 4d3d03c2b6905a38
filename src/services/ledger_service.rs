use validator::Validate;

use super::{require_id, require_ids};
use crate::envelope::Envelope;
use crate::error::{AppError, AppResult};
use crate::external::vika::Formula;
use crate::models::ledger::field;
use crate::models::{LedgerEntry, LedgerScope, NewLedgerEntry, RecentActivity};
use crate::repositories::LedgerRepository;

pub const DEFAULT_RECENT_LIMIT: u32 = 10;
const MAX_RECENT_LIMIT: u32 = 100;

/// Recharge and consumption history.
#[derive(Clone)]
pub struct LedgerService {
    ledger: LedgerRepository,
}

impl LedgerService {
    pub fn new(ledger: LedgerRepository) -> Self {
        Self { ledger }
    }

    /// Lists ledger entries, newest first.
    ///
    /// # Arguments
    /// * `scope` - Recharges, consumptions or both
    /// * `phone` - Restricts the listing to one member's phone number
    pub async fn list_entries(
        &self,
        scope: LedgerScope,
        phone: Option<String>,
    ) -> Envelope<Vec<LedgerEntry>> {
        let mut parts = Vec::new();
        if let Some(kind) = scope.kind() {
            parts.push(Formula::contains(field::RECORD, kind.marker()));
        }
        if let Some(phone) = phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            parts.push(Formula::equals(field::PHONE, phone));
        }
        let filter = match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Formula::all(parts)),
        };
        Envelope::from_result(self.ledger.list(filter).await, "Ledger entries retrieved")
    }

    /// Newest entries summarised for the dashboard feed.
    ///
    /// `limit` defaults to 10 and is capped at 100.
    pub async fn recent_activities(&self, limit: Option<u32>) -> Envelope<Vec<RecentActivity>> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .clamp(1, MAX_RECENT_LIMIT);
        let result = self
            .ledger
            .recent(limit)
            .await
            .map(|entries| entries.into_iter().map(RecentActivity::from).collect());
        Envelope::from_result(result, "Recent activities retrieved")
    }

    pub async fn create_entry(&self, entry: NewLedgerEntry) -> Envelope<LedgerEntry> {
        let result = self.try_create(vec![entry]).await.and_then(|mut created| {
            created
                .pop()
                .ok_or_else(|| AppError::from(anyhow::anyhow!("create returned no ledger record")))
        });
        Envelope::from_result(result, "Ledger entry created")
    }

    pub async fn create_entries(&self, entries: Vec<NewLedgerEntry>) -> Envelope<Vec<LedgerEntry>> {
        Envelope::from_result(self.try_create(entries).await, "Ledger entries created")
    }

    pub async fn delete_entry(&self, record_id: &str) -> Envelope<()> {
        let result = match require_id(record_id) {
            Ok(id) => self.ledger.delete(vec![id.to_string()]).await,
            Err(e) => Err(e),
        };
        Envelope::from_result(result, "Ledger entry deleted")
    }

    /// Deletes several entries; the number deleted is returned.
    pub async fn delete_entries(&self, record_ids: Vec<String>) -> Envelope<usize> {
        let result = match require_ids(record_ids) {
            Ok(ids) => {
                let count = ids.len();
                self.ledger.delete(ids).await.map(|()| count)
            }
            Err(e) => Err(e),
        };
        Envelope::from_result(result, "Ledger entries deleted")
    }

    async fn try_create(&self, entries: Vec<NewLedgerEntry>) -> AppResult<Vec<LedgerEntry>> {
        if entries.is_empty() {
            return Err(AppError::validation("entries", "At least one entry is required"));
        }
        for entry in &entries {
            entry.validate()?;
        }
        self.ledger.create(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::envelope::ErrorCode;
    use crate::external::vika::fake::FakeTransport;
    use crate::models::{LedgerKind, LedgerScope, NewLedgerEntry};
    use crate::services::tests::services;

    const LEDGER: &str = "dstLedger";

    fn seed(transport: &FakeTransport) {
        for (date, phone, record) in [
            ("2025-10-01", "138", "充值100元"),
            ("2025-10-03", "139", "消费25元"),
            ("2025-10-02", "138", "消费10.5元"),
        ] {
            transport.seed(
                LEDGER,
                json!({ "member_name": "m", "phonenumber": phone, "date": date, "record": record }),
            );
        }
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let transport = Arc::new(FakeTransport::new());
        seed(&transport);
        let services = services(Arc::clone(&transport));

        let entries = services
            .ledger
            .list_entries(LedgerScope::All, None)
            .await
            .data
            .unwrap();

        let dates: Vec<_> = entries.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, ["2025-10-03", "2025-10-02", "2025-10-01"]);
    }

    #[tokio::test]
    async fn filters_by_kind_and_phone() {
        let transport = Arc::new(FakeTransport::new());
        seed(&transport);
        let services = services(Arc::clone(&transport));

        let consumes = services
            .ledger
            .list_entries(LedgerScope::Consume, Some("138".into()))
            .await
            .data
            .unwrap();

        assert_eq!(consumes.len(), 1);
        assert_eq!(consumes[0].record, "消费10.5元");
        assert_eq!(consumes[0].kind, LedgerKind::Consume);
    }

    #[tokio::test]
    async fn recent_activities_carry_kind_and_amount() {
        let transport = Arc::new(FakeTransport::new());
        seed(&transport);
        let services = services(Arc::clone(&transport));

        let recent = services.ledger.recent_activities(Some(2)).await.data.unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].kind, LedgerKind::Consume);
        assert_eq!(recent[0].amount, 25.0);
        assert_eq!(recent[1].amount, 10.5);
    }

    #[tokio::test]
    async fn entries_without_record_text_are_rejected() {
        let transport = Arc::new(FakeTransport::new());
        let services = services(Arc::clone(&transport));

        let envelope = services
            .ledger
            .create_entry(NewLedgerEntry {
                member_name: "Ann".into(),
                phone: "138".into(),
                date: "2025-10-01".into(),
                time: String::new(),
                record: " ".into(),
                product_details: None,
            })
            .await;

        assert_eq!(envelope.error_code, Some(ErrorCode::Validation));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn batch_delete_removes_each_entry_once() {
        let transport = Arc::new(FakeTransport::new());
        seed(&transport);
        let ids: Vec<String> = transport
            .records(LEDGER)
            .into_iter()
            .map(|r| r.record_id)
            .collect();
        let services = services(Arc::clone(&transport));

        let envelope = services
            .ledger
            .delete_entries(vec![ids[0].clone(), ids[0].clone(), ids[1].clone()])
            .await;

        assert_eq!(envelope.data, Some(2));
        assert_eq!(transport.records(LEDGER).len(), 1);
    }
}
