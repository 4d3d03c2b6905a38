use jiff::Zoned;

use crate::envelope::Envelope;
use crate::error::{AppError, AppResult};
use crate::models::{AnalysisWindow, BusinessAnalysis, MemberStats};
use crate::repositories::{LedgerRepository, MemberRepository};

/// Dashboard figures computed from the member and ledger sheets.
#[derive(Clone)]
pub struct StatsService {
    members: MemberRepository,
    ledger: LedgerRepository,
}

impl StatsService {
    pub fn new(members: MemberRepository, ledger: LedgerRepository) -> Self {
        Self { members, ledger }
    }

    /// Member count, total stored balance and count per level.
    pub async fn member_stats(&self) -> Envelope<MemberStats> {
        let result = self
            .members
            .list_all()
            .await
            .map(|members| MemberStats::tally(&members));
        Envelope::from_result(result, "Member statistics retrieved")
    }

    /// Business figures for the last 7 or 30 days, ending today.
    ///
    /// # Arguments
    /// * `days` - Window length; only `7` and `30` are accepted
    pub async fn business_analysis(&self, days: u32) -> Envelope<BusinessAnalysis> {
        Envelope::from_result(
            self.analyse(days, Zoned::now()).await,
            "Business analysis retrieved",
        )
    }

    async fn analyse(&self, days: u32, now: Zoned) -> AppResult<BusinessAnalysis> {
        let window = AnalysisWindow::from_days(days)
            .ok_or_else(|| AppError::validation("days", "Days must be 7 or 30"))?;
        let members = self.members.list_all().await?;
        let ledger = self.ledger.list(None).await?;
        Ok(BusinessAnalysis::compute(window, &now, &members, &ledger))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::Zoned;
    use serde_json::json;

    use crate::envelope::ErrorCode;
    use crate::external::vika::fake::FakeTransport;
    use crate::services::tests::services;

    #[tokio::test]
    async fn member_stats_count_levels() {
        let transport = Arc::new(FakeTransport::new());
        transport.seed("dstMembers", json!({ "member_name": "a", "Remaining sum": 10.5 }));
        transport.seed(
            "dstMembers",
            json!({ "member_name": "b", "Remaining sum": "20", "member_level": "金卡会员" }),
        );
        let services = services(transport);

        let stats = services.stats.member_stats().await.data.unwrap();

        assert_eq!(stats.total_members, 2);
        assert_eq!(stats.total_balance, 30.5);
        assert_eq!(stats.level_stats["普通会员"], 1);
        assert_eq!(stats.level_stats["金卡会员"], 1);
    }

    #[tokio::test]
    async fn other_windows_are_rejected() {
        let transport = Arc::new(FakeTransport::new());
        let services = services(Arc::clone(&transport));

        let envelope = services.stats.business_analysis(14).await;

        assert_eq!(envelope.error_code, Some(ErrorCode::Validation));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn analysis_counts_todays_movements() {
        let transport = Arc::new(FakeTransport::new());
        let now: Zoned = "2025-10-15T12:00:00+08:00[+08:00]".parse().unwrap();
        transport.seed_at("dstMembers", json!({ "member_name": "a" }), now.timestamp());
        for record in ["充值100元", "消费30元"] {
            transport.seed(
                "dstLedger",
                json!({ "date": "2025-10-15", "record": record }),
            );
        }
        let services = services(transport);

        let analysis = services.stats.analyse(7, now).await.unwrap();

        assert_eq!(analysis.daily_data.len(), 8);
        assert_eq!(analysis.summary.new_members, 1);
        assert_eq!(analysis.summary.recharge_amount, 100.0);
        assert_eq!(analysis.summary.consume_amount, 30.0);
        assert_eq!(analysis.summary.profit, 70.0);
    }
}
