use std::collections::BTreeMap;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{Timestamp, ToSpan, Zoned};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fields::round_cents;
use super::ledger::{LedgerEntry, LedgerKind};
use super::member::Member;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub total_members: usize,
    pub total_balance: f64,
    /// Member count per level
    pub level_stats: BTreeMap<String, usize>,
}

impl MemberStats {
    pub fn tally(members: &[Member]) -> Self {
        let mut level_stats = BTreeMap::new();
        for member in members {
            *level_stats.entry(member.level.clone()).or_insert(0) += 1;
        }
        Self {
            total_members: members.len(),
            total_balance: round_cents(members.iter().map(|m| m.balance).sum()),
            level_stats,
        }
    }
}

/// Reporting window of the business analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisWindow {
    Week,
    Month,
}

impl AnalysisWindow {
    pub fn from_days(days: u32) -> Option<Self> {
        match days {
            7 => Some(AnalysisWindow::Week),
            30 => Some(AnalysisWindow::Month),
            _ => None,
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            AnalysisWindow::Week => 7,
            AnalysisWindow::Month => 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSummary {
    pub new_members: usize,
    pub total_members: usize,
    pub recharge_amount: f64,
    pub consume_amount: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyFigures {
    /// `YYYY-MM-DD`
    pub date: String,
    pub recharge: f64,
    pub consume: f64,
    pub new_members: usize,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LevelShare {
    pub level: String,
    pub count: usize,
    /// Share of all members, one decimal place
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAnalysis {
    pub days: i64,
    pub start_date: String,
    pub end_date: String,
    pub summary: BusinessSummary,
    pub daily_data: Vec<DailyFigures>,
    pub member_level_data: Vec<LevelShare>,
}

impl BusinessAnalysis {
    /// Figures for the civil dates `today - days ..= today` in `now`'s zone.
    ///
    /// Ledger amounts come from the `充值{n}元` / `消费{n}元` record text;
    /// entries with unparseable dates or amounts contribute nothing.
    pub fn compute(
        window: AnalysisWindow,
        now: &Zoned,
        members: &[Member],
        ledger: &[LedgerEntry],
    ) -> Self {
        let tz = now.time_zone().clone();
        let today = now.date();
        let start = today.saturating_sub(window.days().days());

        let mut daily: BTreeMap<Date, DailyFigures> = start
            .series(1.day())
            .take_while(|d| *d <= today)
            .map(|d| {
                let figures = DailyFigures {
                    date: d.to_string(),
                    recharge: 0.0,
                    consume: 0.0,
                    new_members: 0,
                    profit: 0.0,
                };
                (d, figures)
            })
            .collect();

        for entry in ledger {
            let Some(date) = parse_entry_date(&entry.date, &tz) else {
                continue;
            };
            let Some(day) = daily.get_mut(&date) else {
                continue;
            };
            if let Some(amount) = LedgerKind::Recharge.parse_amount(&entry.record) {
                day.recharge += amount;
            }
            if let Some(amount) = LedgerKind::Consume.parse_amount(&entry.record) {
                day.consume += amount;
            }
        }

        for member in members {
            let Some(joined) = member.created_at.map(|ts| ts.to_zoned(tz.clone()).date()) else {
                continue;
            };
            if let Some(day) = daily.get_mut(&joined) {
                day.new_members += 1;
            }
        }

        let mut summary = BusinessSummary {
            total_members: members.len(),
            ..Default::default()
        };
        let daily_data: Vec<DailyFigures> = daily
            .into_values()
            .map(|mut day| {
                day.recharge = round_cents(day.recharge);
                day.consume = round_cents(day.consume);
                day.profit = round_cents(day.recharge - day.consume);
                summary.new_members += day.new_members;
                summary.recharge_amount += day.recharge;
                summary.consume_amount += day.consume;
                day
            })
            .collect();
        summary.recharge_amount = round_cents(summary.recharge_amount);
        summary.consume_amount = round_cents(summary.consume_amount);
        summary.profit = round_cents(summary.recharge_amount - summary.consume_amount);

        Self {
            days: window.days(),
            start_date: start.to_string(),
            end_date: today.to_string(),
            summary,
            daily_data,
            member_level_data: level_shares(members),
        }
    }
}

fn level_shares(members: &[Member]) -> Vec<LevelShare> {
    let stats = MemberStats::tally(members);
    let total = members.len().max(1) as f64;
    let mut shares: Vec<LevelShare> = stats
        .level_stats
        .into_iter()
        .map(|(level, count)| LevelShare {
            percentage: (count as f64 / total * 1000.0).round() / 10.0,
            level,
            count,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.level.cmp(&b.level)));
    shares
}

/// Ledger dates are `YYYY-MM-DD` text, optionally followed by a time, or a
/// date cell returned as epoch milliseconds.
fn parse_entry_date(text: &str, tz: &TimeZone) -> Option<Date> {
    let text = text.trim();
    if let Some(date) = text.get(..10).and_then(|d| d.parse::<Date>().ok()) {
        return Some(date);
    }
    let millis = text.parse::<i64>().ok()?;
    let ts = Timestamp::from_millisecond(millis).ok()?;
    Some(ts.to_zoned(tz.clone()).date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn now() -> Zoned {
        "2026-10-16T15:00:00+08:00[+08:00]".parse().unwrap()
    }

    fn member(level: &str, joined: &str) -> Member {
        let created: Zoned = format!("{joined}T10:00:00+08:00[+08:00]").parse().unwrap();
        Member {
            record_id: format!("rec-{joined}-{level}"),
            name: "m".into(),
            phone: "1".into(),
            balance: 10.0,
            level: level.into(),
            created_at: Some(created.timestamp()),
        }
    }

    fn entry(date: &str, record: &str) -> LedgerEntry {
        LedgerEntry {
            record_id: format!("rec-{date}-{record}"),
            member_name: "m".into(),
            phone: "1".into(),
            date: date.into(),
            time: "12:00:00".into(),
            record: record.into(),
            product_details: None,
            kind: LedgerKind::of(record),
        }
    }

    #[test]
    fn windows_are_seven_or_thirty_days() {
        assert_eq!(AnalysisWindow::from_days(7), Some(AnalysisWindow::Week));
        assert_eq!(AnalysisWindow::from_days(30), Some(AnalysisWindow::Month));
        assert_eq!(AnalysisWindow::from_days(14), None);
    }

    #[test]
    fn member_stats_group_by_level() {
        let stats = MemberStats::tally(&[
            member("普通会员", "2026-01-01"),
            member("金卡会员", "2026-01-01"),
            member("普通会员", "2026-01-02"),
        ]);
        assert_eq!(stats.total_members, 3);
        assert_eq!(stats.total_balance, 30.0);
        assert_eq!(stats.level_stats["普通会员"], 2);
    }

    #[test]
    fn weekly_analysis_sums_in_range_entries() {
        let members = vec![
            member("普通会员", "2026-10-15"),
            member("普通会员", "2026-10-01"),
            member("金卡会员", "2026-10-09"),
        ];
        let ledger = vec![
            entry("2026-10-16", "充值100元"),
            entry("2026-10-15", "消费30.5元"),
            entry("2026-10-09", "充值20元"),
            entry("2026-10-08", "充值999元"),
            entry("bad-date", "充值5元"),
            entry("2026-10-16", "消费元"),
        ];

        let analysis = BusinessAnalysis::compute(AnalysisWindow::Week, &now(), &members, &ledger);

        assert_eq!(analysis.start_date, "2026-10-09");
        assert_eq!(analysis.end_date, "2026-10-16");
        assert_eq!(analysis.daily_data.len(), 8);
        assert_eq!(
            analysis.summary,
            BusinessSummary {
                new_members: 2,
                total_members: 3,
                recharge_amount: 120.0,
                consume_amount: 30.5,
                profit: 89.5,
            }
        );

        let last = analysis.daily_data.last().unwrap();
        assert_eq!(last.date, "2026-10-16");
        assert_eq!(last.recharge, 100.0);
        assert_eq!(last.profit, 100.0);
    }

    #[test]
    fn level_shares_are_percentages_of_all_members() {
        let members = vec![
            member("普通会员", "2026-10-15"),
            member("普通会员", "2026-10-01"),
            member("金卡会员", "2026-10-09"),
        ];
        let analysis = BusinessAnalysis::compute(AnalysisWindow::Month, &now(), &members, &[]);
        assert_eq!(analysis.daily_data.len(), 31);
        assert_eq!(analysis.member_level_data[0].level, "普通会员");
        assert_eq!(analysis.member_level_data[0].percentage, 66.7);
        assert_eq!(analysis.member_level_data[1].percentage, 33.3);
    }

    #[test]
    fn entry_dates_accept_text_and_epoch_millis() {
        let tz = TimeZone::fixed(jiff::tz::offset(8));
        assert_eq!(parse_entry_date("2026-10-16", &tz), Some(date(2026, 10, 16)));
        assert_eq!(parse_entry_date("2026-10-16 08:00", &tz), Some(date(2026, 10, 16)));
        let millis = date(2026, 10, 16)
            .at(0, 30, 0, 0)
            .to_zoned(tz.clone())
            .unwrap()
            .timestamp()
            .as_millisecond();
        assert_eq!(parse_entry_date(&millis.to_string(), &tz), Some(date(2026, 10, 16)));
        assert_eq!(parse_entry_date("soon", &tz), None);
    }
}
