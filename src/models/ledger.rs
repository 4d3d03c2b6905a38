use std::sync::LazyLock;

use jiff::Zoned;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::fields::{self, non_blank};
use crate::external::vika::{Fields, Record};

pub mod field {
    pub const MEMBER_NAME: &str = "member_name";
    pub const PHONE: &str = "phonenumber";
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";
    pub const RECORD: &str = "record";
    pub const PRODUCT_DETAILS: &str = "product_details";
}

pub const RECHARGE_MARKER: &str = "充值";
pub const CONSUME_MARKER: &str = "消费";

static RECHARGE_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"充值(\d+(?:\.\d+)?)元").expect("valid recharge pattern"));
static CONSUME_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"消费(\d+(?:\.\d+)?)元").expect("valid consume pattern"));
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Recharge,
    Consume,
}

impl LedgerKind {
    /// Anything that is not a recharge counts as a consumption.
    pub fn of(record_text: &str) -> Self {
        if record_text.contains(RECHARGE_MARKER) {
            LedgerKind::Recharge
        } else {
            LedgerKind::Consume
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            LedgerKind::Recharge => RECHARGE_MARKER,
            LedgerKind::Consume => CONSUME_MARKER,
        }
    }

    /// Ledger text for a movement of `amount`, e.g. `充值100元`.
    pub fn describe(&self, amount: f64) -> String {
        format!("{}{}元", self.marker(), amount)
    }

    /// Amount in `record_text` when it is a well-formed entry of this kind.
    pub fn parse_amount(&self, record_text: &str) -> Option<f64> {
        let pattern = match self {
            LedgerKind::Recharge => &RECHARGE_AMOUNT,
            LedgerKind::Consume => &CONSUME_AMOUNT,
        };
        pattern
            .captures(record_text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Which ledger entries a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LedgerScope {
    #[default]
    All,
    Recharge,
    Consume,
}

impl LedgerScope {
    pub fn kind(&self) -> Option<LedgerKind> {
        match self {
            LedgerScope::All => None,
            LedgerScope::Recharge => Some(LedgerKind::Recharge),
            LedgerScope::Consume => Some(LedgerKind::Consume),
        }
    }
}

/// First number anywhere in the text, or 0.
pub fn first_amount(record_text: &str) -> f64 {
    FIRST_NUMBER
        .find(record_text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub record_id: String,
    pub member_name: String,
    pub phone: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    pub record: String,
    pub product_details: Option<String>,
    pub kind: LedgerKind,
}

impl LedgerEntry {
    pub fn from_record(record: &Record) -> Self {
        let f = &record.fields;
        let text = fields::text_or_default(f, field::RECORD);
        Self {
            record_id: record.record_id.clone(),
            member_name: fields::text_or_default(f, field::MEMBER_NAME),
            phone: fields::text_or_default(f, field::PHONE),
            date: fields::text_or_default(f, field::DATE),
            time: fields::text_or_default(f, field::TIME),
            kind: LedgerKind::of(&text),
            record: text,
            product_details: fields::text(f, field::PRODUCT_DETAILS),
        }
    }

    /// Amount of a well-formed entry of its own kind.
    pub fn amount(&self) -> Option<f64> {
        self.kind.parse_amount(&self.record)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLedgerEntry {
    pub member_name: String,
    pub phone: String,
    #[validate(custom(function = "non_blank", message = "Date is required"))]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[validate(custom(function = "non_blank", message = "Record text is required"))]
    pub record: String,
    pub product_details: Option<String>,
}

impl NewLedgerEntry {
    /// Entry for a balance movement happening at `now`.
    pub fn movement(
        member_name: &str,
        phone: &str,
        kind: LedgerKind,
        amount: f64,
        product_details: Option<String>,
        now: &Zoned,
    ) -> Self {
        Self {
            member_name: member_name.to_string(),
            phone: phone.to_string(),
            date: now.strftime("%Y-%m-%d").to_string(),
            time: now.strftime("%H:%M:%S").to_string(),
            record: kind.describe(amount),
            product_details: product_details.filter(|d| !d.trim().is_empty()),
        }
    }

    pub fn to_fields(&self) -> Fields {
        let mut f = Fields::new();
        fields::put(&mut f, field::MEMBER_NAME, self.member_name.as_str());
        fields::put(&mut f, field::PHONE, self.phone.as_str());
        fields::put(&mut f, field::DATE, self.date.as_str());
        fields::put(&mut f, field::TIME, self.time.as_str());
        fields::put(&mut f, field::RECORD, self.record.as_str());
        fields::put_opt(&mut f, field::PRODUCT_DETAILS, self.product_details.as_deref());
        f
    }
}

/// Ledger entry summarised for the dashboard feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: String,
    pub member_name: String,
    pub member_phone: String,
    pub date: String,
    pub action: String,
    #[serde(rename = "type")]
    pub kind: LedgerKind,
    pub amount: f64,
}

impl From<LedgerEntry> for RecentActivity {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            amount: first_amount(&entry.record),
            id: entry.record_id,
            member_name: entry.member_name,
            member_phone: entry.phone,
            date: entry.date,
            action: entry.record,
            kind: entry.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_record_text() {
        assert_eq!(LedgerKind::of("充值100元"), LedgerKind::Recharge);
        assert_eq!(LedgerKind::of("消费50元"), LedgerKind::Consume);
        assert_eq!(LedgerKind::of("调整"), LedgerKind::Consume);
    }

    #[test]
    fn describes_amounts_without_trailing_zeroes() {
        assert_eq!(LedgerKind::Recharge.describe(100.0), "充值100元");
        assert_eq!(LedgerKind::Consume.describe(50.5), "消费50.5元");
    }

    #[test]
    fn parses_amounts_of_matching_kind_only() {
        assert_eq!(LedgerKind::Recharge.parse_amount("充值100元"), Some(100.0));
        assert_eq!(LedgerKind::Consume.parse_amount("消费12.5元"), Some(12.5));
        assert_eq!(LedgerKind::Recharge.parse_amount("消费12.5元"), None);
        assert_eq!(LedgerKind::Recharge.parse_amount("充值元"), None);
    }

    #[test]
    fn first_amount_tolerates_free_text() {
        assert_eq!(first_amount("会员充值 30.5 元"), 30.5);
        assert_eq!(first_amount("none"), 0.0);
    }

    #[test]
    fn recent_activity_exposes_type() {
        let record = Record {
            record_id: "recL".into(),
            created_at: None,
            updated_at: None,
            fields: json!({
                "member_name": "Ann",
                "phonenumber": "138",
                "date": "2026-10-01",
                "record": "充值100元"
            })
            .as_object()
            .cloned()
            .unwrap(),
        };
        let activity = RecentActivity::from(LedgerEntry::from_record(&record));
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["type"], json!("recharge"));
        assert_eq!(value["amount"], json!(100.0));
        assert_eq!(value["memberPhone"], json!("138"));
    }

    #[test]
    fn movement_stamps_date_and_time() {
        let now: Zoned = "2026-10-16T09:05:03+08:00[+08:00]".parse().unwrap();
        let entry =
            NewLedgerEntry::movement("Ann", "138", LedgerKind::Consume, 20.0, Some(" ".into()), &now);
        assert_eq!(entry.date, "2026-10-16");
        assert_eq!(entry.time, "09:05:03");
        assert_eq!(entry.record, "消费20元");
        assert!(entry.product_details.is_none());
    }
}
