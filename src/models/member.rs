use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::fields::{self, non_blank};
use crate::external::vika::{Fields, Record};

pub const DEFAULT_LEVEL: &str = "普通会员";

/// Field names in the members datasheet.
pub mod field {
    pub const NAME: &str = "member_name";
    pub const PHONE: &str = "phonenumber";
    pub const BALANCE: &str = "Remaining sum";
    pub const BALANCE_ALT: &str = "Remaining_sum";
    pub const LEVEL: &str = "level";
    pub const LEVEL_ALT: &str = "member_level";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub record_id: String,
    pub name: String,
    pub phone: String,
    pub balance: f64,
    pub level: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub created_at: Option<Timestamp>,
}

impl Member {
    pub fn from_record(record: &Record) -> Self {
        let f = &record.fields;
        Self {
            record_id: record.record_id.clone(),
            name: fields::text_or_default(f, field::NAME),
            phone: fields::text_or_default(f, field::PHONE),
            balance: fields::first_number(f, &[field::BALANCE, field::BALANCE_ALT]).unwrap_or(0.0),
            level: fields::first_text(f, &[field::LEVEL, field::LEVEL_ALT])
                .unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
            created_at: record.created(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    #[validate(custom(function = "non_blank", message = "Member name is required"))]
    pub name: String,
    #[validate(custom(function = "non_blank", message = "Phone number is required"))]
    pub phone: String,
    #[validate(range(min = 0.0, message = "Balance cannot be negative"))]
    pub balance: Option<f64>,
    pub level: Option<String>,
}

impl NewMember {
    pub fn to_fields(&self) -> Fields {
        let mut f = Fields::new();
        fields::put(&mut f, field::NAME, self.name.trim());
        fields::put(&mut f, field::PHONE, self.phone.trim());
        fields::put(&mut f, field::BALANCE, fields::round_cents(self.balance.unwrap_or(0.0)));
        fields::put(
            &mut f,
            field::LEVEL,
            self.level
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .unwrap_or(DEFAULT_LEVEL),
        );
        f
    }
}

/// Partial member update; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberPatch {
    #[validate(custom(function = "non_blank", message = "Member name cannot be empty"))]
    pub name: Option<String>,
    #[validate(custom(function = "non_blank", message = "Phone number cannot be empty"))]
    pub phone: Option<String>,
    #[validate(range(min = 0.0, message = "Balance cannot be negative"))]
    pub balance: Option<f64>,
    pub level: Option<String>,
}

impl MemberPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.balance.is_none() && self.level.is_none()
    }

    pub fn to_fields(&self) -> Fields {
        let mut f = Fields::new();
        fields::put_opt(&mut f, field::NAME, self.name.as_deref().map(str::trim));
        fields::put_opt(&mut f, field::PHONE, self.phone.as_deref().map(str::trim));
        fields::put_opt(&mut f, field::BALANCE, self.balance.map(fields::round_cents));
        fields::put_opt(&mut f, field::LEVEL, self.level.as_deref().map(str::trim));
        f
    }
}

/// Amount for a recharge.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct Recharge {
    #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than 0"))]
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Consume {
    #[validate(range(exclusive_min = 0.0, message = "Amount must be greater than 0"))]
    pub amount: f64,
    /// Free-text list of what was bought
    pub product_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RechargeOutcome {
    pub member_name: String,
    pub recharge_amount: f64,
    pub previous_balance: f64,
    pub new_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeOutcome {
    pub member_name: String,
    pub consume_amount: f64,
    pub previous_balance: f64,
    pub new_balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: serde_json::Value) -> Record {
        Record {
            record_id: "recM".to_string(),
            created_at: Some(1_700_000_000_000),
            updated_at: None,
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn reads_members_with_alternate_field_names() {
        let member = Member::from_record(&record(json!({
            "member_name": "Ann",
            "phonenumber": "13800000000",
            "Remaining_sum": "80",
            "member_level": "金卡会员"
        })));
        assert_eq!(member.name, "Ann");
        assert_eq!(member.balance, 80.0);
        assert_eq!(member.level, "金卡会员");
        assert!(member.created_at.is_some());
    }

    #[test]
    fn missing_level_defaults_to_regular() {
        let member = Member::from_record(&record(json!({ "member_name": "Bo" })));
        assert_eq!(member.level, DEFAULT_LEVEL);
        assert_eq!(member.balance, 0.0);
    }

    #[test]
    fn new_member_requires_name_and_phone() {
        let input = NewMember {
            name: "Ann".into(),
            phone: "   ".into(),
            balance: None,
            level: None,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
        assert!(!errors.field_errors().contains_key("name"));
    }

    #[test]
    fn new_member_fields_are_trimmed_with_defaults() {
        let input = NewMember {
            name: " Ann ".into(),
            phone: "13800000000".into(),
            balance: None,
            level: Some(" ".into()),
        };
        let f = input.to_fields();
        assert_eq!(f[field::NAME], json!("Ann"));
        assert_eq!(f[field::BALANCE], json!(0.0));
        assert_eq!(f[field::LEVEL], json!(DEFAULT_LEVEL));
    }

    #[test]
    fn patch_writes_only_present_fields() {
        let patch = MemberPatch {
            balance: Some(80.0),
            ..Default::default()
        };
        let f = patch.to_fields();
        assert_eq!(f.len(), 1);
        assert_eq!(f[field::BALANCE], json!(80.0));
        assert!(MemberPatch::default().is_empty());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(Recharge { amount: 0.0 }.validate().is_err());
        assert!(Recharge { amount: 0.01 }.validate().is_ok());
    }
}
