//! Lenient readers for datasheet field values.
//!
//! Cells edited by hand in the spreadsheet UI drift between types (a balance
//! typed as `"80"`, a phone number stored as a number), so readers accept both
//! strings and numbers and treat anything else as absent.

use serde_json::Value;

use crate::external::vika::Fields;

/// Non-blank text of `key`; numbers are rendered without a trailing `.0`.
pub fn text(fields: &Fields, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn text_or_default(fields: &Fields, key: &str) -> String {
    text(fields, key).unwrap_or_default()
}

pub fn number(fields: &Fields, key: &str) -> Option<f64> {
    let value = match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|n| n.is_finite())
}

/// First key holding a number.
pub fn first_number(fields: &Fields, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| number(fields, key))
}

pub fn first_text(fields: &Fields, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(fields, key))
}

/// Whole quantity; fractional values are rounded.
pub fn quantity(fields: &Fields, key: &str) -> i64 {
    number(fields, key).map(|n| n.round() as i64).unwrap_or(0)
}

pub fn put(fields: &mut Fields, key: &str, value: impl Into<Value>) {
    fields.insert(key.to_string(), value.into());
}

pub fn put_opt<V: Into<Value>>(fields: &mut Fields, key: &str, value: Option<V>) {
    if let Some(value) = value {
        put(fields, key, value);
    }
}

/// Rounds a currency amount to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub(crate) fn non_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn reads_numbers_stored_as_text() {
        let f = fields(json!({ "Remaining sum": "80.5", "qty": 3, "bad": "n/a" }));
        assert_eq!(number(&f, "Remaining sum"), Some(80.5));
        assert_eq!(number(&f, "qty"), Some(3.0));
        assert_eq!(number(&f, "bad"), None);
        assert_eq!(number(&f, "missing"), None);
    }

    #[test]
    fn reads_text_stored_as_numbers() {
        let f = fields(json!({ "phonenumber": 13800000000_u64, "blank": "  ", "name": " Ann " }));
        assert_eq!(text(&f, "phonenumber").as_deref(), Some("13800000000"));
        assert_eq!(text(&f, "blank"), None);
        assert_eq!(text(&f, "name").as_deref(), Some("Ann"));
    }

    #[test]
    fn falls_back_across_alternate_keys() {
        let f = fields(json!({ "Remaining_sum": 12 }));
        assert_eq!(first_number(&f, &["Remaining sum", "Remaining_sum"]), Some(12.0));
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_cents(0.1 + 0.2), 0.3);
        assert_eq!(round_cents(99.999), 100.0);
    }

    #[test]
    fn quantities_round_to_whole_units() {
        let f = fields(json!({ "remaining_quantity": "7.6" }));
        assert_eq!(quantity(&f, "remaining_quantity"), 8);
        assert_eq!(quantity(&f, "missing"), 0);
    }
}
