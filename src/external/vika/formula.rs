//! Typed `filterByFormula` expressions.
//!
//! Formulas are built from values supplied by API callers, so string literals
//! are always escaped on render. [`Formula::Raw`] passes a caller-written
//! formula through untouched.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::types::Fields;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// `{field} = "value"`
    Equals { field: String, value: String },
    /// `FIND("needle", {field}) > 0`
    Contains { field: String, needle: String },
    Any(Vec<Formula>),
    All(Vec<Formula>),
    Raw(String),
}

impl Formula {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Formula::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Formula::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn any(formulas: impl IntoIterator<Item = Formula>) -> Self {
        Formula::Any(formulas.into_iter().collect())
    }

    pub fn all(formulas: impl IntoIterator<Item = Formula>) -> Self {
        Formula::All(formulas.into_iter().collect())
    }

    pub fn raw(formula: impl Into<String>) -> Self {
        Formula::Raw(formula.into())
    }

    /// Evaluates the formula against a record's fields.
    ///
    /// Used by in-memory transports; a [`Formula::Raw`] matches every record.
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Formula::Equals { field, value } => field_text(fields, field) == *value,
            Formula::Contains { field, needle } => field_text(fields, field).contains(needle.as_str()),
            Formula::Any(parts) => parts.iter().any(|f| f.matches(fields)),
            Formula::All(parts) => parts.iter().all(|f| f.matches(fields)),
            Formula::Raw(_) => true,
        }
    }
}

fn field_text(fields: &Fields, field: &str) -> String {
    match fields.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Quotes `value` as a formula string literal.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn write_joined(f: &mut fmt::Formatter<'_>, name: &str, parts: &[Formula]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{part}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Equals { field, value } => write!(f, "{{{field}}} = {}", quote(value)),
            Formula::Contains { field, needle } => {
                write!(f, "FIND({}, {{{field}}}) > 0", quote(needle))
            }
            Formula::Any(parts) => write_joined(f, "OR", parts),
            Formula::All(parts) => write_joined(f, "AND", parts),
            Formula::Raw(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Formula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
