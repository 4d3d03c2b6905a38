//! Deterministic cache keys for read operations.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cache::CacheError;

/// `{namespace}:{operation}:{canonical-json-params}`
///
/// Object keys are sorted recursively, so two parameter sets that differ only
/// in key order produce the same signature. Writes invalidate with
/// [`Signature::prefix`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn new<P: Serialize + ?Sized>(
        namespace: &str,
        operation: &str,
        params: &P,
    ) -> Result<Self, CacheError> {
        if namespace.contains(':') || operation.contains(':') {
            return Err(CacheError::InvalidKey(format!("{namespace}:{operation}")));
        }
        let value = serde_json::to_value(params)?;
        let canonical = serde_json::to_string(&canonicalize(value))?;
        Ok(Self(format!("{namespace}:{operation}:{canonical}")))
    }

    /// Prefix covering every signature of `operation` within `namespace`.
    pub fn prefix(namespace: &str, operation: &str) -> String {
        format!("{namespace}:{operation}:")
    }

    /// Prefix covering everything cached for `namespace`.
    pub fn namespace_prefix(namespace: &str) -> String {
        format!("{namespace}:")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
