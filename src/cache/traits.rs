//! AppCache trait definition.

/// Backend contract for the read cache.
///
/// Lookups are synchronous and in-process; implementations must be safe to
/// share across tasks.
pub trait AppCache: Send + Sync {
    /// Fresh value for `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `value` stamped with the current instant, replacing any entry.
    fn set(&self, key: &str, value: Vec<u8>);

    /// Drops every entry whose key starts with `prefix`, returning how many.
    fn invalidate_prefix(&self, prefix: &str) -> usize;

    fn remove(&self, key: &str) -> bool;

    fn clear(&self);

    /// Stored entries, expired ones included until they are touched.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
