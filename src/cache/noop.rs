//! Cache backend used when caching is disabled.

use crate::cache::AppCache;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCache;

impl NoOpCache {
    pub fn new() -> Self {
        Self
    }
}

impl AppCache for NoOpCache {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: Vec<u8>) {}

    fn invalidate_prefix(&self, _prefix: &str) -> usize {
        0
    }

    fn remove(&self, _key: &str) -> bool {
        false
    }

    fn clear(&self) {}

    fn len(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_stores_anything() {
        let cache = NoOpCache::new();
        cache.set("members:query:{}", b"[]".to_vec());
        assert!(cache.get("members:query:{}").is_none());
        assert!(cache.is_empty());
    }
}
