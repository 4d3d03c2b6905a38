//! In-memory TTL cache backed by `DashMap`.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::cache::AppCache;

struct Entry {
    value: Vec<u8>,
    created_at: Instant,
}

pub struct MemoryCache {
    store: DashMap<String, Entry>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.created_at) < self.ttl
    }
}

impl AppCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        {
            let entry = self.store.get(key)?;
            if self.is_fresh(&entry, now) {
                return Some(entry.value.clone());
            }
        }
        // Read guard is released above; removing while holding it deadlocks the shard.
        self.store.remove_if(key, |_, entry| !self.is_fresh(entry, now));
        None
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        self.store.insert(
            key.to_string(),
            Entry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut removed = 0;
        self.store.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    fn remove(&self, key: &str) -> bool {
        self.store.remove(key).is_some()
    }

    fn clear(&self) {
        self.store.clear();
    }

    fn len(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn value_is_served_until_ttl_elapses() {
        let cache = MemoryCache::new(Duration::from_secs(5));
        cache.set("members:list_all:{}", b"v1".to_vec());

        assert_eq!(cache.get("members:list_all:{}"), Some(b"v1".to_vec()));

        tokio::time::advance(Duration::from_millis(4_999)).await;
        assert_eq!(cache.get("members:list_all:{}"), Some(b"v1".to_vec()));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("members:list_all:{}"), None);
        assert!(cache.is_empty(), "expired entry is dropped on read");
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_restarts_the_clock() {
        let cache = MemoryCache::new(Duration::from_secs(5));
        cache.set("k", b"old".to_vec());
        tokio::time::advance(Duration::from_secs(4)).await;
        cache.set("k", b"new".to_vec());
        tokio::time::advance(Duration::from_secs(4)).await;

        assert_eq!(cache.get("k"), Some(b"new".to_vec()));
    }

    #[test]
    fn invalidate_prefix_only_touches_matching_keys() {
        let cache = MemoryCache::new(Duration::from_secs(30));
        cache.set("members:query:{}", b"1".to_vec());
        cache.set("members:query:{\"maxRecords\":5}", b"2".to_vec());
        cache.set("members:get:{\"recordId\":\"rec1\"}", b"3".to_vec());
        cache.set("products:query:{}", b"4".to_vec());

        assert_eq!(cache.invalidate_prefix("members:query:"), 2);
        assert!(cache.get("members:query:{}").is_none());
        assert!(cache.get("members:get:{\"recordId\":\"rec1\"}").is_some());
        assert!(cache.get("products:query:{}").is_some());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_prefix_counts_only_its_own_removals() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(30)));
        for i in 0..50 {
            cache.set(&format!("ledger:all:{i}"), b"x".to_vec());
        }

        let writer = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for i in 0..500 {
                    cache.set(&format!("products:query:{i}"), b"y".to_vec());
                }
            })
        };
        let removed = cache.invalidate_prefix("ledger:");
        writer.join().unwrap();

        assert_eq!(removed, 50);
        assert_eq!(cache.len(), 500);
    }

    proptest! {
        #[test]
        fn put_does_not_disturb_other_keys(
            a in "[a-z]{1,8}",
            b in "[a-z]{1,8}",
            va in proptest::collection::vec(any::<u8>(), 0..16),
            vb in proptest::collection::vec(any::<u8>(), 0..16),
        ) {
            prop_assume!(a != b);
            let cache = MemoryCache::new(Duration::from_secs(30));
            cache.set(&a, va.clone());
            cache.set(&b, vb);
            prop_assert_eq!(cache.get(&a), Some(va));
        }
    }
}
