//! Cache manager that dispatches to the configured backend.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::memory::MemoryCache;
use crate::cache::noop::NoOpCache;
use crate::cache::{AppCache, CacheConfig, CacheError, Signature};

/// Cheap to clone; all clones share one backend.
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn AppCache>,
    enabled: bool,
}

impl CacheManager {
    /// A disabled cache uses [`NoOpCache`], so every read goes upstream.
    pub fn new(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::with_backend(Arc::new(MemoryCache::new(Duration::from_secs(config.ttl_seconds))))
        } else {
            Self {
                backend: Arc::new(NoOpCache::new()),
                enabled: false,
            }
        }
    }

    pub fn with_backend(backend: Arc<dyn AppCache>) -> Self {
        Self {
            backend,
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn backend(&self) -> &Arc<dyn AppCache> {
        &self.backend
    }

    /// Cached value for `signature`; undecodable entries count as a miss and are dropped.
    pub fn get_json<T: DeserializeOwned>(&self, signature: &Signature) -> Option<T> {
        let bytes = self.backend.get(signature.as_str())?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key = %signature, error = %error, "Discarding undecodable cache entry");
                self.backend.remove(signature.as_str());
                None
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(
        &self,
        signature: &Signature,
        value: &T,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.set(signature.as_str(), bytes);
        Ok(())
    }

    pub fn invalidate(&self, signature: &Signature) -> bool {
        self.backend.remove(signature.as_str())
    }

    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let removed = self.backend.invalidate_prefix(prefix);
        tracing::debug!(prefix, removed, "Cache entries invalidated");
        removed
    }

    pub fn clear(&self) {
        self.backend.clear();
    }

    pub fn len(&self) -> usize {
        self.backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }
}
