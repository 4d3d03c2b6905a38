//! Short-lived cache for reads against the spreadsheet service.
//!
//! Entries expire after a fixed TTL and are dropped lazily when read.
//! Writes invalidate by signature prefix. There is no size bound; growth is
//! limited only by the number of distinct read signatures seen within a TTL.
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 30
//! ```

mod error;
mod manager;
mod memory;
mod noop;
mod signature;
mod traits;

pub use error::CacheError;
pub use manager::CacheManager;
pub use memory::MemoryCache;
pub use noop::NoOpCache;
pub use signature::Signature;
pub use traits::AppCache;

pub use crate::config::settings::CacheConfig;
