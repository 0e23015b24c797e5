/// Rendered page caching
///
/// This module provides:
/// - `PageCache`: expiring key-value store for rendered responses
/// - `RedisPageCache`: Redis-backed store used in production
/// - `MemoryPageCache`: process-local store driven by an injected `Clock`
/// - `IndexPageCache`: the policy deciding which index requests are cached
pub mod index_cache;
pub mod memory_store;
pub mod redis_store;

pub use index_cache::IndexPageCache;
pub use memory_store::{Clock, ManualClock, MemoryPageCache, SystemClock};
pub use redis_store::RedisPageCache;

use crate::error::Result;
use std::time::Duration;

/// Expiring key-value store for rendered pages.
///
/// Reads may run concurrently with each other and with `clear`.
#[async_trait::async_trait]
pub trait PageCache: Send + Sync {
    /// Fresh value for `key`, if any
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key` for `ttl`
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Drop every entry; returns how many were removed
    async fn clear(&self) -> Result<usize>;
}
