use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::PageCache;
use crate::error::Result;
use crate::metrics::INDEX_CACHE_EVENTS;
use crate::models::FeedScope;

/// Caches rendered site-wide feed responses.
///
/// Only the first index page is cached, under one entry per request
/// signature: no `page` parameter, or `page=1`. A cached render is served
/// verbatim until its TTL runs out or [`IndexPageCache::invalidate`] runs,
/// even if newer posts exist.
#[derive(Clone)]
pub struct IndexPageCache {
    store: Arc<dyn PageCache>,
    ttl: Duration,
}

impl IndexPageCache {
    pub fn new(store: Arc<dyn PageCache>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key for a request, or `None` when it must not be cached.
    pub fn key_for(scope: &FeedScope, page_param: Option<&str>) -> Option<&'static str> {
        if *scope != FeedScope::Index {
            return None;
        }

        match page_param.map(str::trim) {
            None => Some("index:v1"),
            Some("1") => Some("index:v1:page=1"),
            Some(_) => None,
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cached = self.store.get(key).await?;
        let event = if cached.is_some() { "hit" } else { "miss" };
        INDEX_CACHE_EVENTS.with_label_values(&[event]).inc();
        debug!(key, event, "index cache lookup");
        Ok(cached)
    }

    pub async fn store(&self, key: &str, body: &[u8]) -> Result<()> {
        self.store.set(key, body, self.ttl).await?;
        INDEX_CACHE_EVENTS.with_label_values(&["store"]).inc();
        Ok(())
    }

    /// Purge every cached index render. Safe to call when nothing is cached.
    pub async fn invalidate(&self) -> Result<()> {
        let removed = self.store.clear().await?;
        INDEX_CACHE_EVENTS.with_label_values(&["clear"]).inc();
        info!(removed, "index cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, MemoryPageCache};

    #[test]
    fn test_only_first_index_page_has_a_key() {
        assert_eq!(
            IndexPageCache::key_for(&FeedScope::Index, None),
            Some("index:v1")
        );
        assert_eq!(
            IndexPageCache::key_for(&FeedScope::Index, Some("1")),
            Some("index:v1:page=1")
        );
        assert_eq!(IndexPageCache::key_for(&FeedScope::Index, Some("2")), None);
        assert_eq!(IndexPageCache::key_for(&FeedScope::Index, Some("abc")), None);
        assert_eq!(
            IndexPageCache::key_for(&FeedScope::Group("cats".into()), None),
            None
        );
        assert_eq!(
            IndexPageCache::key_for(&FeedScope::Profile("auth".into()), None),
            None
        );
        assert_eq!(IndexPageCache::key_for(&FeedScope::Following(1), None), None);
    }

    #[tokio::test]
    async fn test_render_kept_until_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = IndexPageCache::new(
            Arc::new(MemoryPageCache::new(clock.clone())),
            Duration::from_secs(20),
        );

        cache.store("index:v1", b"first").await.unwrap();
        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get("index:v1").await.unwrap(), Some(b"first".to_vec()));

        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get("index:v1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalidate_without_entries() {
        let cache = IndexPageCache::new(
            Arc::new(MemoryPageCache::default()),
            Duration::from_secs(20),
        );
        cache.invalidate().await.unwrap();
        cache.invalidate().await.unwrap();
    }
}
