use moka::future::Cache;
use tokio::time::{Duration, Instant};

/// A cached upstream response and the moment it was stored.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Per-source response store.
///
/// Built without capacity or time-to-live so moka never drops entries on its
/// own: a stale entry stays until the next successful fetch overwrites it.
/// Freshness is decided by the caller against the source TTL.
#[derive(Clone)]
pub struct CacheStore<V> {
    entries: Cache<String, CacheEntry<V>>,
}

impl<V> CacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<CacheEntry<V>> {
        self.entries.get(key).await
    }

    pub async fn put(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        self.entries.insert(key.into(), entry).await;
    }

    #[cfg(test)]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

impl<V> Default for CacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
