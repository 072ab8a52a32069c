use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cached value with the instant it was stored
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Keyed cache with a fixed time-to-live.
///
/// Reads through [`RequestCache::get`] only return entries younger than the
/// TTL. Entries are never evicted; [`RequestCache::get_stale`] exposes them
/// regardless of age so callers can fall back to old data when the backend
/// is unavailable or the rate limiter says no.
pub struct RequestCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> RequestCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh read: `None` when missing or older than the TTL
    pub async fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now()).await
    }

    async fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.stored_at) < self.ttl {
            tracing::debug!("Cache hit for {}", key);
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Read regardless of age
    pub async fn get_stale(&self, key: &str) -> Option<V> {
        self.entries
            .read()
            .await
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Store `value`, replacing any previous entry and its timestamp
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_at(key.into(), value, Instant::now()).await;
    }

    async fn insert_at(&self, key: String, value: V, now: Instant) {
        tracing::debug!("Cached {}", key);
        self.entries.write().await.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_entry_is_returned_until_ttl() {
        let cache = RequestCache::new(Duration::from_secs(30));
        let t0 = Instant::now();
        cache.insert_at("invoices:1".to_string(), vec![1, 2], t0).await;

        assert_eq!(
            cache.get_at("invoices:1", t0 + Duration::from_secs(29)).await,
            Some(vec![1, 2])
        );
        assert_eq!(
            cache.get_at("invoices:1", t0 + Duration::from_secs(30)).await,
            None
        );
    }

    #[tokio::test]
    async fn test_stale_entry_still_available_for_fallback() {
        let cache = RequestCache::new(Duration::from_millis(1));
        let t0 = Instant::now();
        cache.insert_at("k".to_string(), "old", t0).await;

        assert!(cache.get_at("k", t0 + Duration::from_secs(5)).await.is_none());
        assert_eq!(cache.get_stale("k").await, Some("old"));
    }

    #[tokio::test]
    async fn test_insert_overwrites_value_and_timestamp() {
        let cache = RequestCache::new(Duration::from_secs(30));
        let t0 = Instant::now();
        cache.insert_at("k".to_string(), 1, t0).await;
        cache
            .insert_at("k".to_string(), 2, t0 + Duration::from_secs(40))
            .await;

        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(50)).await, Some(2));
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = RequestCache::new(Duration::from_secs(30));
        cache.insert("k", 1).await;
        cache.invalidate("k").await;

        assert!(cache.get("k").await.is_none());
        assert!(cache.get_stale("k").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_a_miss() {
        let cache: RequestCache<u8> = RequestCache::new(Duration::from_secs(30));
        assert!(cache.get("nope").await.is_none());
    }
}
