use crate::cache::{CacheStats, TravelCache};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// In-memory cache backed by moka with TTL and bounded capacity.
/// All methods are `&self` — no locking needed.
pub struct MemoryTravelCache {
    legs: Cache<String, u32>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryTravelCache {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let legs = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        MemoryTravelCache {
            legs,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl TravelCache for MemoryTravelCache {
    async fn get_minutes(&self, key: &str) -> Option<u32> {
        match self.legs.get(key).await {
            Some(minutes) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Travel cache hit: {}", key);
                Some(minutes)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Travel cache miss: {}", key);
                None
            }
        }
    }

    async fn put_minutes(&self, key: &str, minutes: u32) {
        self.legs.insert(key.to_string(), minutes).await;
    }

    async fn get_stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            entries: self.legs.entry_count(),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_miss() {
        let cache = MemoryTravelCache::new(3600, 100);
        assert!(cache.get_minutes("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn stores_and_returns_minutes() {
        let cache = MemoryTravelCache::new(3600, 100);
        cache.put_minutes("leg", 17).await;
        assert_eq!(cache.get_minutes("leg").await, Some(17));
    }

    #[tokio::test]
    async fn stats_tracking() {
        let cache = MemoryTravelCache::new(3600, 100);
        cache.put_minutes("leg", 9).await;

        // 1 miss
        cache.get_minutes("missing").await;
        // 2 hits
        cache.get_minutes("leg").await;
        cache.get_minutes("leg").await;

        let stats = cache.get_stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 66.666).abs() < 1.0);
    }

    #[tokio::test]
    async fn backend_name_is_memory() {
        let cache = MemoryTravelCache::new(3600, 100);
        assert_eq!(cache.backend_name(), "memory");
    }

    #[tokio::test]
    async fn ttl_expiry() {
        let cache = MemoryTravelCache::new(1, 100); // 1 second TTL
        cache.put_minutes("leg", 12).await;

        assert!(cache.get_minutes("leg").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get_minutes("leg").await.is_none());
    }
}
