pub mod memory;

pub use memory::MemoryTravelCache;

use crate::constants::TRAVEL_CACHE_COORD_PRECISION;
use crate::models::{Coordinates, TravelMode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Storage for live travel estimates (minutes), keyed by leg
#[async_trait]
pub trait TravelCache: Send + Sync {
    async fn get_minutes(&self, key: &str) -> Option<u32>;
    async fn put_minutes(&self, key: &str, minutes: u32);
    async fn get_stats(&self) -> CacheStats;
    fn backend_name(&self) -> &'static str;
}

/// Cache key for a one-way leg.
/// Coordinates are bucketed to 4 decimal places (~11m) so repeated requests
/// for the same venue/hotel pair hit even with jittery geocodes.
pub fn travel_cache_key(from: &Coordinates, to: &Coordinates, mode: TravelMode) -> String {
    let mut hasher = DefaultHasher::new();

    let scale = 10_f64.powi(TRAVEL_CACHE_COORD_PRECISION as i32);
    for c in [from, to] {
        ((c.lat * scale).round() as i64).hash(&mut hasher);
        ((c.lng * scale).round() as i64).hash(&mut hasher);
    }

    format!("travel:{}:{:x}", mode.mapbox_profile(), hasher.finish())
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entries: u64,
}
