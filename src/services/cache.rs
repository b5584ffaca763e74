use crate::models::{Coordinate, ShopRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// In-process cache for catalog search results
///
/// Nearby searches from the same neighbourhood within the TTL reuse the
/// upstream answer instead of hitting the catalog again.
pub struct ShopCache {
    entries: moka::future::Cache<String, Arc<Vec<ShopRecord>>>,
}

impl ShopCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { entries }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Vec<ShopRecord>>> {
        let hit = self.entries.get(key).await;
        if hit.is_some() {
            tracing::trace!("Cache hit: {}", key);
        } else {
            tracing::trace!("Cache miss: {}", key);
        }
        hit
    }

    pub async fn insert(&self, key: String, shops: Vec<ShopRecord>) -> Arc<Vec<ShopRecord>> {
        let shops = Arc::new(shops);
        self.entries.insert(key.clone(), Arc::clone(&shops)).await;
        tracing::trace!("Cache set: {}", key);
        shops
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Flush pending maintenance so counts are exact
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for a nearby search; the origin is rounded to roughly 100m
    pub fn nearby(food_type: &str, origin: Coordinate, radius_km: f64) -> String {
        format!(
            "nearby:{}:{:.3}:{:.3}:{:.2}",
            food_type,
            origin.latitude,
            origin.longitude,
            radius_km
        )
    }
}
