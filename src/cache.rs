//! Series Cache
//!
//! Bounded-lifetime cache for loaded series, keyed by asset id. Entries are
//! immutable once inserted and expire purely by age; there is no explicit
//! invalidation. Kept separate from the loader so TTL behavior can be tested
//! on its own.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::models::PriceSeries;

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

pub struct SeriesCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Arc<PriceSeries>, Instant)>>,
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch a live entry. Stale entries are evicted on the way out.
    pub fn get(&self, asset_id: &str) -> Option<Arc<PriceSeries>> {
        {
            let entries = self.entries.read();
            if let Some((series, inserted_at)) = entries.get(asset_id) {
                if inserted_at.elapsed() < self.ttl {
                    return Some(Arc::clone(series));
                }
            } else {
                return None;
            }
        }
        // Entry exists but is stale.
        self.entries.write().remove(asset_id);
        None
    }

    /// Insert a freshly loaded series and hand back the shared handle.
    pub fn insert(&self, asset_id: &str, series: PriceSeries) -> Arc<PriceSeries> {
        let shared = Arc::new(series);
        self.entries
            .write()
            .insert(asset_id.to_string(), (Arc::clone(&shared), Instant::now()));
        shared
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::NaiveDate;

    fn series() -> PriceSeries {
        PriceSeries::new(vec![PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            price: 100.0,
            ret: 0.0,
            vol: 0.0,
        }])
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = SeriesCache::new(Duration::from_secs(60));
        cache.insert("bitcoin", series());
        let hit = cache.get("bitcoin").expect("entry should be live");
        assert_eq!(hit.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = SeriesCache::new(Duration::from_secs(60));
        assert!(cache.get("ethereum").is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = SeriesCache::new(Duration::ZERO);
        cache.insert("bitcoin", series());
        assert!(cache.get("bitcoin").is_none());
        assert!(cache.is_empty(), "stale entry should have been removed");
    }

    #[test]
    fn test_entries_are_shared_not_cloned() {
        let cache = SeriesCache::new(Duration::from_secs(60));
        let inserted = cache.insert("bitcoin", series());
        let fetched = cache.get("bitcoin").unwrap();
        assert!(Arc::ptr_eq(&inserted, &fetched));
    }
}
