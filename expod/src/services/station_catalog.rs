//! Station Catalog - in-memory kitchen station lookup
//!
//! The order engine never mutates stations; the menu management layer feeds
//! this cache and the engine only resolves slugs carried on transition
//! commands. An unknown or inactive slug resolves to `None`, which the
//! engine treats as an unscoped transition rather than an error, so a
//! station tablet with a stale slug degrades instead of failing.

use parking_lot::RwLock;
use shared::models::KitchenStation;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory station cache keyed by slug
#[derive(Clone, Default)]
pub struct StationCatalog {
    /// Stations cache: "grill" -> KitchenStation
    stations: Arc<RwLock<HashMap<String, KitchenStation>>>,
}

impl std::fmt::Debug for StationCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let station_count = self.stations.read().len();
        f.debug_struct("StationCatalog")
            .field("station_count", &station_count)
            .finish()
    }
}

impl StationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache, used at warmup and after bulk menu edits.
    pub fn load(&self, stations: Vec<KitchenStation>) {
        let mut cache = self.stations.write();
        cache.clear();
        for station in stations {
            cache.insert(station.slug.clone(), station);
        }
    }

    pub fn upsert(&self, station: KitchenStation) {
        self.stations.write().insert(station.slug.clone(), station);
    }

    pub fn remove(&self, slug: &str) -> Option<KitchenStation> {
        self.stations.write().remove(slug)
    }

    /// Resolve a slug to a station ID. Inactive stations resolve to `None`
    /// so their tablets stop scoping transitions the moment they are
    /// switched off.
    pub fn resolve(&self, slug: &str) -> Option<i64> {
        self.stations
            .read()
            .get(slug)
            .filter(|s| s.is_active)
            .map(|s| s.id)
    }

    pub fn get(&self, slug: &str) -> Option<KitchenStation> {
        self.stations.read().get(slug).cloned()
    }

    pub fn len(&self) -> usize {
        self.stations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.read().is_empty()
    }
}
