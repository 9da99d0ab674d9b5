//! Per-region geometry cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use tr_core::{FeatureId, RegionId};

use crate::{GeometryLoader, GeometryResult, RoadGeometry};

/// Caching front of a [`GeometryLoader`].
///
/// The first `load` of a feature reads it from the backing loader; every
/// later call returns the same `Arc`.  Entries are kept for the lifetime of
/// the store.
pub struct GeometryStore {
    region: RegionId,
    loader: Arc<dyn GeometryLoader>,
    cache:  RwLock<FxHashMap<FeatureId, Arc<RoadGeometry>>>,
    loads:  AtomicUsize,
}

impl GeometryStore {
    pub fn new(region: RegionId, loader: Arc<dyn GeometryLoader>) -> Self {
        Self {
            region,
            loader,
            cache: RwLock::new(FxHashMap::default()),
            loads: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn feature_ids(&self) -> Vec<FeatureId> {
        self.loader.feature_ids()
    }

    /// Cached road for `feature`.
    pub fn load(&self, feature: FeatureId) -> GeometryResult<Arc<RoadGeometry>> {
        if let Some(road) = self.cache.read().get(&feature) {
            return Ok(Arc::clone(road));
        }

        let mut cache = self.cache.write();
        // Another thread may have filled the slot between the two locks.
        if let Some(road) = cache.get(&feature) {
            return Ok(Arc::clone(road));
        }
        let road = Arc::new(self.loader.load(feature)?);
        let loads = self.loads.fetch_add(1, Ordering::Relaxed);
        if loads == 0 {
            log::debug!("region {}: first road read from the backing loader", self.region);
        }
        log::trace!("region {}: loaded road {feature} ({} points)", self.region, road.points.len());
        cache.insert(feature, Arc::clone(&road));
        Ok(road)
    }

    /// Number of reads that reached the backing loader.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.read().len()
    }
}
