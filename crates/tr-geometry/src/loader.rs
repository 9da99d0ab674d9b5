//! The geometry-loading capability.

use std::collections::BTreeMap;

use tr_core::FeatureId;

use crate::{GeometryError, GeometryResult, RoadGeometry};

/// Source of raw road geometry for one region.
///
/// Implementations are synchronous, side-effect-free lookups.  They must be
/// `Send + Sync` because regions are loaded from whichever query thread
/// touches them first.
pub trait GeometryLoader: Send + Sync {
    /// Every feature id the region contains, in ascending order.
    fn feature_ids(&self) -> Vec<FeatureId>;

    /// Read one road.  Unknown ids fail with [`GeometryError::FeatureNotFound`].
    fn load(&self, feature: FeatureId) -> GeometryResult<RoadGeometry>;
}

/// Loader over an in-memory table of roads.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLoader {
    roads: BTreeMap<FeatureId, RoadGeometry>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `feature`.
    pub fn add_road(&mut self, feature: FeatureId, road: RoadGeometry) -> &mut Self {
        self.roads.insert(feature, road);
        self
    }

    pub fn contains(&self, feature: FeatureId) -> bool {
        self.roads.contains_key(&feature)
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }
}

impl GeometryLoader for InMemoryLoader {
    fn feature_ids(&self) -> Vec<FeatureId> {
        self.roads.keys().copied().collect()
    }

    fn load(&self, feature: FeatureId) -> GeometryResult<RoadGeometry> {
        self.roads
            .get(&feature)
            .cloned()
            .ok_or(GeometryError::FeatureNotFound(feature))
    }
}

impl FromIterator<(FeatureId, RoadGeometry)> for InMemoryLoader {
    fn from_iter<I: IntoIterator<Item = (FeatureId, RoadGeometry)>>(iter: I) -> Self {
        Self { roads: iter.into_iter().collect() }
    }
}
