//! Live-traffic overlays.
//!
//! An overlay never touches graph topology.  Weights are computed at edge
//! enumeration time, so the same `RegionGraph` serves queries under any
//! snapshot.  Snapshots are immutable; a feed update builds a new one and
//! swaps the `Arc`.

use rustc_hash::FxHashMap;

use tr_core::{FeatureId, RegionId, Segment};

/// Discretised congestion level of one directed segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeedGroup {
    G0,
    G1,
    G2,
    G3,
    G4,
    G5,
    /// Road temporarily closed.
    TempBlock,
    #[default]
    Unknown,
}

impl SpeedGroup {
    /// Fraction of the free-flow speed.  `0.0` means impassable.
    pub fn speed_fraction(self) -> f64 {
        match self {
            SpeedGroup::G0        => 0.08,
            SpeedGroup::G1        => 0.16,
            SpeedGroup::G2        => 0.33,
            SpeedGroup::G3        => 0.57,
            SpeedGroup::G4        => 0.75,
            SpeedGroup::G5        => 0.83,
            SpeedGroup::TempBlock => 0.0,
            SpeedGroup::Unknown   => 1.0,
        }
    }
}

/// Speed groups of one region, keyed by `(feature, segment index, forward)`.
#[derive(Clone, Debug, Default)]
pub struct TrafficOverlay {
    groups: FxHashMap<(FeatureId, u32, bool), SpeedGroup>,
}

impl TrafficOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, feature: FeatureId, segment_idx: u32, forward: bool, group: SpeedGroup) -> &mut Self {
        self.groups.insert((feature, segment_idx, forward), group);
        self
    }

    /// `Unknown` when the feed has nothing for `segment`.
    #[inline]
    pub fn speed_group(&self, segment: Segment) -> SpeedGroup {
        self.groups
            .get(&(segment.feature, segment.segment_idx, segment.forward))
            .copied()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// World-wide traffic state: one overlay per region with data.
#[derive(Clone, Debug, Default)]
pub struct TrafficSnapshot {
    regions: FxHashMap<RegionId, TrafficOverlay>,
}

impl TrafficSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: RegionId, overlay: TrafficOverlay) -> Self {
        self.regions.insert(region, overlay);
        self
    }

    #[inline]
    pub fn overlay(&self, region: RegionId) -> Option<&TrafficOverlay> {
        self.regions.get(&region)
    }

    pub fn covers(&self, region: RegionId) -> bool {
        self.regions.get(&region).is_some_and(|o| !o.is_empty())
    }
}
