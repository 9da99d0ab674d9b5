//! Directed road segments: the vertices of the search graph.

use std::fmt;

use crate::{FeatureId, RegionId};

/// One directed traversal of the sub-edge `segment_idx → segment_idx + 1` of
/// a road feature.
///
/// `forward == true` walks from point `segment_idx` to `segment_idx + 1`;
/// `forward == false` walks the same physical edge the other way.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub region: RegionId,
    pub feature: FeatureId,
    pub segment_idx: u32,
    pub forward: bool,
}

impl Segment {
    #[inline]
    pub fn new(region: RegionId, feature: FeatureId, segment_idx: u32, forward: bool) -> Self {
        Self { region, feature, segment_idx, forward }
    }

    /// The opposite-direction segment of the same physical edge.
    #[inline]
    pub fn reversed(self) -> Self {
        Self { forward: !self.forward, ..self }
    }

    /// Index of the polyline point this segment starts at.
    #[inline]
    pub fn back_point_idx(self) -> u32 {
        if self.forward { self.segment_idx } else { self.segment_idx + 1 }
    }

    /// Index of the polyline point this segment ends at.
    #[inline]
    pub fn front_point_idx(self) -> u32 {
        if self.forward { self.segment_idx + 1 } else { self.segment_idx }
    }

    #[inline]
    pub fn back(self) -> RoadPoint {
        RoadPoint::new(self.feature, self.back_point_idx())
    }

    #[inline]
    pub fn front(self) -> RoadPoint {
        RoadPoint::new(self.feature, self.front_point_idx())
    }

    /// `true` when both segments lie on the same physical edge.
    #[inline]
    pub fn same_edge(self, other: Segment) -> bool {
        self.region == other.region
            && self.feature == other.feature
            && self.segment_idx == other.segment_idx
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}#{}{}",
            self.region.0,
            self.feature.0,
            self.segment_idx,
            if self.forward { '+' } else { '-' }
        )
    }
}

/// One polyline point of one feature.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadPoint {
    pub feature: FeatureId,
    pub point_idx: u32,
}

impl RoadPoint {
    #[inline]
    pub fn new(feature: FeatureId, point_idx: u32) -> Self {
        Self { feature, point_idx }
    }
}
