//! Region-border crossings.

use tr_core::{FeatureId, GeoPoint, PointCode, RegionId, Segment, TravelMode, VehicleMask};

/// One road segment crossing the border of a region.
///
/// Points are stored quantised; twin transitions of neighbouring regions
/// are matched on exactly these codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    pub feature: FeatureId,
    pub segment_idx: u32,
    /// Modes that may use the road.
    pub road_mask: VehicleMask,
    /// Modes for which the road is one-way (forward only).
    pub one_way_mask: VehicleMask,
    /// Driving the segment forward enters the region.
    pub forward_is_enter: bool,
    pub back_point: PointCode,
    pub front_point: PointCode,
}

impl Transition {
    /// A two-way transition open to every mode.
    pub fn new(feature: FeatureId, segment_idx: u32, back: GeoPoint, front: GeoPoint, forward_is_enter: bool) -> Self {
        Self {
            feature,
            segment_idx,
            road_mask: TravelMode::ALL_MASK,
            one_way_mask: 0,
            forward_is_enter,
            back_point: back.code(),
            front_point: front.code(),
        }
    }

    pub fn with_road_mask(mut self, mask: VehicleMask) -> Self {
        self.road_mask = mask;
        self
    }

    pub fn with_one_way_mask(mut self, mask: VehicleMask) -> Self {
        self.one_way_mask = mask;
        self
    }

    #[inline]
    pub fn is_road(&self, mode: TravelMode) -> bool {
        self.road_mask & mode.mask() != 0
    }

    #[inline]
    pub fn is_one_way(&self, mode: TravelMode) -> bool {
        self.one_way_mask & mode.mask() != 0
    }

    #[inline]
    pub fn segment(&self, region: RegionId, forward: bool) -> Segment {
        Segment::new(region, self.feature, self.segment_idx, forward)
    }

    /// `(back, front)` codes of the segment driven in direction `forward`.
    #[inline]
    pub fn codes(&self, forward: bool) -> (PointCode, PointCode) {
        if forward {
            (self.back_point, self.front_point)
        } else {
            (self.front_point, self.back_point)
        }
    }
}
