//! Immutable per-feature road data.

use tr_core::{FeatureId, GeoPoint, TravelMode, VehicleMask};

use crate::{GeometryError, GeometryResult};

/// Polyline and attributes of one road feature.
///
/// Point `i` and point `i + 1` bound segment `i`, so a road with `n` points
/// has `n - 1` segments.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadGeometry {
    pub points: Vec<GeoPoint>,
    /// Nominal speed in km/h before the travel-mode cap.
    pub speed_kmph: f64,
    /// Only the forward direction (increasing point index) may be driven.
    pub one_way: bool,
    /// `false` for roads inside a zone that should not serve as a corridor.
    pub pass_through_allowed: bool,
    /// Travel modes allowed on this road.
    pub modes: VehicleMask,
}

impl RoadGeometry {
    /// A two-way, pass-through road open to every mode.
    pub fn new(feature: FeatureId, points: Vec<GeoPoint>, speed_kmph: f64) -> GeometryResult<Self> {
        if points.len() < 2 {
            return Err(GeometryError::InvalidRoad {
                feature,
                reason: format!("needs at least 2 points, got {}", points.len()),
            });
        }
        if !(speed_kmph > 0.0) {
            return Err(GeometryError::InvalidRoad {
                feature,
                reason: format!("speed must be positive, got {speed_kmph}"),
            });
        }
        Ok(Self {
            points,
            speed_kmph,
            one_way: false,
            pass_through_allowed: true,
            modes: TravelMode::ALL_MASK,
        })
    }

    pub fn with_one_way(mut self, one_way: bool) -> Self {
        self.one_way = one_way;
        self
    }

    pub fn with_pass_through(mut self, allowed: bool) -> Self {
        self.pass_through_allowed = allowed;
        self
    }

    pub fn with_modes(mut self, modes: VehicleMask) -> Self {
        self.modes = modes;
        self
    }

    #[inline]
    pub fn point(&self, idx: u32) -> GeoPoint {
        self.points[idx as usize]
    }

    #[inline]
    pub fn point_count(&self) -> u32 {
        self.points.len() as u32
    }

    #[inline]
    pub fn segment_count(&self) -> u32 {
        self.point_count() - 1
    }

    #[inline]
    pub fn allows(&self, mode: TravelMode) -> bool {
        self.modes & mode.mask() != 0
    }

    /// Index of the last polyline point.
    #[inline]
    pub fn last_point_idx(&self) -> u32 {
        self.point_count() - 1
    }

    /// Great-circle length of the whole polyline in metres.
    pub fn length_m(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
    }
}
