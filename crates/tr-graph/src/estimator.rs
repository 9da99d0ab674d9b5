//! Edge cost estimator.
//!
//! # Cost model
//!
//! Entering segment `v` costs the time to drive it:
//!
//! ```text
//! weight(v) = haversine(back(v), front(v)) / (min(road speed, mode max) * traffic fraction)
//! ```
//!
//! An edge `u → v` costs `weight(v)`, plus the u-turn penalty when `v` is the
//! reverse of `u`.  Pass-through changes are counted by the graph, not here.

use tr_core::{GeoPoint, RouterConfig, Segment, TravelMode};
use tr_geometry::RoadGeometry;

use crate::{SpeedGroup, TrafficOverlay};

const KMPH_TO_MPS: f64 = 1.0 / 3.6;

/// Pure function from segments (and an optional overlay) to seconds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeEstimator {
    mode: TravelMode,
    uturn_penalty_secs: f64,
    offroad_speed_kmph: f64,
}

impl EdgeEstimator {
    pub fn new(mode: TravelMode, config: &RouterConfig) -> Self {
        Self {
            mode,
            uturn_penalty_secs: config.uturn_penalty_for(mode),
            offroad_speed_kmph: config.offroad_speed_kmph.min(mode.max_speed_kmph()),
        }
    }

    #[inline]
    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    #[inline]
    pub fn uturn_penalty(&self) -> f64 {
        self.uturn_penalty_secs
    }

    /// Free-flow speed on `road` in m/s, capped by the mode.
    #[inline]
    pub fn speed_mps(&self, road: &RoadGeometry) -> f64 {
        road.speed_kmph.min(self.mode.max_speed_kmph()) * KMPH_TO_MPS
    }

    /// Seconds to drive the whole of `segment`.  `INFINITY` when traffic
    /// blocks it.
    pub fn segment_weight(&self, road: &RoadGeometry, segment: Segment, traffic: Option<&TrafficOverlay>) -> f64 {
        let back = road.point(segment.back_point_idx());
        let front = road.point(segment.front_point_idx());
        self.leg_weight(road, segment, back.distance_m(front), traffic)
    }

    /// Seconds to drive from `from` to `to`, both lying on `segment`.
    pub fn partial_weight(
        &self,
        road: &RoadGeometry,
        segment: Segment,
        from: GeoPoint,
        to: GeoPoint,
        traffic: Option<&TrafficOverlay>,
    ) -> f64 {
        self.leg_weight(road, segment, from.distance_m(to), traffic)
    }

    /// Seconds to walk between a query point and the road.
    #[inline]
    pub fn offroad_weight(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        a.distance_m(b) / (self.offroad_speed_kmph * KMPH_TO_MPS)
    }

    /// Lower bound on the seconds between two points.
    #[inline]
    pub fn heuristic(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        a.distance_m(b) / (self.mode.max_speed_kmph() * KMPH_TO_MPS)
    }

    fn leg_weight(&self, road: &RoadGeometry, segment: Segment, length_m: f64, traffic: Option<&TrafficOverlay>) -> f64 {
        if length_m == 0.0 {
            return 0.0;
        }
        let fraction = traffic
            .map_or(SpeedGroup::Unknown, |t| t.speed_group(segment))
            .speed_fraction();
        if fraction <= 0.0 {
            return f64::INFINITY;
        }
        length_m / (self.speed_mps(road) * fraction)
    }
}
