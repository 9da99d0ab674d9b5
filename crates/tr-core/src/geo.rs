//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Coincidence decisions (joints,
//! cross-region twins, the shortcut binary format) never compare floats
//! directly; they go through [`PointCode`], a fixed-point quantisation at
//! 1e-7 degree (~1 cm) resolution.

/// A WGS-84 geographic coordinate in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Mean Earth radius, metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a.min(1.0)).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Squared Euclidean distance in lat/lon space.  Only meaningful for
    /// ranking nearby candidates, never as a length.
    #[inline]
    pub fn planar_distance_2(self, other: GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon
    }

    /// Point at fraction `t` along the straight line `self → other`.
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// Project `self` onto the segment `a → b` (planar, lat/lon space).
    pub fn project_onto(self, a: GeoPoint, b: GeoPoint) -> Projected {
        let dlat = b.lat - a.lat;
        let dlon = b.lon - a.lon;
        let len2 = dlat * dlat + dlon * dlon;
        let t = if len2 == 0.0 {
            0.0
        } else {
            (((self.lat - a.lat) * dlat + (self.lon - a.lon) * dlon) / len2).clamp(0.0, 1.0)
        };
        let point = a.lerp(b, t);
        Projected { point, t, distance_2: self.planar_distance_2(point) }
    }

    /// Quantised form used for exact coincidence tests.
    #[inline]
    pub fn code(self) -> PointCode {
        PointCode::from_point(self)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.7}, {:.7})", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        GeoPoint { lat, lon }
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Result of [`GeoPoint::project_onto`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projected {
    /// Closest point on the segment.
    pub point: GeoPoint,
    /// Position of `point` along the segment, `0.0` at `a`, `1.0` at `b`.
    pub t: f64,
    /// Squared planar distance from the projected-from point to `point`.
    pub distance_2: f64,
}

// ── PointCode ─────────────────────────────────────────────────────────────────

/// Degrees → fixed-point scale.
pub const POINT_CODE_SCALE: f64 = 1e7;

/// A coordinate quantised to 1e-7 degree integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointCode {
    pub lat: i32,
    pub lon: i32,
}

impl PointCode {
    pub fn from_point(p: GeoPoint) -> Self {
        Self {
            lat: (p.lat * POINT_CODE_SCALE).round() as i32,
            lon: (p.lon * POINT_CODE_SCALE).round() as i32,
        }
    }

    pub fn to_point(self) -> GeoPoint {
        GeoPoint {
            lat: self.lat as f64 / POINT_CODE_SCALE,
            lon: self.lon as f64 / POINT_CODE_SCALE,
        }
    }
}
