//! Router configuration.
//!
//! Every tunable of the routing engine lives in [`RouterConfig`].  The
//! application typically loads it from a JSON file (feature `serde`) and
//! hands it to the world graph at construction time.

use crate::{TrError, TrResult, TravelMode};

/// Top-level router configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterConfig {
    /// Search expansions between two polls of the cancellation flag.
    pub cancel_poll_interval: u32,

    /// Extra seconds charged for an immediate reversal onto the same edge.
    /// Applies to cars only; pedestrians and bicycles turn around for free.
    pub uturn_penalty_secs: f64,

    /// How many times a route may switch between pass-through and
    /// no-pass-through roads.  Each endpoint lying on a no-pass-through road
    /// adds one more allowed change.
    pub pass_through_changes_allowed: i32,

    /// Query points farther than this from every road fail to snap.
    pub snap_radius_m: f64,

    /// Maximum number of nearby physical segments considered per endpoint.
    pub snap_candidates: usize,

    /// Speed used for the leg between a query point and its projection.
    pub offroad_speed_kmph: f64,

    /// Traverse non-endpoint regions through precomputed shortcut weights.
    pub use_shortcuts: bool,

    /// Replace shortcut leaps with real geometry in the returned route.
    pub unpack_shortcuts: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cancel_poll_interval: 128,
            uturn_penalty_secs: 20.0,
            pass_through_changes_allowed: 2,
            snap_radius_m: 2_000.0,
            snap_candidates: 4,
            offroad_speed_kmph: 5.0,
            use_shortcuts: true,
            unpack_shortcuts: true,
        }
    }
}

impl RouterConfig {
    /// U-turn penalty applicable to `mode`.
    #[inline]
    pub fn uturn_penalty_for(&self, mode: TravelMode) -> f64 {
        match mode {
            TravelMode::Car => self.uturn_penalty_secs,
            TravelMode::Pedestrian | TravelMode::Bicycle => 0.0,
        }
    }

    pub fn validate(&self) -> TrResult<()> {
        if self.cancel_poll_interval == 0 {
            return Err(TrError::Config("cancel_poll_interval must be > 0".into()));
        }
        if !(self.offroad_speed_kmph > 0.0) {
            return Err(TrError::Config("offroad_speed_kmph must be positive".into()));
        }
        if !(self.uturn_penalty_secs >= 0.0) {
            return Err(TrError::Config("uturn_penalty_secs must be non-negative".into()));
        }
        if self.pass_through_changes_allowed < 0 {
            return Err(TrError::Config("pass_through_changes_allowed must be >= 0".into()));
        }
        if self.snap_candidates == 0 || !(self.snap_radius_m > 0.0) {
            return Err(TrError::Config("snapping needs a positive radius and candidate count".into()));
        }
        Ok(())
    }
}
