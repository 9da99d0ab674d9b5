//! Travel modes and per-mode bit masks.
//!
//! Road access and the cross-region shortcut format store "which modes may
//! use this" as a [`VehicleMask`] with one bit per [`TravelMode`].

/// One bit per [`TravelMode`], bit `i` = `TravelMode::ALL[i]`.
pub type VehicleMask = u8;

/// The vehicle a route is computed for.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TravelMode {
    Pedestrian,
    Bicycle,
    #[default]
    Car,
}

impl TravelMode {
    /// Number of modes; also the bit width of a [`VehicleMask`] on disk.
    pub const COUNT: usize = 3;

    pub const ALL: [TravelMode; Self::COUNT] =
        [TravelMode::Pedestrian, TravelMode::Bicycle, TravelMode::Car];

    /// Mask with every mode bit set.
    pub const ALL_MASK: VehicleMask = (1 << Self::COUNT) - 1;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn mask(self) -> VehicleMask {
        1 << self.index()
    }

    /// Wire code used in shortcut section headers.
    #[inline]
    pub fn code(self) -> u8 {
        self.index() as u8
    }

    pub fn from_code(code: u8) -> Option<TravelMode> {
        Self::ALL.get(code as usize).copied()
    }

    /// Upper speed bound.  Road speeds are capped at this value and the
    /// search heuristic divides straight-line distance by it.
    pub fn max_speed_kmph(self) -> f64 {
        match self {
            TravelMode::Pedestrian => 5.0,
            TravelMode::Bicycle    => 25.0,
            TravelMode::Car        => 130.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Pedestrian => "pedestrian",
            TravelMode::Bicycle    => "bicycle",
            TravelMode::Car        => "car",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TravelMode {
    type Err = crate::TrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::TrError::Parse(format!("unknown travel mode {s:?}")))
    }
}
