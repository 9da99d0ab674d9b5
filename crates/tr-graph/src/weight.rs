//! The route weight used by every road graph.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use tr_search::Weight;

/// Travel time plus the number of switches between pass-through and
/// no-pass-through roads.
///
/// Ordering is lexicographic: fewer switches always win, travel time breaks
/// ties.  A route therefore only cuts through a no-pass-through zone when
/// nothing avoiding it exists.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteWeight {
    /// Seconds.
    pub weight: f64,
    pub pass_through_changes: i32,
}

impl RouteWeight {
    pub const ZERO: RouteWeight = RouteWeight { weight: 0.0, pass_through_changes: 0 };

    #[inline]
    pub fn new(weight: f64, pass_through_changes: i32) -> Self {
        Self { weight, pass_through_changes }
    }

    #[inline]
    pub fn from_secs(weight: f64) -> Self {
        Self { weight, pass_through_changes: 0 }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.weight.is_finite()
    }
}

impl PartialOrd for RouteWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.pass_through_changes.cmp(&other.pass_through_changes) {
            Ordering::Equal => self.weight.partial_cmp(&other.weight),
            ord => Some(ord),
        }
    }
}

impl Add for RouteWeight {
    type Output = RouteWeight;
    #[inline]
    fn add(self, rhs: RouteWeight) -> RouteWeight {
        RouteWeight {
            weight: self.weight + rhs.weight,
            pass_through_changes: self.pass_through_changes + rhs.pass_through_changes,
        }
    }
}

impl Sub for RouteWeight {
    type Output = RouteWeight;
    #[inline]
    fn sub(self, rhs: RouteWeight) -> RouteWeight {
        RouteWeight {
            weight: self.weight - rhs.weight,
            pass_through_changes: self.pass_through_changes - rhs.pass_through_changes,
        }
    }
}

impl Weight for RouteWeight {
    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    fn half(self) -> Self {
        RouteWeight {
            weight: self.weight * 0.5,
            pass_through_changes: self.pass_through_changes / 2,
        }
    }

    #[inline]
    fn clamp_non_negative(self) -> Self {
        RouteWeight {
            weight: self.weight.max(0.0),
            pass_through_changes: self.pass_through_changes.max(0),
        }
    }
}

impl fmt::Display for RouteWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}s/{}", self.weight, self.pass_through_changes)
    }
}
