//! The graph abstraction searched by this crate.

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Add, Sub};

/// Additive, totally ordered (in practice) edge weight.
///
/// `PartialOrd` rather than `Ord` so `f64` qualifies; the search never
/// produces NaN from finite inputs.
pub trait Weight: Copy + PartialOrd + Debug + Add<Output = Self> + Sub<Output = Self> {
    fn zero() -> Self;

    /// `self / 2`; used to average forward and backward potentials.
    fn half(self) -> Self;

    /// Rounds tiny negative reduced weights (float noise from potentials)
    /// back to zero.
    fn clamp_non_negative(self) -> Self {
        if self < Self::zero() { Self::zero() } else { self }
    }
}

impl Weight for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn half(self) -> Self {
        self * 0.5
    }
}

/// One adjacency entry: the neighbour and the weight of the connecting edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge<V, W> {
    pub target: V,
    pub weight: W,
}

impl<V, W> Edge<V, W> {
    #[inline]
    pub fn new(target: V, weight: W) -> Self {
        Self { target, weight }
    }
}

/// A directed, weighted graph enumerated on demand.
///
/// `edges(v, true, ..)` yields `v → target` edges; `edges(v, false, ..)`
/// yields `target → v` edges with the weight of that edge.  Implementations
/// append to `out` and never clear it.
///
/// Enumeration may fail (a lazily loaded region may be unreadable); such
/// errors abort the search and surface to the caller.
pub trait Graph {
    type Vertex: Copy + Eq + Hash + Debug;
    type Weight: Weight;
    type Error;

    fn edges(
        &self,
        v: &Self::Vertex,
        outgoing: bool,
        out: &mut Vec<Edge<Self::Vertex, Self::Weight>>,
    ) -> Result<(), Self::Error>;

    /// Lower bound on the weight of any path `from → to`.  Must be
    /// consistent (`h(u) <= w(u, v) + h(v)`) and symmetric.  Defaults to
    /// zero, which turns A* into Dijkstra.
    fn heuristic(&self, _from: &Self::Vertex, _to: &Self::Vertex) -> Self::Weight {
        Self::Weight::zero()
    }
}
