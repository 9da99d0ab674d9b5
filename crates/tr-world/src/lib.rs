//! `tr-world` — routing across every region at once.
//!
//! A [`WorldGraph`] owns the [`RegionCache`] and answers "what is next to
//! this segment" for any region: region graphs are loaded on first touch,
//! regions a query only passes through are crossed with precomputed
//! shortcut weights, and border segments are stitched to their twins in
//! the neighbouring region.  [`Router::find_route`] snaps the query points,
//! blends them into a [`QueryGraph`] and runs the bidirectional search.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`source`]  | `RegionSource`, `InMemorySource`, `DirectorySource`       |
//! | [`locator`] | `RegionLocator`, `BoxLocator`                             |
//! | [`cache`]   | `RegionCache` (at-most-once region loads)                 |
//! | [`world`]   | `WorldGraph`, twin matching                               |
//! | [`ending`]  | `FakeEnding`, `Projection`, endpoint snapping             |
//! | [`query`]   | `QueryVertex`, `QueryGraph`                               |
//! | [`router`]  | `Router`, `Route`, `RouteOutcome`                         |
//! | [`error`]   | `WorldError`, `WorldResult<T>`                            |

pub mod cache;
pub mod ending;
pub mod error;
pub mod locator;
pub mod query;
pub mod router;
pub mod source;
pub mod world;

#[cfg(test)]
mod tests;

pub use cache::RegionCache;
pub use ending::{FakeEnding, Projection, make_fake_ending, make_fake_ending_for_segment};
pub use error::{WorldError, WorldResult};
pub use locator::{BoxLocator, RegionLocator};
pub use query::{QueryGraph, QueryVertex};
pub use router::{Route, RouteOutcome, Router};
pub use source::{DirectorySource, InMemorySource, RegionSource};
pub use world::WorldGraph;
