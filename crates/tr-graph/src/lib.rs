//! `tr-graph` — the restriction-aware road graph of one region.
//!
//! # Crate layout
//!
//! | Module          | Contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | [`weight`]      | `RouteWeight` (seconds + pass-through changes)         |
//! | [`traffic`]     | `SpeedGroup`, `TrafficOverlay`, `TrafficSnapshot`      |
//! | [`estimator`]   | `EdgeEstimator`                                        |
//! | [`joints`]      | `Joint`, `Joints`                                      |
//! | [`restriction`] | restriction records and the restriction compiler       |
//! | [`region`]      | `RegionGraph`, `Vertex`, `RegionView`                  |
//! | [`error`]       | `GraphError`, `GraphResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on restriction records,  |
//! |         | `RouteWeight` and `SpeedGroup`.                            |

pub mod error;
pub mod estimator;
pub mod joints;
pub mod region;
pub mod restriction;
pub mod traffic;
pub mod weight;

#[cfg(test)]
mod tests;

pub use error::{GraphError, GraphResult};
pub use estimator::EdgeEstimator;
pub use joints::{Joint, Joints, RoadTable};
pub use region::{NearSegment, RegionGraph, RegionView, Vertex, VertexKey};
pub use restriction::{Restriction, RestrictionKind, RestrictionSet, RestrictionUTurn};
pub use traffic::{SpeedGroup, TrafficOverlay, TrafficSnapshot};
pub use weight::RouteWeight;
