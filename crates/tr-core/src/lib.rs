//! `tr-core` — foundational types for the `tr` region-partitioned router.
//!
//! This crate is a dependency of every other `tr-*` crate.  It has no `tr-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`ids`]       | `RegionId`, `FeatureId`, `VertexId`, `JointId`           |
//! | [`geo`]       | `GeoPoint`, `PointCode`, haversine, segment projection   |
//! | [`segment`]   | `Segment`, `RoadPoint`                                   |
//! | [`mode`]      | `TravelMode`, `VehicleMask`                              |
//! | [`config`]    | `RouterConfig`                                           |
//! | [`error`]     | `TrError`, `TrResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod segment;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::RouterConfig;
pub use error::{TrError, TrResult};
pub use geo::{GeoPoint, PointCode, Projected};
pub use ids::{FeatureId, JointId, RegionId, VertexId};
pub use mode::{TravelMode, VehicleMask};
pub use segment::{RoadPoint, Segment};
