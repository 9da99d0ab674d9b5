//! `tr-geometry` — the road geometry store.
//!
//! A region's roads are read through a [`GeometryLoader`] (a capability
//! selected at construction time: in-memory for tests and generators, CSV
//! for on-disk regions) and cached by a [`GeometryStore`] for the lifetime
//! of the region.
//!
//! # Crate layout
//!
//! | Module        | Contents                                            |
//! |---------------|-----------------------------------------------------|
//! | [`road`]      | `RoadGeometry`                                      |
//! | [`loader`]    | `GeometryLoader` trait, `InMemoryLoader`            |
//! | [`roads_csv`] | `load_roads_csv`, `load_roads_reader`               |
//! | [`store`]     | `GeometryStore` (per-region cache)                  |
//! | [`error`]     | `GeometryError`, `GeometryResult<T>`                |

pub mod error;
pub mod loader;
pub mod road;
pub mod roads_csv;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::{GeometryError, GeometryResult};
pub use loader::{GeometryLoader, InMemoryLoader};
pub use road::RoadGeometry;
pub use store::GeometryStore;
pub use roads_csv::{load_roads_csv, load_roads_reader};
