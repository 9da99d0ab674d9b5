//! `tr-cross` — crossing regions without loading them.
//!
//! Every road segment that straddles a region border is a [`Transition`].
//! Driving it into the region makes it an *enter*, driving it out an *exit*.
//! A region's [`Connector`] numbers its enters and exits for one travel mode
//! and, when precomputed, holds a dense `enters × exits` matrix of shortest
//! in-region weights.  A query that only passes through a region can then
//! jump from enter to exit without touching the region's road graph.
//!
//! # Crate layout
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`transition`] | `Transition`                                           |
//! | [`connector`]  | `Connector` (per region and mode), lazy weights        |
//! | [`format`]     | binary layout, `serialize`/`deserialize`               |
//! | [`builder`]    | `ConnectorBuilder`, weight precomputation              |
//! | [`error`]      | `CrossError`, `CrossResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Computes weight rows with `rayon`.                      |

pub mod builder;
pub mod connector;
pub mod error;
pub mod format;
pub mod transition;


pub use builder::ConnectorBuilder;
pub use connector::Connector;
pub use error::{CrossError, CrossResult};
pub use format::FORMAT_VERSION;
pub use transition::Transition;
