//! `tr-search` — graph-agnostic shortest-path search.
//!
//! Nothing in this crate knows about roads.  A caller implements [`Graph`]
//! for its vertex and weight types and drives a [`Search`]:
//!
//! ```
//! use std::convert::Infallible;
//! use tr_search::{Edge, Graph, Search, SearchOutcome};
//!
//! struct Line;
//!
//! impl Graph for Line {
//!     type Vertex = u32;
//!     type Weight = f64;
//!     type Error = Infallible;
//!
//!     fn edges(&self, v: &u32, outgoing: bool, out: &mut Vec<Edge<u32, f64>>) -> Result<(), Infallible> {
//!         let next = if outgoing { v.checked_add(1) } else { v.checked_sub(1) };
//!         out.extend(next.filter(|n| *n < 10).map(|n| Edge::new(n, 1.0)));
//!         Ok(())
//!     }
//! }
//!
//! let outcome = Search::new(&Line).bidirectional(0, 9).unwrap();
//! let SearchOutcome::Found(path) = outcome else { panic!() };
//! assert_eq!(path.weight, 9.0);
//! assert_eq!(path.vertices.len(), 10);
//! ```
//!
//! # Crate layout
//!
//! | Module            | Contents                                            |
//! |-------------------|-----------------------------------------------------|
//! | [`graph`]         | `Graph`, `Edge`, `Weight`                           |
//! | [`cancel`]        | `CancelFlag` and the periodic poller                |
//! | [`observer`]      | `SearchObserver`, `NoopObserver`                    |
//! | [`search`]        | `Search` builder, `SearchOutcome`, `Path`, `WaveOutcome` |
//! | [`astar`]         | one-directional A* and one-to-many wave             |
//! | [`bidirectional`] | bidirectional A* with averaged potentials           |

pub mod astar;
pub mod bidirectional;
pub mod cancel;
pub mod graph;
pub mod observer;
pub mod search;

mod queue;


pub use cancel::CancelFlag;
pub use graph::{Edge, Graph, Weight};
pub use observer::{NoopObserver, SearchObserver};
pub use search::{Path, Search, SearchOutcome, WaveControl, WaveOutcome};
