//! World-level error type.

use thiserror::Error;

use tr_core::{GeoPoint, RegionId, Segment, TrError};
use tr_cross::CrossError;
use tr_geometry::GeometryError;
use tr_graph::GraphError;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("no region covers {0}")]
    RegionNotFound(GeoPoint),

    #[error("unknown region {0}")]
    UnknownRegion(RegionId),

    #[error("no road within {radius_m} m of {point}")]
    NoRoadNearby { point: GeoPoint, radius_m: f64 },

    #[error("segment {0} is not in its region graph")]
    SegmentNotFound(Segment),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] TrError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Cross(#[from] CrossError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WorldResult<T> = Result<T, WorldError>;
