//! Region-graph error type.

use thiserror::Error;

use tr_core::RegionId;
use tr_geometry::GeometryError;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("region {region}: {source}")]
    Geometry {
        region: RegionId,
        #[source]
        source: GeometryError,
    },

    #[error("region {0} has too many vertices for 32-bit ids")]
    TooLarge(RegionId),
}

pub type GraphResult<T> = Result<T, GraphError>;
