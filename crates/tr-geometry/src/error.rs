//! Geometry-store error type.

use thiserror::Error;

use tr_core::FeatureId;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("feature {0} not found")]
    FeatureNotFound(FeatureId),

    #[error("invalid road {feature}: {reason}")]
    InvalidRoad { feature: FeatureId, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GeometryResult<T> = Result<T, GeometryError>;
