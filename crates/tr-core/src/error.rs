//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `TrError` as one variant
//! via `#[from]`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `tr-core`.
pub type TrResult<T> = Result<T, TrError>;
