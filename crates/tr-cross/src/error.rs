//! Cross-region error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrossError {
    /// The shortcut blob cannot be trusted.  Callers fall back to loading
    /// the region in full.
    #[error("corrupted cross-region data: {0}")]
    CorruptedData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CrossResult<T> = Result<T, CrossError>;

pub(crate) fn corrupted(msg: impl Into<String>) -> CrossError {
    CrossError::CorruptedData(msg.into())
}
