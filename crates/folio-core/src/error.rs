//! Error types for folio-core
//!
//! Every error raised by this crate is a validation failure: the caller built
//! (or asked for) something the document model does not allow.

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in folio-core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Range whose end lies before its start on either axis
    #[error("Inverted cell range: {0}")]
    InvertedRange(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Serial number or calendar date outside the representable range
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Any other model invariant violation
    #[error("{0}")]
    Validation(String),
}

impl Error {
    /// Create a generic validation error with a message
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }
}
