//! XLSX error types

use std::fmt;

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error (including "not a zip archive at all")
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed XML in a part
    #[error("XML error in {part}: {source}")]
    Xml {
        part: String,
        source: quick_xml::Error,
    },

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Well-formed XML with unexpected content
    #[error("Parse error in {part}: {message}")]
    Parse { part: String, message: String },

    /// Streaming writer misuse
    #[error("Stream error: {0}")]
    Stream(String),

    /// A part exceeded the configured size ceiling
    #[error("Part {part} is {actual} bytes, over the {limit} byte limit")]
    MemoryLimit { part: String, limit: u64, actual: u64 },

    /// Model validation error
    #[error("Validation error: {0}")]
    Core(#[from] folio_core::Error),
}

impl XlsxError {
    pub(crate) fn xml(part: &str, source: quick_xml::Error) -> Self {
        XlsxError::Xml {
            part: part.to_string(),
            source,
        }
    }

    pub(crate) fn parse<S: Into<String>>(part: &str, message: S) -> Self {
        XlsxError::Parse {
            part: part.to_string(),
            message: message.into(),
        }
    }

    /// Broad category of the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            XlsxError::Zip(_) | XlsxError::MissingPart(_) | XlsxError::InvalidFormat(_) => {
                ErrorKind::FileFormat
            }
            XlsxError::Xml { .. } | XlsxError::Parse { .. } => ErrorKind::Parse,
            XlsxError::Core(_) => ErrorKind::Validation,
            XlsxError::Stream(_) => ErrorKind::Stream,
            XlsxError::MemoryLimit { .. } => ErrorKind::Memory,
            XlsxError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The archive is not a spreadsheet container, or lacks a required part
    FileFormat,
    /// A part's content does not match the expected schema
    Parse,
    /// The document model rejected a value
    Validation,
    /// Streaming writer misuse
    Stream,
    /// A configured size ceiling was exceeded
    Memory,
    /// Underlying I/O failure
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::FileFormat => "file format error",
            ErrorKind::Parse => "parse error",
            ErrorKind::Validation => "validation error",
            ErrorKind::Stream => "stream error",
            ErrorKind::Memory => "memory error",
            ErrorKind::Io => "io error",
        })
    }
}
