//! # folio-xlsx
//!
//! XLSX (Office Open XML) reader and writer for folio.
//!
//! The writer renders every part of the package from a [`Workbook`] value in
//! a fixed order, so equal workbooks produce byte-identical archives. The
//! reader rebuilds the document model; cell styles are only consulted to tell
//! dates from plain numbers.
//!
//! [`Workbook`]: folio_core::Workbook

pub mod error;
pub mod options;
pub mod reader;
pub mod shared_strings;
pub mod stream;
pub mod styles;
pub mod writer;

mod archive;
mod xml;

pub use error::{ErrorKind, XlsxError, XlsxResult};
pub use options::{Compression, XlsxReadOptions, XlsxWriteOptions};
pub use reader::{XlsxReader, DEFAULT_WORKBOOK_NAME};
pub use shared_strings::SharedStringTable;
pub use stream::{RowRecord, StreamingReader, StreamingWriter};
pub use styles::StyleManager;
pub use writer::XlsxWriter;
