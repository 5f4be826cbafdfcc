//! # folio
//!
//! Read, write and stream XLSX spreadsheets.
//!
//! Workbooks are immutable values: every `with_*` call returns a new one.
//! Writing is deterministic, so the same workbook always produces the same
//! bytes.
//!
//! ## Features
//!
//! - Read and write XLSX files (Office Open XML)
//! - Cell styling (fonts, fills, borders, alignment, number formats)
//! - Row-at-a-time reading and incremental writing for large files
//! - A plain transfer shape and a background worker for off-thread I/O
//!
//! ## Example
//!
//! ```rust
//! use folio::prelude::*;
//!
//! let sheet = Worksheet::new("Data")
//!     .with_row(0, Row::from_values(["Name", "Score"]))
//!     .with_row(1, Row::new().with_cell(0, Cell::new("Alice")).with_cell(1, Cell::new(90)));
//! let workbook = Workbook::new("Report").add_sheet(sheet).unwrap();
//!
//! let bytes = workbook.write().unwrap();
//! let back = Workbook::read(&bytes).unwrap();
//! assert_eq!(back.sheet(0).unwrap().get_cell(1, 1).unwrap().value, CellValue::Number(90.0));
//!
//! // workbook.save("report.xlsx").unwrap();
//! ```

pub mod prelude;
pub mod worker;

// Re-export core types
pub use folio_core::{
    address, date, transfer, Alignment, BorderEdge, BorderLineStyle, BorderStyle, Cell,
    CellAddress, CellRange, CellValue, Color, Error, FillStyle, FontStyle, HorizontalAlignment,
    PatternType, Result, Row, Style, Underline, VerticalAlignment, Workbook, WorkbookMetadata,
    Worksheet, MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use folio_xlsx::{
    Compression, ErrorKind, RowRecord, StreamingReader, StreamingWriter, XlsxError,
    XlsxReadOptions, XlsxReader, XlsxResult, XlsxWriteOptions, XlsxWriter,
};

pub use worker::{WorkbookWorker, WorkerRequest, WorkerResponse};

use std::path::Path;

/// Extension trait for Workbook to add XLSX I/O
pub trait WorkbookExt: Sized {
    /// Read a workbook from XLSX bytes
    fn read(bytes: &[u8]) -> XlsxResult<Self>;

    /// Encode the workbook as XLSX bytes
    fn write(&self) -> XlsxResult<Vec<u8>>;

    /// Open a workbook from a file
    fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self>;

    /// Save the workbook to a file
    fn save<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()>;
}

impl WorkbookExt for Workbook {
    fn read(bytes: &[u8]) -> XlsxResult<Workbook> {
        XlsxReader::read(bytes)
    }

    fn write(&self) -> XlsxResult<Vec<u8>> {
        XlsxWriter::write(self)
    }

    fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        match extension(path).as_deref() {
            Some("xlsx") | Some("xlsm") => XlsxReader::read_file(path),
            _ => Err(unsupported(path)),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        match extension(path).as_deref() {
            Some("xlsx") => XlsxWriter::write_file(self, path),
            _ => Err(unsupported(path)),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn unsupported(path: &Path) -> XlsxError {
    XlsxError::InvalidFormat(format!("Unsupported file format: {}", path.display()))
}
