//! # folio-core
//!
//! Core data structures for the folio spreadsheet codec.
//!
//! This crate provides the value types the XLSX codec reads and writes:
//! - [`Cell`], [`Row`], [`Worksheet`], [`Workbook`] - the immutable document model
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing (see [`address`])
//! - [`Style`] - partial cell formatting (fonts, fills, borders, alignment, number format)
//! - [`date`] - conversion between calendar dates and spreadsheet serial numbers
//! - [`transfer`] - a plain data shape for moving workbooks across threads
//!
//! ## Example
//!
//! ```rust
//! use folio_core::{Cell, Row, Workbook, Worksheet};
//!
//! let sheet = Worksheet::new("Data")
//!     .with_row(0, Row::from_values(["Name", "Score"]))
//!     .with_row(1, Row::new().with_cell(0, Cell::new("Alice")).with_cell(1, Cell::new(90)));
//!
//! let workbook = Workbook::new("Report").add_sheet(sheet).unwrap();
//! assert_eq!(workbook.sheet(0).unwrap().row_count(), 2);
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod row;
pub mod style;
pub mod transfer;
pub mod workbook;
pub mod worksheet;

pub use cell::address;
pub use cell::{Cell, CellAddress, CellRange, CellValue};
pub use error::{Error, Result};
pub use row::Row;
pub use workbook::{Workbook, WorkbookMetadata};
pub use worksheet::Worksheet;

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, PatternType, Style, Underline, VerticalAlignment,
};

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
