//! Prelude module - common imports for folio users
//!
//! ```rust
//! use folio::prelude::*;
//! ```

pub use crate::{
    // Style types
    Alignment,
    BorderEdge,
    BorderLineStyle,
    BorderStyle,
    // Cell types
    Cell,
    CellAddress,
    CellRange,
    CellValue,
    Color,
    Compression,
    // Error types
    Error,
    ErrorKind,
    FillStyle,
    FontStyle,
    HorizontalAlignment,
    PatternType,
    Result,
    // Main types
    Row,
    // Streaming
    RowRecord,
    StreamingReader,
    StreamingWriter,

    Style,
    Underline,
    VerticalAlignment,
    Workbook,
    // Extension traits
    WorkbookExt,
    WorkbookMetadata,
    Worksheet,

    // I/O types
    XlsxError,
    XlsxReadOptions,
    XlsxReader,
    XlsxResult,
    XlsxWriteOptions,
    XlsxWriter,
};
