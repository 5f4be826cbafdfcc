//! Row-at-a-time reading and incremental writing
//!
//! [`StreamingReader`] is a forward-only iterator of [`RowRecord`]s. The
//! archive is still decompressed up front, but each sheet is parsed only as
//! its rows are pulled, and a sheet's XML is released once its rows are
//! exhausted. Stopping early is just dropping the iterator.
//!
//! [`StreamingWriter`] accepts sheets (or rows of the sheet being built) one at
//! a time. Compression needs every part, so the archive only exists once
//! [`StreamingWriter::finish`] is called.

use crate::error::{XlsxError, XlsxResult};
use crate::options::{XlsxReadOptions, XlsxWriteOptions};
use crate::reader::{Package, SheetEntry, SheetParser};
use crate::writer::XlsxWriter;
use folio_core::{Row, Workbook, WorkbookMetadata, Worksheet};

/// One row, tagged with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    /// Name of the sheet the row belongs to
    pub sheet_name: String,
    /// Zero-based position of the sheet in the workbook
    pub sheet_index: usize,
    /// Zero-based row index within the sheet
    pub row_index: usize,
    /// The row itself
    pub row: Row,
}

/// Lazy, single-pass reader over every row of every sheet
///
/// Only rows present in the file are yielded; gaps between row indices are
/// not filled in. After the first error the iterator is exhausted.
pub struct StreamingReader {
    package: Package,
    pending: std::vec::IntoIter<SheetEntry>,
    current: Option<(usize, String, SheetParser)>,
    sheet_names: Vec<String>,
    next_sheet: usize,
    failed: bool,
}

impl StreamingReader {
    /// Open an archive with default options
    pub fn open(bytes: &[u8]) -> XlsxResult<Self> {
        Self::open_with_options(bytes, &XlsxReadOptions::default())
    }

    /// Open an archive
    ///
    /// Workbook-level parts (shared strings, styles, sheet list) are parsed
    /// here, so an archive missing one fails immediately rather than on the
    /// first pull.
    pub fn open_with_options(bytes: &[u8], options: &XlsxReadOptions) -> XlsxResult<Self> {
        let mut package = Package::open(bytes, options)?;
        let sheets = std::mem::take(&mut package.sheets);
        let sheet_names = sheets.iter().map(|s| s.name.clone()).collect();
        Ok(Self {
            package,
            pending: sheets.into_iter(),
            current: None,
            sheet_names,
            next_sheet: 0,
            failed: false,
        })
    }

    /// Names of the sheets that will be read, in order
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    fn pull(&mut self) -> XlsxResult<Option<RowRecord>> {
        loop {
            if let Some((sheet_index, sheet_name, parser)) = self.current.as_mut() {
                if let Some((row_index, row)) = parser.next_row(&self.package.context)? {
                    return Ok(Some(RowRecord {
                        sheet_name: sheet_name.clone(),
                        sheet_index: *sheet_index,
                        row_index,
                        row,
                    }));
                }
            }

            // current sheet exhausted (or none started yet)
            let Some(entry) = self.pending.next() else {
                self.current = None;
                return Ok(None);
            };
            let parser = self.package.sheet_parser(&entry)?;
            log::debug!("streaming sheet '{}' from {}", entry.name, entry.path);
            self.current = Some((self.next_sheet, entry.name, parser));
            self.next_sheet += 1;
        }
    }
}

impl Iterator for StreamingReader {
    type Item = XlsxResult<RowRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.pull() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                self.current = None;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for StreamingReader {}

/// Incremental workbook builder
///
/// Sheets are added whole with [`add_sheet`](Self::add_sheet), or row by row
/// after [`begin_sheet`](Self::begin_sheet).
pub struct StreamingWriter {
    workbook: Workbook,
    open_sheet: Option<Worksheet>,
    options: XlsxWriteOptions,
}

impl StreamingWriter {
    /// Create a writer with default options
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self::with_options(name, XlsxWriteOptions::default())
    }

    /// Create a writer
    pub fn with_options<S: Into<String>>(name: S, options: XlsxWriteOptions) -> Self {
        Self {
            workbook: Workbook::new(name),
            open_sheet: None,
            options,
        }
    }

    /// Attach document properties
    pub fn with_metadata(mut self, metadata: WorkbookMetadata) -> Self {
        self.workbook = std::mem::take(&mut self.workbook).with_metadata(metadata);
        self
    }

    /// Add a complete sheet, closing any sheet begun with `begin_sheet`
    pub fn add_sheet(&mut self, sheet: Worksheet) -> XlsxResult<&mut Self> {
        self.close_sheet()?;
        self.push(sheet)?;
        Ok(self)
    }

    /// Start a sheet that rows will be appended to
    pub fn begin_sheet<S: Into<String>>(&mut self, name: S) -> XlsxResult<&mut Self> {
        self.close_sheet()?;
        let sheet = Worksheet::new(name);
        self.workbook.validate_sheet_name(sheet.name())?;
        self.open_sheet = Some(sheet);
        Ok(self)
    }

    /// Append a row to the sheet begun last
    pub fn write_row(&mut self, row: Row) -> XlsxResult<&mut Self> {
        let sheet = self
            .open_sheet
            .take()
            .ok_or_else(|| XlsxError::Stream("write_row called before begin_sheet".into()))?;
        let index = sheet.row_count();
        self.open_sheet = Some(sheet.with_row(index, row));
        Ok(self)
    }

    /// Number of sheets so far, including one still being written
    pub fn sheet_count(&self) -> usize {
        self.workbook.sheet_count() + usize::from(self.open_sheet.is_some())
    }

    /// Compress everything into an archive
    pub fn finish(mut self) -> XlsxResult<Vec<u8>> {
        self.close_sheet()?;
        if self.workbook.sheet_count() == 0 {
            return Err(XlsxError::Stream("no sheets were written".into()));
        }
        XlsxWriter::write_with_options(&self.workbook, &self.options)
    }

    fn close_sheet(&mut self) -> XlsxResult<()> {
        match self.open_sheet.take() {
            Some(sheet) => self.push(sheet),
            None => Ok(()),
        }
    }

    fn push(&mut self, sheet: Worksheet) -> XlsxResult<()> {
        self.workbook.validate_sheet_name(sheet.name())?;
        self.workbook = std::mem::take(&mut self.workbook).add_sheet(sheet)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use folio_core::CellValue;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<u8> {
        let mut writer = StreamingWriter::new("Stream");
        writer
            .begin_sheet("First")
            .unwrap()
            .write_row(Row::from_values(["a", "b"]))
            .unwrap()
            .write_row(Row::from_values([1.0, 2.0]))
            .unwrap();
        writer
            .add_sheet(Worksheet::new("Second").with_row(2, Row::from_values([true])))
            .unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_rows_in_order() {
        let reader = StreamingReader::open(&sample()).unwrap();
        assert_eq!(reader.sheet_names(), &["First".to_string(), "Second".to_string()]);

        let records: Vec<RowRecord> = reader.map(Result::unwrap).collect();
        let positions: Vec<(&str, usize, usize)> = records
            .iter()
            .map(|r| (r.sheet_name.as_str(), r.sheet_index, r.row_index))
            .collect();
        assert_eq!(positions, vec![("First", 0, 0), ("First", 0, 1), ("Second", 1, 2)]);
        assert_eq!(records[0].row.cell(1).unwrap().value, CellValue::String("b".into()));
        assert_eq!(records[2].row.cell(0).unwrap().value, CellValue::Boolean(true));
    }

    #[test]
    fn test_stop_early() {
        let mut reader = StreamingReader::open(&sample()).unwrap();
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.row_index, 0);
        drop(reader);
    }

    #[test]
    fn test_finish_without_sheets() {
        let err = StreamingWriter::new("Empty").finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Stream);
    }

    #[test]
    fn test_write_row_without_sheet() {
        let mut writer = StreamingWriter::new("W");
        let err = writer.write_row(Row::new()).err().unwrap();
        assert!(matches!(err, XlsxError::Stream(_)));
    }

    #[test]
    fn test_begin_sheet_checks_name() {
        let mut writer = StreamingWriter::new("W");
        writer.begin_sheet("Data").unwrap();
        assert!(writer.begin_sheet("DATA").is_err());
        assert!(writer.begin_sheet("bad/name").is_err());
        assert_eq!(writer.sheet_count(), 1);
    }

    #[test]
    fn test_duplicate_sheet_keeps_writer_usable() {
        let mut writer = StreamingWriter::new("W");
        writer.add_sheet(Worksheet::new("Data")).unwrap();
        let err = writer.add_sheet(Worksheet::new("data")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(writer.sheet_count(), 1);
        assert!(writer.finish().is_ok());
    }

    #[test]
    fn test_error_fuses_iterator() {
        // a string cell pointing past the end of the shared-string table
        let bad = Workbook::new("Bad")
            .add_sheet(Worksheet::new("S").with_row(0, Row::from_values(["x"])))
            .unwrap();
        let mut parts = XlsxWriter::build_parts(&bad).unwrap();
        for (name, content) in parts.iter_mut() {
            if name.as_str() == "xl/sharedStrings.xml" {
                *content = br#"<sst count="0" uniqueCount="0"></sst>"#.to_vec();
            }
        }
        let workbook_bytes = crate::archive::pack(&parts, &XlsxWriteOptions::default()).unwrap();

        let mut reader = StreamingReader::open(&workbook_bytes).unwrap();
        assert!(matches!(reader.next(), Some(Err(XlsxError::Parse { .. }))));
        assert!(reader.next().is_none());
    }
}
