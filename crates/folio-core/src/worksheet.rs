//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{Cell, CellRange};
use crate::error::{Error, Result};
use crate::row::Row;

/// A named grid of rows, with merged ranges and column widths
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Worksheet {
    name: String,
    rows: Vec<Row>,
    merged_cells: Vec<CellRange>,
    column_widths: BTreeMap<u32, f64>,
}

impl Worksheet {
    /// Create an empty worksheet
    ///
    /// The name is validated when the sheet is added to a [`Workbook`](crate::Workbook).
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the worksheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a copy with a different name
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Place `row` at index `index`, padding with empty rows if needed
    pub fn with_row(mut self, index: usize, row: Row) -> Self {
        if index >= self.rows.len() {
            self.rows.resize_with(index + 1, Row::new);
        }
        self.rows[index] = row;
        self
    }

    /// Replace all rows
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Set a single cell, creating the row if needed
    pub fn with_cell(self, row: usize, column: usize, cell: Cell) -> Self {
        let current = self.rows.get(row).cloned().unwrap_or_default();
        self.with_row(row, current.with_cell(column, cell))
    }

    /// Add a merged range
    ///
    /// Fails when the range overlaps a range already merged on this sheet.
    pub fn with_merged_cell(mut self, range: CellRange) -> Result<Self> {
        if let Some(existing) = self.merged_cells.iter().find(|r| r.overlaps(&range)) {
            return Err(Error::validation(format!(
                "merged range {} overlaps {} on sheet '{}'",
                range, existing, self.name
            )));
        }
        self.merged_cells.push(range);
        Ok(self)
    }

    /// Set a column width in character units
    pub fn with_column_width(mut self, column: u32, width: f64) -> Self {
        self.column_widths.insert(column, width);
        self
    }

    /// Get a row by index
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// All rows, in order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get a cell by zero-based row and column
    pub fn get_cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row)?.cell(column)
    }

    /// Number of rows (including blank ones)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Merged ranges, in insertion order
    pub fn merged_cells(&self) -> &[CellRange] {
        &self.merged_cells
    }

    /// Column widths keyed by zero-based column index
    pub fn column_widths(&self) -> &BTreeMap<u32, f64> {
        &self.column_widths
    }

    /// Width of a column, if customised
    pub fn column_width(&self, column: u32) -> Option<f64> {
        self.column_widths.get(&column).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    #[test]
    fn test_with_row_pads() {
        let sheet = Worksheet::new("S").with_row(2, Row::from_values(["x"]));
        assert_eq!(sheet.row_count(), 3);
        assert!(sheet.row(0).unwrap().is_blank());
        assert_eq!(
            sheet.get_cell(2, 0).map(|c| &c.value),
            Some(&CellValue::String("x".into()))
        );
        assert!(sheet.get_cell(2, 1).is_none());
        assert!(sheet.get_cell(5, 0).is_none());
    }

    #[test]
    fn test_with_cell() {
        let sheet = Worksheet::new("S")
            .with_cell(1, 2, Cell::new(7))
            .with_cell(1, 0, Cell::new("a"));
        assert_eq!(sheet.get_cell(1, 2).unwrap().value, CellValue::Number(7.0));
        assert_eq!(sheet.get_cell(1, 0).unwrap().value.as_string(), Some("a"));
    }

    #[test]
    fn test_merged_cells_must_not_overlap() {
        let sheet = Worksheet::new("S")
            .with_merged_cell(CellRange::parse("A1:B2").unwrap())
            .unwrap()
            .with_merged_cell(CellRange::parse("C1:D2").unwrap())
            .unwrap();
        assert_eq!(sheet.merged_cells().len(), 2);

        let err = sheet
            .with_merged_cell(CellRange::parse("B2:C3").unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_column_widths() {
        let sheet = Worksheet::new("S")
            .with_column_width(0, 12.5)
            .with_column_width(3, 30.0);
        assert_eq!(sheet.column_width(0), Some(12.5));
        assert_eq!(sheet.column_width(1), None);
        assert_eq!(sheet.column_widths().len(), 2);
    }
}
