//! Row type

use crate::cell::{Cell, CellValue};

/// An ordered sequence of cells (index = column) plus row formatting
///
/// Rows may be sparse: cells between populated columns are empty cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<Cell>,
    height: Option<f64>,
    hidden: bool,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row from cells
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    /// Create a row of unstyled cells from values
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self::from_cells(values.into_iter().map(Cell::new).collect())
    }

    /// Set the row height in points
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    /// Set the hidden flag
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Place `cell` at column `index`, padding with empty cells if needed
    pub fn with_cell(mut self, index: usize, cell: Cell) -> Self {
        if index >= self.cells.len() {
            self.cells.resize_with(index + 1, Cell::empty);
        }
        self.cells[index] = cell;
        self
    }

    /// Get a cell by column index
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// All cells, in column order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Custom height, if any
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    /// Whether the row is hidden
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Number of cells (including empty ones)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when the row carries nothing worth writing
    pub fn is_blank(&self) -> bool {
        self.height.is_none() && !self.hidden && self.cells.iter().all(Cell::is_blank)
    }
}
