//! Cell address and range types
//!
//! Converts between zero-based `(row, column)` coordinates and A1-style text.
//! Column letters are bijective base-26: there is no digit for zero, so `Z` (25)
//! is followed by `AA` (26) rather than `BA`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Width of one spreadsheet width unit in pixels (default font, 96 dpi)
const PIXELS_PER_WIDTH_UNIT: f64 = 7.0;

/// Smallest column width the writer emits
const MIN_COLUMN_WIDTH: f64 = 1.0;

/// Largest column width the format accepts
const MAX_COLUMN_WIDTH: f64 = 255.0;

/// A cell address (e.g., "A1")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub column: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use folio_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B3").unwrap();
    /// assert_eq!(addr.row, 2);
    /// assert_eq!(addr.column, 1);
    ///
    /// assert!(CellAddress::parse("A0").is_err());
    /// assert!(CellAddress::parse("1A").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let split = s
            .bytes()
            .position(|b| !b.is_ascii_uppercase())
            .unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);

        if letters.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row_number: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number out of range in '{}'", s)))?;

        // Rows are 1-based on the wire, 0-based here
        if row_number == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self {
            row: row_number - 1,
            column: Self::letters_to_column(letters)?,
        })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(column: u32) -> String {
        let mut digits = Vec::new();
        let mut n = u64::from(column) + 1;

        while n > 0 {
            let rem = (n - 1) % 26;
            digits.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }

        digits.iter().rev().map(|&b| b as char).collect()
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut value: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_uppercase() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            value = value * 26 + (c as u64 - 'A' as u64 + 1);
            if value > u64::from(u32::MAX) {
                return Err(Error::InvalidAddress(format!(
                    "column '{}' out of range",
                    letters
                )));
            }
        }

        Ok((value - 1) as u32)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!(
            "{}{}",
            Self::column_to_letters(self.column),
            u64::from(self.row) + 1
        )
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells (e.g., "A1:B10")
///
/// `start` is always the top-left corner and `end` the bottom-right one;
/// constructors reject inverted ranges instead of normalizing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range
    pub fn new(start: CellAddress, end: CellAddress) -> Result<Self> {
        if start.row > end.row || start.column > end.column {
            return Err(Error::InvertedRange(format!("{}:{}", start, end)));
        }
        Ok(Self { start, end })
    }

    /// Create a range from row/column indices
    pub fn from_indices(
        start_row: u32,
        start_column: u32,
        end_row: u32,
        end_column: u32,
    ) -> Result<Self> {
        Self::new(
            CellAddress::new(start_row, start_column),
            CellAddress::new(end_row, end_column),
        )
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation (a bare address is a single-cell range)
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((start, end)) => {
                let start = CellAddress::parse(start)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                let end = CellAddress::parse(end)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                Self::new(start, end)
            }
            None => {
                let addr = CellAddress::parse(s)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                Ok(Self::single(addr))
            }
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.column >= self.start.column
            && addr.column <= self.end.column
    }

    /// Check if this range overlaps with another
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && self.end.row >= other.start.row
            && self.start.column <= other.end.column
            && self.end.column >= other.start.column
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn column_count(&self) -> u32 {
        self.end.column - self.start.column + 1
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Decode bijective base-26 column letters (`A` = 0, `AA` = 26)
pub fn column_letter_to_index(letters: &str) -> Result<u32> {
    CellAddress::letters_to_column(letters)
}

/// Encode a zero-based column index as letters
pub fn column_index_to_letter(index: u32) -> String {
    CellAddress::column_to_letters(index)
}

/// Parse an A1-style address
pub fn parse_address(s: &str) -> Result<CellAddress> {
    CellAddress::parse(s)
}

/// Format an address as A1-style text
pub fn format_address(addr: &CellAddress) -> String {
    addr.to_a1_string()
}

/// Parse an `A1:B2` range; inverted ranges are rejected
pub fn parse_range(s: &str) -> Result<CellRange> {
    CellRange::parse(s)
}

/// Format a range as `A1:B2` text
pub fn format_range(range: &CellRange) -> String {
    range.to_a1_string()
}

/// Convert a pixel width into column width units, clamped to `1..=255`.
///
/// Approximately invertible with [`excel_width_to_pixels`] within one unit.
pub fn pixels_to_excel_width(pixels: u32) -> f64 {
    (f64::from(pixels) / PIXELS_PER_WIDTH_UNIT)
        .round()
        .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

/// Convert column width units into pixels
pub fn excel_width_to_pixels(width: f64) -> u32 {
    (width * PIXELS_PER_WIDTH_UNIT).round().max(0.0) as u32
}
