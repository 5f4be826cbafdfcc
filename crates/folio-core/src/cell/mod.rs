//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Cell`] - A value plus an optional style
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] / [`CellRange`] - A cell's location (e.g., "A1", "A1:B10")

pub mod address;
mod value;

pub use address::{CellAddress, CellRange};
pub use value::CellValue;

use crate::style::Style;

/// A single cell: a value and an optional style
///
/// Cells are values; the `with_*` methods consume the cell and return the
/// modified copy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    /// The cell's value
    pub value: CellValue,
    /// Formatting, if any
    pub style: Option<Style>,
}

impl Cell {
    /// Create a cell holding `value` with no style
    pub fn new<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            style: None,
        }
    }

    /// Create an empty (null) cell
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a styled cell
    pub fn styled<V: Into<CellValue>>(value: V, style: Style) -> Self {
        Self {
            value: value.into(),
            style: Some(style),
        }
    }

    /// Replace the value
    pub fn with_value<V: Into<CellValue>>(mut self, value: V) -> Self {
        self.value = value.into();
        self
    }

    /// Replace the style
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Remove the style
    pub fn without_style(mut self) -> Self {
        self.style = None;
        self
    }

    /// Deep-merge `style` into the current style (see [`Style::merge`])
    pub fn merge_style(mut self, style: &Style) -> Self {
        self.style = Some(match self.style.take() {
            Some(current) => current.merge(style),
            None => style.clone(),
        });
        self
    }

    /// A cell is blank when it has neither a value nor a style
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.style.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::FontStyle;

    #[test]
    fn test_with_value_keeps_style() {
        let bold = Style::new().bold(true);
        let cell = Cell::styled("a", bold.clone()).with_value(5);
        assert_eq!(cell.value, CellValue::Number(5.0));
        assert_eq!(cell.style, Some(bold));
    }

    #[test]
    fn test_merge_style_on_unstyled_cell() {
        let style = Style::new().italic(true);
        let cell = Cell::new(1).merge_style(&style);
        assert_eq!(cell.style, Some(style));
    }

    #[test]
    fn test_merge_style_combines_font_fields() {
        let cell = Cell::styled("x", Style::new().bold(true).number_format("0.00"))
            .merge_style(&Style::new().italic(true));

        let style = cell.style.unwrap();
        assert_eq!(
            style.font,
            Some(FontStyle {
                bold: Some(true),
                italic: Some(true),
                ..FontStyle::default()
            })
        );
        assert_eq!(style.number_format.as_deref(), Some("0.00"));
    }

    #[test]
    fn test_blank() {
        assert!(Cell::empty().is_blank());
        assert!(!Cell::new("").is_blank());
        assert!(!Cell::styled(CellValue::Empty, Style::new().bold(true)).is_blank());
    }
}
