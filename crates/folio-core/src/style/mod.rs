//! Cell styling types
//!
//! This module contains types for cell formatting:
//! - [`Style`] - Complete cell style
//! - [`FontStyle`] - Font settings
//! - [`FillStyle`] - Background fill
//! - [`BorderStyle`] - Cell borders
//! - [`Alignment`] - Text alignment
//! - [`Color`] - Color representation
//!
//! Every component is partial: an unset field means "use the default", so
//! two styles can be merged field by field.

mod alignment;
mod border;
mod color;
mod fill;
mod font;
pub mod number_format;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{BorderEdge, BorderLineStyle, BorderStyle};
pub use color::Color;
pub use fill::{FillStyle, PatternType};
pub use font::{FontStyle, Underline};

/// Complete cell style
///
/// Styles compare and hash structurally, which is what the writer's style
/// table deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    /// Font settings
    pub font: Option<FontStyle>,
    /// Border settings
    pub border: Option<BorderStyle>,
    /// Fill/background settings
    pub fill: Option<FillStyle>,
    /// Text alignment
    pub alignment: Option<Alignment>,
    /// Number format code (e.g., "0.00", "yyyy-mm-dd")
    pub number_format: Option<String>,
}

impl Style {
    /// Create a new empty style
    pub fn new() -> Self {
        Self::default()
    }

    fn font_mut(&mut self) -> &mut FontStyle {
        self.font.get_or_insert_with(FontStyle::default)
    }

    fn alignment_mut(&mut self) -> &mut Alignment {
        self.alignment.get_or_insert_with(Alignment::default)
    }

    /// Set font to bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.font_mut().bold = Some(bold);
        self
    }

    /// Set font to italic
    pub fn italic(mut self, italic: bool) -> Self {
        self.font_mut().italic = Some(italic);
        self
    }

    /// Set underline
    pub fn underline(mut self, underline: Underline) -> Self {
        self.font_mut().underline = Some(underline);
        self
    }

    /// Set font size in points
    pub fn font_size(mut self, size: f64) -> Self {
        self.font_mut().size = Some(size);
        self
    }

    /// Set font name
    pub fn font_name<S: Into<String>>(mut self, name: S) -> Self {
        self.font_mut().name = Some(name.into());
        self
    }

    /// Set font color
    pub fn font_color(mut self, color: Color) -> Self {
        self.font_mut().color = Some(color);
        self
    }

    /// Set solid fill color
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = Some(FillStyle::solid(color));
        self
    }

    /// Set the fill
    pub fn fill(mut self, fill: FillStyle) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Set the borders
    pub fn border(mut self, border: BorderStyle) -> Self {
        self.border = Some(border);
        self
    }

    /// Set horizontal alignment
    pub fn horizontal_alignment(mut self, align: HorizontalAlignment) -> Self {
        self.alignment_mut().horizontal = Some(align);
        self
    }

    /// Set vertical alignment
    pub fn vertical_alignment(mut self, align: VerticalAlignment) -> Self {
        self.alignment_mut().vertical = Some(align);
        self
    }

    /// Set text wrapping
    pub fn wrap_text(mut self, wrap: bool) -> Self {
        self.alignment_mut().wrap_text = Some(wrap);
        self
    }

    /// Set number format code
    pub fn number_format<S: Into<String>>(mut self, format: S) -> Self {
        self.number_format = Some(format.into());
        self
    }

    /// Deep merge: sub-objects are merged field by field with `other`
    /// winning, and `other`'s number format replaces ours when present.
    pub fn merge(&self, other: &Style) -> Style {
        Style {
            font: merge_part(&self.font, &other.font, FontStyle::merge),
            border: merge_part(&self.border, &other.border, BorderStyle::merge),
            fill: merge_part(&self.fill, &other.fill, FillStyle::merge),
            alignment: merge_part(&self.alignment, &other.alignment, Alignment::merge),
            number_format: other
                .number_format
                .clone()
                .or_else(|| self.number_format.clone()),
        }
    }
}

fn merge_part<T: Clone>(base: &Option<T>, overlay: &Option<T>, merge: fn(&T, &T) -> T) -> Option<T> {
    match (base, overlay) {
        (Some(base), Some(overlay)) => Some(merge(base, overlay)),
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_style_builder() {
        let style = Style::new()
            .bold(true)
            .font_size(14.0)
            .fill_color(Color::YELLOW)
            .horizontal_alignment(HorizontalAlignment::Center);

        let font = style.font.as_ref().unwrap();
        assert_eq!(font.bold, Some(true));
        assert_eq!(font.size, Some(14.0));
        assert_eq!(font.italic, None);
        assert_eq!(style.fill, Some(FillStyle::solid(Color::YELLOW)));
        assert_eq!(
            style.alignment.unwrap().horizontal,
            Some(HorizontalAlignment::Center)
        );
    }

    #[test]
    fn test_merge_number_format() {
        let base = Style::new().number_format("0.00");
        assert_eq!(
            base.merge(&Style::new().bold(true)).number_format.as_deref(),
            Some("0.00")
        );
        assert_eq!(
            base.merge(&Style::new().number_format("0%"))
                .number_format
                .as_deref(),
            Some("0%")
        );
    }

    #[test]
    fn test_merge_alignment_fields() {
        let base = Style::new().wrap_text(true);
        let merged = base.merge(&Style::new().vertical_alignment(VerticalAlignment::Top));
        let alignment = merged.alignment.unwrap();
        assert_eq!(alignment.wrap_text, Some(true));
        assert_eq!(alignment.vertical, Some(VerticalAlignment::Top));
    }

    #[test]
    fn test_structural_hash() {
        let mut set = HashSet::new();
        set.insert(Style::new().bold(true).font_size(12.0));
        set.insert(Style::new().font_size(12.0).bold(true));
        set.insert(Style::new().italic(true));
        assert_eq!(set.len(), 2);
    }
}
