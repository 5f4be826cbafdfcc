//! Font style types

use super::Color;

/// Partial font settings; `None` fields fall back to the workbook default
///
/// Equality and hashing treat the size by value: `0.0` equals `-0.0`, and
/// every NaN equals every other NaN.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontStyle {
    /// Font family name (e.g., "Calibri", "Arial")
    pub name: Option<String>,
    /// Font size in points
    pub size: Option<f64>,
    /// Bold
    pub bold: Option<bool>,
    /// Italic
    pub italic: Option<bool>,
    /// Underline style
    pub underline: Option<Underline>,
    /// Strikethrough
    pub strikethrough: Option<bool>,
    /// Font color
    pub color: Option<Color>,
}

impl FontStyle {
    /// Name written for fonts that do not set one
    pub const DEFAULT_NAME: &'static str = "Calibri";

    /// Size written for fonts that do not set one
    pub const DEFAULT_SIZE: f64 = 11.0;

    /// Create a new empty font
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font name
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set font size
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Set italic
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Set underline
    pub fn with_underline(mut self, underline: Underline) -> Self {
        self.underline = Some(underline);
        self
    }

    /// Set strikethrough
    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = Some(strikethrough);
        self
    }

    /// Set color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Field-by-field merge; fields set in `other` win
    pub fn merge(&self, other: &FontStyle) -> FontStyle {
        FontStyle {
            name: other.name.clone().or_else(|| self.name.clone()),
            size: other.size.or(self.size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            underline: other.underline.or(self.underline),
            strikethrough: other.strikethrough.or(self.strikethrough),
            color: other.color.or(self.color),
        }
    }
}

impl FontStyle {
    /// Bit pattern of the size with signed zeros and NaNs collapsed
    fn size_key(&self) -> Option<u64> {
        self.size.map(|size| {
            if size == 0.0 {
                0.0f64.to_bits()
            } else if size.is_nan() {
                f64::NAN.to_bits()
            } else {
                size.to_bits()
            }
        })
    }
}

impl PartialEq for FontStyle {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.size_key() == other.size_key()
            && self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.strikethrough == other.strikethrough
            && self.color == other.color
    }
}

impl std::hash::Hash for FontStyle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size_key().hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
        self.underline.hash(state);
        self.strikethrough.hash(state);
        self.color.hash(state);
    }
}

impl Eq for FontStyle {}

/// Underline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Underline {
    /// No underline
    #[default]
    None,
    /// Single underline
    Single,
    /// Double underline
    Double,
    /// Single accounting underline (extends to cell width)
    SingleAccounting,
    /// Double accounting underline
    DoubleAccounting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(font: &FontStyle) -> u64 {
        let mut hasher = DefaultHasher::new();
        font.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_signed_zero_sizes_are_equal() {
        let positive = FontStyle::new().with_size(0.0);
        let negative = FontStyle::new().with_size(-0.0);
        assert_eq!(positive, negative);
        assert_eq!(hash_of(&positive), hash_of(&negative));
    }

    #[test]
    fn test_nan_size_equals_itself() {
        let a = FontStyle::new().with_size(f64::NAN);
        let b = FontStyle::new().with_size(-f64::NAN);
        assert_eq!(a, a.clone());
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, FontStyle::new().with_size(11.0));
    }

    #[test]
    fn test_merge_prefers_other() {
        let base = FontStyle::new().with_name("Arial").with_bold(true);
        let merged = base.merge(&FontStyle::new().with_size(9.0).with_bold(false));
        assert_eq!(merged.name.as_deref(), Some("Arial"));
        assert_eq!(merged.size, Some(9.0));
        assert_eq!(merged.bold, Some(false));
    }
}
