//! Alignment types

/// Partial text alignment settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    /// Horizontal alignment
    pub horizontal: Option<HorizontalAlignment>,
    /// Vertical alignment
    pub vertical: Option<VerticalAlignment>,
    /// Wrap text
    pub wrap_text: Option<bool>,
    /// Indent level
    pub indent: Option<u32>,
    /// Text rotation in degrees (0-180, 255 for vertical text)
    pub rotation: Option<u16>,
}

impl Alignment {
    /// Field-by-field merge; fields set in `other` win
    pub fn merge(&self, other: &Alignment) -> Alignment {
        Alignment {
            horizontal: other.horizontal.or(self.horizontal),
            vertical: other.vertical.or(self.vertical),
            wrap_text: other.wrap_text.or(self.wrap_text),
            indent: other.indent.or(self.indent),
            rotation: other.rotation.or(self.rotation),
        }
    }
}

/// Horizontal alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HorizontalAlignment {
    /// General alignment (text left, numbers right)
    #[default]
    General,
    /// Left aligned
    Left,
    /// Centered
    Center,
    /// Right aligned
    Right,
    /// Fill (repeat content to fill cell)
    Fill,
    /// Justified
    Justify,
    /// Center across selection
    CenterContinuous,
    /// Distributed
    Distributed,
}

impl HorizontalAlignment {
    /// The `horizontal` attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalAlignment::General => "general",
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::Right => "right",
            HorizontalAlignment::Fill => "fill",
            HorizontalAlignment::Justify => "justify",
            HorizontalAlignment::CenterContinuous => "centerContinuous",
            HorizontalAlignment::Distributed => "distributed",
        }
    }
}

/// Vertical alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalAlignment {
    /// Top aligned
    Top,
    /// Centered
    Center,
    /// Bottom aligned (default)
    #[default]
    Bottom,
    /// Justified
    Justify,
    /// Distributed
    Distributed,
}

impl VerticalAlignment {
    /// The `vertical` attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
            VerticalAlignment::Justify => "justify",
            VerticalAlignment::Distributed => "distributed",
        }
    }
}
