//! Fill style types

use super::Color;

/// Partial cell background fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FillStyle {
    /// Pattern type; a fill with only a foreground color is written as solid
    pub pattern: Option<PatternType>,
    /// Foreground (pattern) color
    pub fg_color: Option<Color>,
    /// Background color
    pub bg_color: Option<Color>,
}

impl FillStyle {
    /// Create a solid fill
    pub fn solid(color: Color) -> Self {
        Self {
            pattern: Some(PatternType::Solid),
            fg_color: Some(color),
            bg_color: None,
        }
    }

    /// Create a pattern fill
    pub fn pattern(pattern: PatternType, fg_color: Color, bg_color: Color) -> Self {
        Self {
            pattern: Some(pattern),
            fg_color: Some(fg_color),
            bg_color: Some(bg_color),
        }
    }

    /// Pattern written to the styles part
    pub fn effective_pattern(&self) -> PatternType {
        match (self.pattern, self.fg_color) {
            (Some(pattern), _) => pattern,
            (None, Some(_)) => PatternType::Solid,
            (None, None) => PatternType::None,
        }
    }

    /// Field-by-field merge; fields set in `other` win
    pub fn merge(&self, other: &FillStyle) -> FillStyle {
        FillStyle {
            pattern: other.pattern.or(self.pattern),
            fg_color: other.fg_color.or(self.fg_color),
            bg_color: other.bg_color.or(self.bg_color),
        }
    }
}

/// Fill pattern types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternType {
    /// No fill
    #[default]
    None,
    /// Solid fill
    Solid,
    /// Medium gray (50%)
    MediumGray,
    /// Dark gray (75%)
    DarkGray,
    /// Light gray (25%)
    LightGray,
    /// Dark horizontal lines
    DarkHorizontal,
    /// Dark vertical lines
    DarkVertical,
    /// Dark grid
    DarkGrid,
    /// Light horizontal lines
    LightHorizontal,
    /// Light vertical lines
    LightVertical,
    /// Light grid
    LightGrid,
    /// 12.5% gray
    Gray125,
    /// 6.25% gray
    Gray0625,
}

impl PatternType {
    /// The `patternType` attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::None => "none",
            PatternType::Solid => "solid",
            PatternType::MediumGray => "mediumGray",
            PatternType::DarkGray => "darkGray",
            PatternType::LightGray => "lightGray",
            PatternType::DarkHorizontal => "darkHorizontal",
            PatternType::DarkVertical => "darkVertical",
            PatternType::DarkGrid => "darkGrid",
            PatternType::LightHorizontal => "lightHorizontal",
            PatternType::LightVertical => "lightVertical",
            PatternType::LightGrid => "lightGrid",
            PatternType::Gray125 => "gray125",
            PatternType::Gray0625 => "gray0625",
        }
    }
}
