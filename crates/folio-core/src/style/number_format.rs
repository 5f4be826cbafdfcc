//! Built-in number format table
//!
//! The format reserves ids below 164 for built-in codes; only the subset
//! below is recognised when resolving a format string to an id.

/// First id available for custom `numFmt` entries
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// Short date format, applied to date cells written without a date format
pub const DATE_FORMAT_ID: u32 = 14;

const BUILTIN_FORMATS: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (49, "@"),
];

/// Resolve a format string to its built-in id
pub fn builtin_format_id(code: &str) -> Option<u32> {
    BUILTIN_FORMATS
        .iter()
        .find(|(_, builtin)| *builtin == code)
        .map(|(id, _)| *id)
}

/// Format string of a built-in id
pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    BUILTIN_FORMATS
        .iter()
        .find(|(builtin, _)| *builtin == id)
        .map(|(_, code)| *code)
}

/// True for the built-in date and time ids (14-22, 45-47)
pub fn is_builtin_date_id(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(builtin_format_id("0.00"), Some(2));
        assert_eq!(builtin_format_id("#,##0"), Some(3));
        assert_eq!(builtin_format_id("mm-dd-yy"), Some(14));
        assert_eq!(builtin_format_id("0.000"), None);
        assert_eq!(builtin_format_code(9), Some("0%"));
        assert_eq!(builtin_format_code(163), None);
    }

    #[test]
    fn test_builtin_date_ids() {
        assert!(is_builtin_date_id(14));
        assert!(is_builtin_date_id(22));
        assert!(is_builtin_date_id(46));
        assert!(!is_builtin_date_id(2));
        assert!(!is_builtin_date_id(23));
    }
}
