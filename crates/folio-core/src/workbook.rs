//! Workbook type

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Document properties carried alongside the sheets
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkbookMetadata {
    /// Author
    pub creator: Option<String>,
    /// Creation timestamp
    pub created: Option<NaiveDateTime>,
    /// Last modification timestamp
    pub modified: Option<NaiveDateTime>,
    /// Custom string properties
    pub custom: BTreeMap<String, String>,
}

impl WorkbookMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the creator
    pub fn with_creator<S: Into<String>>(mut self, creator: S) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Set the creation timestamp
    pub fn with_created(mut self, created: NaiveDateTime) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the modification timestamp
    pub fn with_modified(mut self, modified: NaiveDateTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Add a custom property
    pub fn with_custom<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }
}

/// A named, ordered collection of worksheets
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    name: String,
    sheets: Vec<Worksheet>,
    metadata: Option<WorkbookMetadata>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the workbook name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a worksheet
    ///
    /// Fails if the sheet name is invalid or already used (case-insensitive).
    pub fn add_sheet(mut self, sheet: Worksheet) -> Result<Self> {
        self.validate_sheet_name(sheet.name())?;
        self.sheets.push(sheet);
        Ok(self)
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: WorkbookMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Metadata, if any
    pub fn metadata(&self) -> Option<&WorkbookMetadata> {
        self.metadata.as_ref()
    }

    /// All worksheets, in order
    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// Get a worksheet by index
    pub fn sheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    /// Get a worksheet by name (case-insensitive)
    pub fn sheet_by_name(&self, name: &str) -> Result<&Worksheet> {
        let name_lower = name.to_lowercase();
        self.sheets
            .iter()
            .find(|ws| ws.name().to_lowercase() == name_lower)
            .ok_or_else(|| Error::SheetNotFound(name.into()))
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check that a sheet with this name could be added
    pub fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        let name_lower = name.to_lowercase();
        if self
            .sheets
            .iter()
            .any(|ws| ws.name().to_lowercase() == name_lower)
        {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sheets_in_order() {
        let wb = Workbook::new("Book")
            .add_sheet(Worksheet::new("First"))
            .unwrap()
            .add_sheet(Worksheet::new("Second"))
            .unwrap();
        let names: Vec<_> = wb.sheets().iter().map(Worksheet::name).collect();
        assert_eq!(names, ["First", "Second"]);
        assert_eq!(wb.sheet_count(), 2);
        assert_eq!(wb.sheet_by_name("second").unwrap().name(), "Second");
        assert!(matches!(
            wb.sheet_by_name("Third"),
            Err(Error::SheetNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_sheet_name() {
        let wb = Workbook::new("Book").add_sheet(Worksheet::new("Data")).unwrap();
        assert_eq!(
            wb.add_sheet(Worksheet::new("DATA")).unwrap_err(),
            Error::DuplicateSheetName("DATA".into())
        );
    }

    #[test]
    fn test_invalid_sheet_names() {
        let long = "x".repeat(32);
        for name in ["", "a/b", "what?", "[x]", long.as_str()] {
            let err = Workbook::new("Book")
                .add_sheet(Worksheet::new(name))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidSheetName(_)), "{name:?}");
        }
        assert!(Workbook::new("Book")
            .add_sheet(Worksheet::new("x".repeat(31)))
            .is_ok());
    }

    #[test]
    fn test_metadata() {
        let wb = Workbook::new("Book")
            .with_metadata(WorkbookMetadata::new().with_creator("ops").with_custom("dept", "qa"));
        let meta = wb.metadata().unwrap();
        assert_eq!(meta.creator.as_deref(), Some("ops"));
        assert_eq!(meta.custom.get("dept").map(String::as_str), Some("qa"));
    }
}
