//! Shared-string table (sharedStrings.xml)

use ahash::AHashMap;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{decode_excel_escapes, encode_excel_escapes, escape_xml, needs_space_preserve};
use folio_core::{CellValue, Workbook};

/// Deduplicated string table in first-seen order
#[derive(Debug, Default)]
pub struct SharedStringTable {
    strings: Vec<String>,
    index: AHashMap<String, u32>,
    references: usize,
}

impl SharedStringTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every non-empty string cell of a workbook, sheet by sheet,
    /// row by row, left to right
    pub fn collect(workbook: &Workbook) -> Self {
        let mut table = Self::new();
        for sheet in workbook.sheets() {
            for row in sheet.rows() {
                for cell in row.cells() {
                    if let CellValue::String(s) = &cell.value {
                        if !s.is_empty() {
                            table.insert(s);
                        }
                    }
                }
            }
        }
        table
    }

    /// Add a string (if new) and return its index
    pub fn insert(&mut self, s: &str) -> u32 {
        self.references += 1;
        if let Some(&id) = self.index.get(s) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), id);
        id
    }

    /// Index of a string already in the table
    pub fn get(&self, s: &str) -> Option<u32> {
        self.index.get(s).copied()
    }

    /// Number of unique strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table has no strings
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Render the shared-strings part
    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.references,
            self.strings.len()
        );
        for s in &self.strings {
            let text = escape_xml(&encode_excel_escapes(s));
            if needs_space_preserve(&text) {
                xml.push_str(&format!("<si><t xml:space=\"preserve\">{}</t></si>", text));
            } else {
                xml.push_str(&format!("<si><t>{}</t></si>", text));
            }
        }
        xml.push_str("</sst>");
        xml
    }
}

/// Parse a shared-strings part
///
/// Each `<si>` is either a plain `<t>` or a sequence of rich-text runs
/// (`<r><t>`), whose texts are concatenated. Phonetic runs are skipped.
pub(crate) fn read_shared_strings(part: &str, bytes: &[u8]) -> XlsxResult<Vec<String>> {
    let mut xml_reader = Reader::from_reader(bytes);
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current_string = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut phonetic_depth = 0usize;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"si" => {
                    in_si = true;
                    current_string.clear();
                }
                b"rPh" => phonetic_depth += 1,
                b"t" if in_si && phonetic_depth == 0 => in_t = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"si" => {
                    strings.push(decode_excel_escapes(&current_string));
                    current_string.clear();
                    in_si = false;
                }
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_t => {
                let text = e.unescape().map_err(|err| XlsxError::xml(part, err))?;
                current_string.push_str(&text);
            }
            Ok(Event::CData(e)) if in_t => {
                current_string.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::xml(part, e)),
            _ => {}
        }
        buf.clear();
    }

    log::debug!("read {} shared strings from {}", strings.len(), part);
    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Row, Worksheet};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_first_seen_order() {
        let sheet1 = Worksheet::new("A")
            .with_row(0, Row::from_values(["b", "a", "b"]))
            .with_row(1, Row::from_values(["", "c"]));
        let sheet2 = Worksheet::new("B").with_row(0, Row::from_values(["a", "d"]));
        let workbook = Workbook::new("W")
            .add_sheet(sheet1)
            .unwrap()
            .add_sheet(sheet2)
            .unwrap();

        let table = SharedStringTable::collect(&workbook);
        assert_eq!(table.strings, vec!["b", "a", "c", "d"]);
        assert_eq!(table.get("c"), Some(2));
        assert_eq!(table.get(""), None);
        assert_eq!(table.references, 6);
    }

    #[test]
    fn test_to_xml_escapes() {
        let mut table = SharedStringTable::new();
        table.insert("Tom & Jerry");
        table.insert(" padded ");
        table.insert("cr\r");
        table.insert("tab\t");
        let xml = table.to_xml();
        assert!(xml.contains(r#"count="4" uniqueCount="4""#));
        assert!(xml.contains("<si><t>Tom &amp; Jerry</t></si>"));
        assert!(xml.contains(r#"<si><t xml:space="preserve"> padded </t></si>"#));
        assert!(xml.contains("<si><t>cr_x000D_</t></si>"));
        assert!(xml.contains("<si><t xml:space=\"preserve\">tab\t</t></si>"));
    }

    #[test]
    fn test_read_plain_and_rich_text() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4">
  <si><t>Hello</t></si>
  <si><r><rPr><b/></rPr><t>Bold</t></r><r><t xml:space="preserve"> text</t></r></si>
  <si><t>A&amp;B_x000D_</t><rPh sb="0" eb="1"><t>ignored</t></rPh></si>
  <si/>
</sst>"#;
        let strings = read_shared_strings("xl/sharedStrings.xml", xml).unwrap();
        assert_eq!(strings, vec!["Hello", "Bold text", "A&B\r", ""]);
    }

    #[test]
    fn test_write_then_read() {
        let mut table = SharedStringTable::new();
        for s in ["one", "  two", "th<r>ee", "_x0041_"] {
            table.insert(s);
        }
        let strings = read_shared_strings("sst", table.to_xml().as_bytes()).unwrap();
        assert_eq!(strings, vec!["one", "  two", "th<r>ee", "_x0041_"]);
    }

    #[test]
    fn test_malformed_xml() {
        let err = read_shared_strings("xl/sharedStrings.xml", b"<sst><si><t>x</si></sst>")
            .unwrap_err();
        assert!(matches!(err, XlsxError::Xml { .. }));
    }
}
