//! XLSX reader

mod sheet;

pub(crate) use sheet::{ReadContext, SheetParser};

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use chrono::{DateTime, NaiveDateTime};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::archive::{self, Parts};
use crate::error::{XlsxError, XlsxResult};
use crate::options::XlsxReadOptions;
use crate::shared_strings::read_shared_strings;
use crate::styles::ReadStyles;
use crate::xml::attr;
use folio_core::{Workbook, WorkbookMetadata};

const CONTENT_TYPES: &str = "[Content_Types].xml";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const STYLES: &str = "xl/styles.xml";
const CORE_PROPS: &str = "docProps/core.xml";
const CUSTOM_PROPS: &str = "docProps/custom.xml";

/// Name given to a workbook whose archive carries no title
pub const DEFAULT_WORKBOOK_NAME: &str = "Workbook";

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    ///
    /// A file without a stored title is named after its file stem.
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let fallback = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_WORKBOOK_NAME.to_string());
        let package = Package::open(&bytes, &XlsxReadOptions::default())?;
        Self::build(package, &fallback)
    }

    /// Read a workbook from an in-memory archive
    pub fn read(bytes: &[u8]) -> XlsxResult<Workbook> {
        Self::read_with_options(bytes, &XlsxReadOptions::default())
    }

    /// Read a workbook from an in-memory archive with explicit options
    pub fn read_with_options(bytes: &[u8], options: &XlsxReadOptions) -> XlsxResult<Workbook> {
        let package = Package::open(bytes, options)?;
        Self::build(package, DEFAULT_WORKBOOK_NAME)
    }

    fn build(mut package: Package, fallback_name: &str) -> XlsxResult<Workbook> {
        let name = package.title.take().unwrap_or_else(|| fallback_name.to_string());
        let mut workbook = Workbook::new(name);
        if let Some(metadata) = package.metadata.take() {
            workbook = workbook.with_metadata(metadata);
        }

        for entry in std::mem::take(&mut package.sheets) {
            let parser = package.sheet_parser(&entry)?;
            let worksheet = parser.into_worksheet(&entry.name, &package.context)?;
            workbook = workbook.add_sheet(worksheet)?;
        }

        Ok(workbook)
    }
}

/// A sheet listed by the workbook part, resolved to its archive path
#[derive(Debug, Clone)]
pub(crate) struct SheetEntry {
    pub(crate) name: String,
    pub(crate) path: String,
}

/// An unpacked archive with its workbook-level parts parsed
pub(crate) struct Package {
    parts: Parts,
    pub(crate) context: ReadContext,
    pub(crate) sheets: Vec<SheetEntry>,
    pub(crate) title: Option<String>,
    pub(crate) metadata: Option<WorkbookMetadata>,
}

impl Package {
    pub(crate) fn open(bytes: &[u8], options: &XlsxReadOptions) -> XlsxResult<Self> {
        let parts = archive::unpack(bytes, options)?;

        // Verify this is an XLSX file
        for required in [CONTENT_TYPES, WORKBOOK, WORKBOOK_RELS] {
            if !parts.contains_key(required) {
                return Err(XlsxError::MissingPart(required.to_string()));
            }
        }

        let shared_strings = match parts.get(SHARED_STRINGS) {
            Some(bytes) => read_shared_strings(SHARED_STRINGS, bytes)?,
            None => Vec::new(),
        };
        let styles = match parts.get(STYLES) {
            Some(bytes) => ReadStyles::parse(STYLES, bytes)?,
            None => ReadStyles::default(),
        };

        let listed = read_workbook_sheets(&parts[WORKBOOK])?;
        let targets = read_workbook_rels(&parts[WORKBOOK_RELS])?;
        let mut sheets = Vec::with_capacity(listed.len());
        for (name, r_id) in listed {
            let Some(path) = targets.get(&r_id) else {
                return Err(XlsxError::parse(
                    WORKBOOK_RELS,
                    format!("sheet '{}' references unknown relationship {}", name, r_id),
                ));
            };
            if !parts.contains_key(path) {
                return Err(XlsxError::MissingPart(path.clone()));
            }
            sheets.push(SheetEntry {
                name,
                path: path.clone(),
            });
        }

        let core = match parts.get(CORE_PROPS) {
            Some(bytes) => read_core_props(bytes)?,
            None => CoreProps::default(),
        };
        let custom = match parts.get(CUSTOM_PROPS) {
            Some(bytes) => read_custom_props(bytes)?,
            None => Vec::new(),
        };

        let has_metadata = core.creator.is_some()
            || core.created.is_some()
            || core.modified.is_some()
            || !custom.is_empty();
        let metadata = has_metadata.then(|| WorkbookMetadata {
            creator: core.creator,
            created: core.created,
            modified: core.modified,
            custom: custom.into_iter().collect(),
        });

        log::debug!(
            "opened archive: {} parts, {} sheets, {} shared strings",
            parts.len(),
            sheets.len(),
            shared_strings.len()
        );

        Ok(Self {
            parts,
            context: ReadContext {
                shared_strings,
                styles,
            },
            sheets,
            title: core.title,
            metadata,
        })
    }

    /// Take a sheet's bytes out of the package and start parsing them
    ///
    /// Each sheet part can be taken once; the bytes are released as soon as
    /// the returned parser is dropped.
    pub(crate) fn sheet_parser(&mut self, entry: &SheetEntry) -> XlsxResult<SheetParser> {
        let bytes = self
            .parts
            .remove(&entry.path)
            .ok_or_else(|| XlsxError::MissingPart(entry.path.clone()))?;
        Ok(SheetParser::new(entry.path.clone(), bytes))
    }
}

/// Read workbook.xml to get sheet names and rIds
fn read_workbook_sheets(bytes: &[u8]) -> XlsxResult<Vec<(String, String)>> {
    let mut xml_reader = Reader::from_reader(bytes);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                let name = attr(&e, b"name")
                    .ok_or_else(|| XlsxError::parse(WORKBOOK, "sheet without a name"))?;
                let r_id = attr(&e, b"r:id").ok_or_else(|| {
                    XlsxError::parse(WORKBOOK, format!("sheet '{}' has no r:id", name))
                })?;
                sheets.push((name, r_id));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::xml(WORKBOOK, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Read workbook.xml.rels to get worksheet paths by relationship id
fn read_workbook_rels(bytes: &[u8]) -> XlsxResult<AHashMap<String, String>> {
    let mut xml_reader = Reader::from_reader(bytes);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = AHashMap::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"Relationship" => {
                let id = attr(&e, b"Id");
                let target = attr(&e, b"Target");
                let rel_type = attr(&e, b"Type");

                // Only worksheet relationships matter here
                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                    if rel_type.ends_with("/worksheet") {
                        // Target is relative to the xl/ folder unless absolute
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("xl/{}", target),
                        };
                        rels.insert(id, full_path);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::xml(WORKBOOK_RELS, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

#[derive(Debug, Default)]
struct CoreProps {
    title: Option<String>,
    creator: Option<String>,
    created: Option<NaiveDateTime>,
    modified: Option<NaiveDateTime>,
}

fn read_core_props(bytes: &[u8]) -> XlsxResult<CoreProps> {
    let mut xml_reader = Reader::from_reader(bytes);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut props = CoreProps::default();
    let mut field: Option<Vec<u8>> = None;
    let mut text = String::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                field = Some(e.local_name().as_ref().to_vec());
                text.clear();
            }
            Ok(Event::Text(e)) if field.is_some() => {
                let t = e.unescape().map_err(|err| XlsxError::xml(CORE_PROPS, err))?;
                text.push_str(&t);
            }
            Ok(Event::End(_)) => {
                match field.take().as_deref() {
                    Some(b"title") => props.title = Some(std::mem::take(&mut text)),
                    Some(b"creator") => props.creator = Some(std::mem::take(&mut text)),
                    Some(b"created") => props.created = Some(parse_timestamp(&text)?),
                    Some(b"modified") => props.modified = Some(parse_timestamp(&text)?),
                    _ => {}
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::xml(CORE_PROPS, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(props)
}

/// W3CDTF timestamp, with or without an offset
fn parse_timestamp(s: &str) -> XlsxResult<NaiveDateTime> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| XlsxError::parse(CORE_PROPS, format!("invalid timestamp '{}'", s)))
}

/// Custom properties as (name, text value) pairs
fn read_custom_props(bytes: &[u8]) -> XlsxResult<Vec<(String, String)>> {
    let mut xml_reader = Reader::from_reader(bytes);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut props = Vec::new();
    let mut current: Option<(String, String)> = None;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"property" => {
                current = attr(&e, b"name").map(|name| (name, String::new()));
            }
            Ok(Event::Text(e)) => {
                if let Some((_, value)) = current.as_mut() {
                    let t = e.unescape().map_err(|err| XlsxError::xml(CUSTOM_PROPS, err))?;
                    value.push_str(&t);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"property" => {
                props.extend(current.take());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::xml(CUSTOM_PROPS, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::XlsxWriteOptions;
    use chrono::NaiveDate;
    use folio_core::CellValue;
    use pretty_assertions::assert_eq;

    const MINIMAL_TYPES: &str = r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

    fn workbook_xml(sheets: &[(&str, &str)]) -> String {
        let mut xml = String::from(r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
        for (i, (name, r_id)) in sheets.iter().enumerate() {
            xml.push_str(&format!(r#"<sheet name="{}" sheetId="{}" r:id="{}"/>"#, name, i + 1, r_id));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn rels_xml(targets: &[(&str, &str)]) -> String {
        let mut xml = String::from(r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
        for (id, target) in targets {
            xml.push_str(&format!(r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="{}"/>"#, id, target));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn archive(parts: &[(&str, String)]) -> Vec<u8> {
        let parts: Vec<(String, Vec<u8>)> = parts
            .iter()
            .map(|(name, content)| (name.to_string(), content.clone().into_bytes()))
            .collect();
        archive::pack(&parts, &XlsxWriteOptions::default()).unwrap()
    }

    const SHEET: &str = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>hi</t></is></c></row></sheetData></worksheet>"#;

    #[test]
    fn test_read_minimal_archive() {
        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (WORKBOOK, workbook_xml(&[("Only", "rId1")])),
            (WORKBOOK_RELS, rels_xml(&[("rId1", "worksheets/sheet1.xml")])),
            ("xl/worksheets/sheet1.xml", SHEET.to_string()),
        ]);

        let workbook = XlsxReader::read(&bytes).unwrap();
        assert_eq!(workbook.name(), DEFAULT_WORKBOOK_NAME);
        assert!(workbook.metadata().is_none());
        let sheet = workbook.sheet_by_name("Only").unwrap();
        assert_eq!(
            sheet.get_cell(0, 0).unwrap().value,
            CellValue::String("hi".into())
        );
    }

    #[test]
    fn test_absolute_targets() {
        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (WORKBOOK, workbook_xml(&[("Real", "rId1")])),
            (WORKBOOK_RELS, rels_xml(&[("rId1", "/xl/worksheets/data.xml")])),
            ("xl/worksheets/data.xml", SHEET.to_string()),
        ]);

        let workbook = XlsxReader::read(&bytes).unwrap();
        let names: Vec<&str> = workbook.sheets().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Real"]);
    }

    #[test]
    fn test_unknown_relationship_is_an_error() {
        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (WORKBOOK, workbook_xml(&[("Ghost", "rId9"), ("Real", "rId1")])),
            (WORKBOOK_RELS, rels_xml(&[("rId1", "worksheets/sheet1.xml")])),
            ("xl/worksheets/sheet1.xml", SHEET.to_string()),
        ]);

        let err = XlsxReader::read(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        match &err {
            XlsxError::Parse { part, message } => {
                assert_eq!(part, WORKBOOK_RELS);
                assert!(message.contains("rId9"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(crate::StreamingReader::open(&bytes).is_err());
    }

    #[test]
    fn test_truncated_sheet_is_an_error() {
        let truncated = r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1</v></c></row><row r="2"><c r="A2"><v>3</v></c>"#;
        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (WORKBOOK, workbook_xml(&[("Cut", "rId1")])),
            (WORKBOOK_RELS, rels_xml(&[("rId1", "worksheets/sheet1.xml")])),
            ("xl/worksheets/sheet1.xml", truncated.to_string()),
        ]);

        let err = XlsxReader::read(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_missing_parts() {
        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (WORKBOOK, workbook_xml(&[])),
        ]);
        let err = XlsxReader::read(&bytes).unwrap_err();
        assert!(matches!(&err, XlsxError::MissingPart(p) if p == WORKBOOK_RELS));
        assert_eq!(err.kind(), ErrorKind::FileFormat);

        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (WORKBOOK, workbook_xml(&[("S", "rId1")])),
            (WORKBOOK_RELS, rels_xml(&[("rId1", "worksheets/sheet1.xml")])),
        ]);
        let err = XlsxReader::read(&bytes).unwrap_err();
        assert!(matches!(&err, XlsxError::MissingPart(p) if p == "xl/worksheets/sheet1.xml"));
    }

    #[test]
    fn test_not_an_archive() {
        let err = XlsxReader::read(b"definitely not a zip file").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileFormat);
    }

    #[test]
    fn test_malformed_workbook_part() {
        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (WORKBOOK, "<workbook><sheets></workbook>".to_string()),
            (WORKBOOK_RELS, rels_xml(&[])),
        ]);
        let err = XlsxReader::read(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_document_properties() {
        let core = r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
            <dc:title>Budget &amp; Plan</dc:title>
            <dc:creator>ops</dc:creator>
            <dcterms:created xsi:type="dcterms:W3CDTF">2021-03-04T05:06:07Z</dcterms:created>
            <dcterms:modified xsi:type="dcterms:W3CDTF">2021-03-05T00:00:00+02:00</dcterms:modified>
        </cp:coreProperties>"#;
        let custom = r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/custom-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
            <property fmtid="{D5CDD505-2E9C-101B-9397-08002B2CF9AE}" pid="2" name="team"><vt:lpwstr>infra</vt:lpwstr></property>
            <property fmtid="{D5CDD505-2E9C-101B-9397-08002B2CF9AE}" pid="3" name="year"><vt:i4>2021</vt:i4></property>
        </Properties>"#;
        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (CORE_PROPS, core.to_string()),
            (CUSTOM_PROPS, custom.to_string()),
            (WORKBOOK, workbook_xml(&[])),
            (WORKBOOK_RELS, rels_xml(&[])),
        ]);

        let workbook = XlsxReader::read(&bytes).unwrap();
        assert_eq!(workbook.name(), "Budget & Plan");
        let metadata = workbook.metadata().unwrap();
        assert_eq!(metadata.creator.as_deref(), Some("ops"));
        let day = |d: u32, h: u32| NaiveDate::from_ymd_opt(2021, 3, d).unwrap().and_hms_opt(h, 0, 0).unwrap();
        assert_eq!(metadata.created, Some(day(4, 5) + chrono::Duration::seconds(6 * 60 + 7)));
        assert_eq!(metadata.modified, Some(day(4, 22)));
        assert_eq!(metadata.custom.get("team").map(String::as_str), Some("infra"));
        assert_eq!(metadata.custom.get("year").map(String::as_str), Some("2021"));
    }

    #[test]
    fn test_bad_timestamp() {
        let core = r#"<cp:coreProperties xmlns:cp="x" xmlns:dcterms="y"><dcterms:created>yesterday</dcterms:created></cp:coreProperties>"#;
        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (CORE_PROPS, core.to_string()),
            (WORKBOOK, workbook_xml(&[])),
            (WORKBOOK_RELS, rels_xml(&[])),
        ]);
        let err = XlsxReader::read(&bytes).unwrap_err();
        assert!(matches!(err, XlsxError::Parse { ref part, .. } if part == CORE_PROPS));
    }

    #[test]
    fn test_part_size_ceiling() {
        let bytes = archive(&[
            (CONTENT_TYPES, MINIMAL_TYPES.to_string()),
            (WORKBOOK, workbook_xml(&[("S", "rId1")])),
            (WORKBOOK_RELS, rels_xml(&[("rId1", "worksheets/sheet1.xml")])),
            ("xl/worksheets/sheet1.xml", SHEET.to_string()),
        ]);
        let options = XlsxReadOptions::default().with_max_part_size(64);
        let err = XlsxReader::read_with_options(&bytes, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Memory);
    }
}
