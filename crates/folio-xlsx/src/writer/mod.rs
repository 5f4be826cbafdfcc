//! XLSX writer

use std::fs;
use std::path::Path;

use crate::archive;
use crate::error::{XlsxError, XlsxResult};
use crate::options::XlsxWriteOptions;
use crate::shared_strings::SharedStringTable;
use crate::styles::StyleManager;
use crate::xml::escape_xml;
use folio_core::date::date_to_excel_number;
use folio_core::{Cell, CellAddress, CellValue, Workbook, WorkbookMetadata, Worksheet};

const CORE_PROPS: &str = "docProps/core.xml";
const CUSTOM_PROPS: &str = "docProps/custom.xml";

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let bytes = Self::write(workbook)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Write a workbook to an in-memory archive with default options
    pub fn write(workbook: &Workbook) -> XlsxResult<Vec<u8>> {
        Self::write_with_options(workbook, &XlsxWriteOptions::default())
    }

    /// Write a workbook to an in-memory archive
    ///
    /// The output depends only on the workbook and the options: writing the
    /// same workbook twice gives identical bytes.
    pub fn write_with_options(
        workbook: &Workbook,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<Vec<u8>> {
        let parts = Self::build_parts(workbook)?;
        archive::pack(&parts, options)
    }

    /// Render every part, in archive order
    pub(crate) fn build_parts(workbook: &Workbook) -> XlsxResult<Vec<(String, Vec<u8>)>> {
        // Pre-pass: styles and strings in reading order
        let mut styles = StyleManager::new();
        for sheet in workbook.sheets() {
            for (row_idx, row) in sheet.rows().iter().enumerate() {
                for (col_idx, cell) in row.cells().iter().enumerate() {
                    check_font_size(sheet, row_idx, col_idx, cell)?;
                    styles.register_cell(cell);
                }
            }
        }
        let shared_strings = SharedStringTable::collect(workbook);
        log::debug!(
            "writing workbook '{}': {} sheets, {} cell formats, {} shared strings",
            workbook.name(),
            workbook.sheet_count(),
            styles.len(),
            shared_strings.len()
        );

        let has_custom = workbook
            .metadata()
            .map_or(false, |m| !m.custom.is_empty());

        let mut parts = vec![
            part(
                "[Content_Types].xml",
                Self::write_content_types(workbook, has_custom),
            ),
            part("_rels/.rels", Self::write_root_rels(has_custom)),
            part(CORE_PROPS, Self::write_core_props(workbook)),
        ];
        if let Some(metadata) = workbook.metadata().filter(|_| has_custom) {
            parts.push(part(CUSTOM_PROPS, Self::write_custom_props(metadata)));
        }
        parts.push(part("xl/workbook.xml", Self::write_workbook_xml(workbook)));
        parts.push(part(
            "xl/_rels/workbook.xml.rels",
            Self::write_workbook_rels(workbook),
        ));

        let mut sheet_parts = Vec::with_capacity(workbook.sheet_count());
        for (i, sheet) in workbook.sheets().iter().enumerate() {
            sheet_parts.push(part(
                &format!("xl/worksheets/sheet{}.xml", i + 1),
                Self::write_worksheet(sheet, &mut styles, &shared_strings)?,
            ));
        }

        parts.push(part("xl/styles.xml", styles.to_styles_xml()));
        parts.push(part("xl/sharedStrings.xml", shared_strings.to_xml()));
        parts.extend(sheet_parts);
        Ok(parts)
    }

    fn write_content_types(workbook: &Workbook, has_custom: bool) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
        );

        if has_custom {
            content.push_str(
                r#"
    <Override PartName="/docProps/custom.xml" ContentType="application/vnd.openxmlformats-officedocument.custom-properties+xml"/>"#,
            );
        }

        // Add an override for each worksheet
        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");
        content
    }

    fn write_root_rels(has_custom: bool) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
        );
        if has_custom {
            content.push_str(
                r#"
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/custom-properties" Target="docProps/custom.xml"/>"#,
            );
        }
        content.push_str("\n</Relationships>");
        content
    }

    fn write_core_props(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        );
        content.push_str(&format!(
            "\n    <dc:title>{}</dc:title>",
            escape_xml(workbook.name())
        ));

        if let Some(metadata) = workbook.metadata() {
            if let Some(creator) = &metadata.creator {
                content.push_str(&format!(
                    "\n    <dc:creator>{}</dc:creator>",
                    escape_xml(creator)
                ));
            }
            for (tag, timestamp) in [
                ("dcterms:created", metadata.created),
                ("dcterms:modified", metadata.modified),
            ] {
                if let Some(ts) = timestamp {
                    content.push_str(&format!(
                        "\n    <{tag} xsi:type=\"dcterms:W3CDTF\">{}</{tag}>",
                        ts.format("%Y-%m-%dT%H:%M:%SZ")
                    ));
                }
            }
        }

        content.push_str("\n</cp:coreProperties>");
        content
    }

    fn write_custom_props(metadata: &WorkbookMetadata) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/custom-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
        );
        // pids start at 2 by convention
        for (i, (name, value)) in metadata.custom.iter().enumerate() {
            content.push_str(&format!(
                "\n    <property fmtid=\"{{D5CDD505-2E9C-101B-9397-08002B2CF9AE}}\" pid=\"{}\" name=\"{}\"><vt:lpwstr>{}</vt:lpwstr></property>",
                i + 2,
                escape_xml(name),
                escape_xml(value)
            ));
        }
        content.push_str("\n</Properties>");
        content
    }

    fn write_workbook_xml(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );

        for (i, sheet) in workbook.sheets().iter().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );
        content
    }

    fn write_workbook_rels(workbook: &Workbook) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        let styles_rid = workbook.sheet_count() + 1;
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
            styles_rid,
            styles_rid + 1
        ));

        content.push_str("\n</Relationships>");
        content
    }

    fn write_worksheet(
        sheet: &Worksheet,
        styles: &mut StyleManager,
        shared_strings: &SharedStringTable,
    ) -> XlsxResult<String> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        let widths = sheet.column_widths();
        if !widths.is_empty() {
            content.push_str("\n    <cols>");
            for (col, width) in widths {
                content.push_str(&format!(
                    "\n        <col min=\"{}\" max=\"{}\" width=\"{}\" customWidth=\"1\"/>",
                    col + 1,
                    col + 1,
                    width
                ));
            }
            content.push_str("\n    </cols>");
        }

        content.push_str("\n    <sheetData>");
        for (row_idx, row) in sheet.rows().iter().enumerate() {
            if row.is_blank() {
                continue;
            }

            let mut attrs = String::new();
            if let Some(height) = row.height() {
                attrs.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", height));
            }
            if row.is_hidden() {
                attrs.push_str(" hidden=\"1\"");
            }
            content.push_str(&format!("\n        <row r=\"{}\"{}>", row_idx + 1, attrs));

            for (col_idx, cell) in row.cells().iter().enumerate() {
                if cell.is_blank() {
                    continue;
                }

                let cell_ref = CellAddress::new(row_idx as u32, col_idx as u32).to_a1_string();
                let xf_id = styles.register_cell(cell);
                let style_attr = if xf_id != 0 {
                    format!(" s=\"{}\"", xf_id)
                } else {
                    String::new()
                };

                match &cell.value {
                    CellValue::Empty => {
                        content.push_str(&format!("<c r=\"{}\"{}/>", cell_ref, style_attr));
                    }
                    CellValue::String(s) if s.is_empty() => {
                        content.push_str(&format!(
                            "<c r=\"{}\"{} t=\"str\"><v></v></c>",
                            cell_ref, style_attr
                        ));
                    }
                    CellValue::String(s) => {
                        let idx = shared_strings.get(s).ok_or_else(|| {
                            XlsxError::InvalidFormat(format!(
                                "string in {}!{} missing from the shared-string table",
                                sheet.name(),
                                cell_ref
                            ))
                        })?;
                        content.push_str(&format!(
                            "<c r=\"{}\"{} t=\"s\"><v>{}</v></c>",
                            cell_ref, style_attr, idx
                        ));
                    }
                    CellValue::Number(n) => {
                        if !n.is_finite() {
                            return Err(folio_core::Error::validation(format!(
                                "cell {}!{} holds {}, which cannot be stored",
                                sheet.name(),
                                cell_ref,
                                n
                            ))
                            .into());
                        }
                        content.push_str(&format!(
                            "<c r=\"{}\"{}><v>{}</v></c>",
                            cell_ref, style_attr, n
                        ));
                    }
                    CellValue::Boolean(b) => {
                        content.push_str(&format!(
                            "<c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                            cell_ref,
                            style_attr,
                            u8::from(*b)
                        ));
                    }
                    CellValue::Date(d) => {
                        content.push_str(&format!(
                            "<c r=\"{}\"{}><v>{}</v></c>",
                            cell_ref,
                            style_attr,
                            date_to_excel_number(*d)
                        ));
                    }
                }
            }

            content.push_str("</row>");
        }
        content.push_str("\n    </sheetData>");

        let merged = sheet.merged_cells();
        if !merged.is_empty() {
            content.push_str(&format!("\n    <mergeCells count=\"{}\">", merged.len()));
            for range in merged {
                content.push_str(&format!(
                    "\n        <mergeCell ref=\"{}\"/>",
                    range.to_a1_string()
                ));
            }
            content.push_str("\n    </mergeCells>");
        }

        content.push_str("\n</worksheet>");
        log::debug!("wrote sheet '{}' ({} rows)", sheet.name(), sheet.row_count());
        Ok(content)
    }
}

fn check_font_size(sheet: &Worksheet, row: usize, column: usize, cell: &Cell) -> XlsxResult<()> {
    let size = cell
        .style
        .as_ref()
        .and_then(|style| style.font.as_ref())
        .and_then(|font| font.size);
    match size {
        Some(size) if !size.is_finite() => Err(folio_core::Error::validation(format!(
            "cell {}!{} has font size {}, which cannot be stored",
            sheet.name(),
            CellAddress::new(row as u32, column as u32),
            size
        ))
        .into()),
        _ => Ok(()),
    }
}

fn part(name: &str, content: String) -> (String, Vec<u8>) {
    (name.to_string(), content.into_bytes())
}
