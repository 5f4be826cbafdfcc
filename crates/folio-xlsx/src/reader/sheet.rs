//! Pull parser for worksheet parts
//!
//! Shared by [`XlsxReader`](super::XlsxReader), which drains every row into a
//! [`Worksheet`], and the streaming reader, which hands rows out one by one.

use std::collections::BTreeMap;
use std::io::Cursor;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::ReadStyles;
use crate::xml::{attr, attr_flag, decode_excel_escapes};
use folio_core::date::excel_number_to_date;
use folio_core::{Cell, CellAddress, CellRange, CellValue, Row, Worksheet};

/// Workbook-level tables every sheet decodes against
#[derive(Debug, Default)]
pub(crate) struct ReadContext {
    pub(crate) shared_strings: Vec<String>,
    pub(crate) styles: ReadStyles,
}

/// A `<c>` element being read
#[derive(Debug, Default)]
struct PendingCell {
    column: usize,
    kind: Option<String>,
    xf: Option<u32>,
    text: Option<String>,
}

/// Forward-only reader over the rows of one worksheet part
pub(crate) struct SheetParser {
    reader: Reader<Cursor<Vec<u8>>>,
    part: String,
    buf: Vec<u8>,
    row: Option<(usize, Row)>,
    cell: Option<PendingCell>,
    next_row: usize,
    last_row: Option<usize>,
    next_column: usize,
    in_value: bool,
    in_inline: bool,
    in_text: bool,
    phonetic_depth: usize,
    merges: Vec<CellRange>,
    widths: BTreeMap<u32, f64>,
    closed: bool,
    done: bool,
}

impl SheetParser {
    pub(crate) fn new(part: String, bytes: Vec<u8>) -> Self {
        let mut reader = Reader::from_reader(Cursor::new(bytes));
        // whitespace inside <t> and <v> is content
        reader.trim_text(false);
        Self {
            reader,
            part,
            buf: Vec::new(),
            row: None,
            cell: None,
            next_row: 0,
            last_row: None,
            next_column: 0,
            in_value: false,
            in_inline: false,
            in_text: false,
            phonetic_depth: 0,
            merges: Vec::new(),
            widths: BTreeMap::new(),
            closed: false,
            done: false,
        }
    }

    /// Read up to the end of the next `<row>`
    ///
    /// Returns `None` once the part is exhausted. Rows are returned in
    /// document order with their zero-based index.
    pub(crate) fn next_row(&mut self, ctx: &ReadContext) -> XlsxResult<Option<(usize, Row)>> {
        if self.done {
            return Ok(None);
        }

        loop {
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| XlsxError::xml(&self.part, e))?;

            let finished = match event {
                Event::Start(e) => {
                    let e = e.into_owned();
                    self.start(&e, false, ctx)?
                }
                Event::Empty(e) => {
                    let e = e.into_owned();
                    self.start(&e, true, ctx)?
                }
                Event::End(e) => {
                    let e = e.into_owned();
                    self.end(e.name().as_ref(), ctx)?
                }
                Event::Text(e) if self.in_value || self.in_text => {
                    let text = e.unescape().map_err(|err| XlsxError::xml(&self.part, err))?;
                    if let Some(cell) = self.cell.as_mut() {
                        cell.text.get_or_insert_with(String::new).push_str(&text);
                    }
                    None
                }
                Event::CData(e) if self.in_value || self.in_text => {
                    if let Some(cell) = self.cell.as_mut() {
                        cell.text
                            .get_or_insert_with(String::new)
                            .push_str(&String::from_utf8_lossy(&e));
                    }
                    None
                }
                Event::Eof => {
                    self.done = true;
                    if !self.closed || self.row.is_some() || self.cell.is_some() {
                        return Err(XlsxError::parse(&self.part, "unexpected end of worksheet"));
                    }
                    None
                }
                _ => None,
            };
            self.buf.clear();

            if let Some(row) = finished {
                return Ok(Some(row));
            }
            if self.done {
                return Ok(None);
            }
        }
    }

    /// Handle an opening (or self-closing) tag; returns a row if one ended
    fn start(
        &mut self,
        e: &BytesStart<'_>,
        empty: bool,
        ctx: &ReadContext,
    ) -> XlsxResult<Option<(usize, Row)>> {
        match e.name().as_ref() {
            b"row" => {
                let index = match attr(e, b"r") {
                    Some(r) => match r.parse::<usize>() {
                        Ok(n) if n >= 1 => n - 1,
                        _ => {
                            return Err(XlsxError::parse(
                                &self.part,
                                format!("invalid row number '{}'", r),
                            ))
                        }
                    },
                    None => self.next_row,
                };
                if let Some(last) = self.last_row.filter(|last| index <= *last) {
                    return Err(XlsxError::parse(
                        &self.part,
                        format!("row {} follows row {}", index + 1, last + 1),
                    ));
                }
                self.last_row = Some(index);
                self.next_row = index + 1;
                self.next_column = 0;

                let mut row = Row::new();
                if attr_flag(e, b"customHeight") {
                    if let Some(ht) = attr(e, b"ht") {
                        let height = ht.parse::<f64>().map_err(|_| {
                            XlsxError::parse(&self.part, format!("invalid row height '{}'", ht))
                        })?;
                        row = row.with_height(height);
                    }
                }
                if attr_flag(e, b"hidden") {
                    row = row.with_hidden(true);
                }

                if empty {
                    return Ok(Some((index, row)));
                }
                self.row = Some((index, row));
            }
            b"c" => {
                let column = match attr(e, b"r") {
                    Some(r) => CellAddress::parse(&r)
                        .map_err(|err| XlsxError::parse(&self.part, err.to_string()))?
                        .column as usize,
                    None => self.next_column,
                };
                self.next_column = column + 1;
                self.cell = Some(PendingCell {
                    column,
                    kind: attr(e, b"t"),
                    xf: parse_index(&self.part, e, b"s")?,
                    text: None,
                });
                if empty {
                    self.finish_cell(ctx)?;
                }
            }
            b"v" => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.text.get_or_insert_with(String::new);
                    self.in_value = !empty;
                }
            }
            b"is" if self.cell.is_some() && !empty => self.in_inline = true,
            b"rPh" if !empty => self.phonetic_depth += 1,
            b"t" if self.in_inline && self.phonetic_depth == 0 => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.text.get_or_insert_with(String::new);
                }
                self.in_text = !empty;
            }
            b"col" => self.read_column(e)?,
            b"mergeCell" => {
                if let Some(reference) = attr(e, b"ref") {
                    let range = CellRange::parse(&reference).map_err(|err| {
                        XlsxError::parse(
                            &self.part,
                            format!("merged range '{}': {}", reference, err),
                        )
                    })?;
                    self.merges.push(range);
                }
            }
            _ => {}
        }
        Ok(None)
    }

    /// Handle a closing tag; returns a row if one ended
    fn end(&mut self, name: &[u8], ctx: &ReadContext) -> XlsxResult<Option<(usize, Row)>> {
        match name {
            b"row" => return Ok(self.row.take()),
            b"c" => self.finish_cell(ctx)?,
            b"v" => self.in_value = false,
            b"is" => self.in_inline = false,
            b"t" => self.in_text = false,
            b"rPh" => self.phonetic_depth = self.phonetic_depth.saturating_sub(1),
            b"worksheet" => self.closed = true,
            _ => {}
        }
        Ok(None)
    }

    fn read_column(&mut self, e: &BytesStart<'_>) -> XlsxResult<()> {
        let Some(width) = attr(e, b"width") else {
            return Ok(());
        };
        let width = width
            .parse::<f64>()
            .map_err(|_| XlsxError::parse(&self.part, format!("invalid column width '{}'", width)))?;
        let min = parse_index(&self.part, e, b"min")?.unwrap_or(1).max(1);
        let max = parse_index(&self.part, e, b"max")?.unwrap_or(min).max(min);
        for column in min..=max {
            self.widths.insert(column - 1, width);
        }
        Ok(())
    }

    fn finish_cell(&mut self, ctx: &ReadContext) -> XlsxResult<()> {
        self.in_value = false;
        self.in_inline = false;
        self.in_text = false;
        let Some(pending) = self.cell.take() else {
            return Ok(());
        };
        let column = pending.column;
        let value = self.decode(pending, ctx)?;

        if let Some((index, row)) = self.row.take() {
            self.row = Some((index, row.with_cell(column, Cell::new(value))));
        }
        Ok(())
    }

    fn decode(&self, cell: PendingCell, ctx: &ReadContext) -> XlsxResult<CellValue> {
        let PendingCell { kind, xf, text, .. } = cell;
        // typed values ignore an empty <v/>
        let typed = text.as_deref().map(str::trim).filter(|t| !t.is_empty());

        match kind.as_deref() {
            Some("s") => {
                let Some(text) = typed else {
                    return Ok(CellValue::Empty);
                };
                let index = text.parse::<usize>().map_err(|_| {
                    XlsxError::parse(&self.part, format!("invalid shared string index '{}'", text))
                })?;
                ctx.shared_strings
                    .get(index)
                    .map(|s| CellValue::String(s.clone()))
                    .ok_or_else(|| {
                        XlsxError::parse(
                            &self.part,
                            format!(
                                "shared string index {} out of range ({} strings)",
                                index,
                                ctx.shared_strings.len()
                            ),
                        )
                    })
            }
            Some("b") => match typed {
                None => Ok(CellValue::Empty),
                Some("1") | Some("true") => Ok(CellValue::Boolean(true)),
                Some("0") | Some("false") => Ok(CellValue::Boolean(false)),
                Some(other) => Err(XlsxError::parse(
                    &self.part,
                    format!("invalid boolean '{}'", other),
                )),
            },
            None | Some("n") => {
                let Some(text) = typed else {
                    return Ok(CellValue::Empty);
                };
                let number = text.parse::<f64>().map_err(|_| {
                    XlsxError::parse(&self.part, format!("invalid number '{}'", text))
                })?;
                if xf.map_or(false, |xf| ctx.styles.is_date_style(xf)) {
                    match excel_number_to_date(number) {
                        Ok(date) => return Ok(CellValue::Date(date)),
                        Err(err) => log::warn!("{}: keeping {} as a number: {}", self.part, number, err),
                    }
                }
                Ok(CellValue::Number(number))
            }
            Some("inlineStr") | Some("str") => Ok(text
                .map(|t| CellValue::String(decode_excel_escapes(&t)))
                .unwrap_or(CellValue::Empty)),
            Some(other) => {
                if other != "e" {
                    log::warn!("{}: unknown cell type '{}', reading as text", self.part, other);
                }
                Ok(text.map(CellValue::String).unwrap_or(CellValue::Empty))
            }
        }
    }

    /// Drain the remaining rows into a worksheet
    pub(crate) fn into_worksheet(mut self, name: &str, ctx: &ReadContext) -> XlsxResult<Worksheet> {
        let mut sheet = Worksheet::new(name);
        while let Some((index, row)) = self.next_row(ctx)? {
            sheet = sheet.with_row(index, row);
        }
        for (column, width) in std::mem::take(&mut self.widths) {
            sheet = sheet.with_column_width(column, width);
        }
        for range in std::mem::take(&mut self.merges) {
            sheet = sheet.with_merged_cell(range)?;
        }
        log::debug!("read sheet '{}' from {} ({} rows)", name, self.part, sheet.row_count());
        Ok(sheet)
    }
}

fn parse_index(part: &str, e: &BytesStart<'_>, key: &[u8]) -> XlsxResult<Option<u32>> {
    match attr(e, key) {
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            XlsxError::parse(
                part,
                format!("invalid {} '{}'", String::from_utf8_lossy(key), value),
            )
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const PART: &str = "xl/worksheets/sheet1.xml";

    fn parse(xml: &str, ctx: &ReadContext) -> XlsxResult<Worksheet> {
        SheetParser::new(PART.to_string(), xml.as_bytes().to_vec()).into_worksheet("S", ctx)
    }

    fn date_context() -> ReadContext {
        let styles = br#"<styleSheet>
            <numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts>
            <cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="164"/><xf numFmtId="2"/></cellXfs>
        </styleSheet>"#;
        ReadContext {
            shared_strings: vec!["alpha".to_string(), "beta".to_string()],
            styles: ReadStyles::parse("xl/styles.xml", styles).unwrap(),
        }
    }

    #[test]
    fn test_cell_types() {
        let ctx = date_context();
        let sheet = parse(
            r#"<worksheet><sheetData>
                <row r="1">
                    <c r="A1" t="s"><v>1</v></c>
                    <c r="B1" t="b"><v>1</v></c>
                    <c r="C1" t="b"><v>false</v></c>
                    <c r="D1"><v>12.5</v></c>
                    <c r="E1" s="1"><v>45293</v></c>
                    <c r="F1" s="2" t="n"><v>3</v></c>
                    <c r="G1" t="inlineStr"><is><t xml:space="preserve"> in line </t></is></c>
                    <c r="H1" t="str"><v></v></c>
                    <c r="I1" t="e"><v>#DIV/0!</v></c>
                </row>
            </sheetData></worksheet>"#,
            &ctx,
        )
        .unwrap();

        let values: Vec<CellValue> = sheet.rows()[0].cells().iter().map(|c| c.value.clone()).collect();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(
            values,
            vec![
                CellValue::String("beta".into()),
                CellValue::Boolean(true),
                CellValue::Boolean(false),
                CellValue::Number(12.5),
                CellValue::Date(day),
                CellValue::Number(3.0),
                CellValue::String(" in line ".into()),
                CellValue::String(String::new()),
                CellValue::String("#DIV/0!".into()),
            ]
        );
    }

    #[test]
    fn test_gaps_are_filled() {
        let ctx = ReadContext::default();
        let sheet = parse(
            r#"<worksheet><sheetData>
                <row r="2"><c r="C2"><v>1</v></c><c><v>2</v></c></row>
                <row r="4" ht="30" customHeight="1" hidden="1"/>
            </sheetData></worksheet>"#,
            &ctx,
        )
        .unwrap();

        assert_eq!(sheet.row_count(), 4);
        assert!(sheet.rows()[0].is_empty());
        let row = &sheet.rows()[1];
        assert_eq!(row.len(), 4);
        assert_eq!(row.cell(0).unwrap().value, CellValue::Empty);
        assert_eq!(row.cell(2).unwrap().value, CellValue::Number(1.0));
        assert_eq!(row.cell(3).unwrap().value, CellValue::Number(2.0));
        assert_eq!(sheet.rows()[3].height(), Some(30.0));
        assert!(sheet.rows()[3].is_hidden());
    }

    #[test]
    fn test_columns_and_merges() {
        let ctx = ReadContext::default();
        let sheet = parse(
            r#"<worksheet>
                <cols><col min="2" max="3" width="20.5" customWidth="1"/><col min="5" max="5"/></cols>
                <sheetData/>
                <mergeCells count="1"><mergeCell ref="A1:C2"/></mergeCells>
            </worksheet>"#,
            &ctx,
        )
        .unwrap();

        assert_eq!(sheet.column_width(1), Some(20.5));
        assert_eq!(sheet.column_width(2), Some(20.5));
        assert_eq!(sheet.column_width(4), None);
        assert_eq!(sheet.merged_cells(), &[CellRange::parse("A1:C2").unwrap()]);
    }

    #[test]
    fn test_streamed_rows() {
        let ctx = ReadContext::default();
        let mut parser = SheetParser::new(
            PART.to_string(),
            br#"<worksheet><sheetData><row><c><v>1</v></c></row><row r="5"/><row/></sheetData></worksheet>"#.to_vec(),
        );
        let indices: Vec<usize> = std::iter::from_fn(|| parser.next_row(&ctx).unwrap())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(indices, vec![0, 4, 5]);
        assert!(parser.next_row(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_bad_content_is_a_parse_error() {
        let ctx = date_context();
        for xml in [
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>7</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="b"><v>yes</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="1"><c r="A1"><v>abc</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="0"/></sheetData></worksheet>"#,
            r#"<worksheet><sheetData/><mergeCells><mergeCell ref="B2:A1"/></mergeCells></worksheet>"#,
        ] {
            let err = parse(xml, &ctx).unwrap_err();
            assert!(matches!(err, XlsxError::Parse { .. }), "{xml}: {err}");
        }
    }

    #[test]
    fn test_truncated_part_is_an_error() {
        let ctx = ReadContext::default();
        for xml in [
            r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1</v></c></row><row r="2"><c r="A2"><v>3</v></c>"#,
            r#"<worksheet><sheetData><row r="1"><c r="A1"><v>1"#,
            r#"<worksheet><sheetData><row r="1"/></sheetData>"#,
        ] {
            let err = parse(xml, &ctx).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Parse, "{xml}: {err}");
        }
    }

    #[test]
    fn test_truncated_part_yields_no_trailing_row() {
        let ctx = ReadContext::default();
        let mut parser = SheetParser::new(
            PART.to_string(),
            br#"<worksheet><sheetData><row r="1"/><row r="2"><c><v>3</v></c>"#.to_vec(),
        );
        assert_eq!(parser.next_row(&ctx).unwrap().map(|(i, _)| i), Some(0));
        assert!(parser.next_row(&ctx).is_err());
    }

    #[test]
    fn test_rows_must_ascend() {
        let ctx = ReadContext::default();
        for xml in [
            r#"<worksheet><sheetData><row r="2"/><row r="2"/></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="3"><c><v>1</v></c></row><row r="1"/></sheetData></worksheet>"#,
        ] {
            let err = parse(xml, &ctx).unwrap_err();
            assert!(matches!(err, XlsxError::Parse { .. }), "{xml}: {err}");
        }
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse("<worksheet><sheetData><row></sheetData>", &ReadContext::default())
            .unwrap_err();
        assert!(matches!(err, XlsxError::Xml { .. }));
    }
}
