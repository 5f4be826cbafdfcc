//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;

use ahash::AHashMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{attr, escape_xml};
use folio_core::date::is_date_format;
use folio_core::style::number_format::{
    builtin_format_code, builtin_format_id, DATE_FORMAT_ID, FIRST_CUSTOM_FORMAT_ID,
};
use folio_core::{
    Alignment, BorderEdge, BorderStyle, Cell, CellValue, Color, FillStyle, FontStyle,
    PatternType, Style, Underline,
};

// === Writing ===

/// A composite `cellXfs` record
#[derive(Debug, Clone, Default)]
struct CellXf {
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    alignment: Option<Alignment>,
}

/// Workbook-wide style table
///
/// Fonts, fills and borders are deduplicated independently; each distinct
/// [`Style`] value becomes one `cellXfs` record. Indices are assigned in
/// registration order, so registering a workbook's cells in reading order
/// always produces the same table.
#[derive(Debug)]
pub struct StyleManager {
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<BorderStyle>,
    num_fmts: Vec<(u32, String)>,
    cell_xfs: Vec<CellXf>,
    cache: AHashMap<Style, u32>,
}

impl Default for StyleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleManager {
    /// Create a table holding only the entries the format requires
    pub fn new() -> Self {
        Self {
            fonts: vec![FontStyle::default()],
            // fill 0 is "none" and fill 1 the mandatory gray125 placeholder
            fills: vec![
                FillStyle::default(),
                FillStyle {
                    pattern: Some(PatternType::Gray125),
                    ..FillStyle::default()
                },
            ],
            borders: vec![BorderStyle::default()],
            num_fmts: Vec::new(),
            cell_xfs: vec![CellXf::default()],
            cache: AHashMap::new(),
        }
    }

    /// Register a style and return its `cellXfs` index (0 for no style)
    pub fn register(&mut self, style: Option<&Style>) -> u32 {
        let Some(style) = style else {
            return 0;
        };
        if let Some(&id) = self.cache.get(style) {
            return id;
        }

        let font_id = style
            .font
            .as_ref()
            .map_or(0, |font| intern(&mut self.fonts, font));
        let fill_id = style
            .fill
            .as_ref()
            .map_or(0, |fill| intern(&mut self.fills, fill));
        let border_id = style
            .border
            .as_ref()
            .map_or(0, |border| intern(&mut self.borders, border));
        let num_fmt_id = style
            .number_format
            .as_deref()
            .map_or(0, |code| self.number_format_id(code));

        let id = self.cell_xfs.len() as u32;
        self.cell_xfs.push(CellXf {
            num_fmt_id,
            font_id,
            fill_id,
            border_id,
            alignment: style.alignment.filter(|a| *a != Alignment::default()),
        });
        self.cache.insert(style.clone(), id);
        id
    }

    /// Register the style a cell is written with
    ///
    /// Date cells need a date number format for the value to read back as a
    /// date; when their style has none, the short date format is merged in.
    pub fn register_cell(&mut self, cell: &Cell) -> u32 {
        if !matches!(cell.value, CellValue::Date(_)) {
            return self.register(cell.style.as_ref());
        }

        let has_date_format = cell
            .style
            .as_ref()
            .and_then(|s| s.number_format.as_deref())
            .map_or(false, |code| {
                let id = builtin_format_id(code).unwrap_or(FIRST_CUSTOM_FORMAT_ID);
                is_date_format(id, Some(code))
            });
        if has_date_format {
            return self.register(cell.style.as_ref());
        }

        let date_format =
            Style::new().number_format(builtin_format_code(DATE_FORMAT_ID).unwrap_or("mm-dd-yy"));
        let style = match &cell.style {
            Some(style) => style.merge(&date_format),
            None => date_format,
        };
        self.register(Some(&style))
    }

    /// Number of `cellXfs` records, including the default one
    pub fn len(&self) -> usize {
        self.cell_xfs.len()
    }

    /// Always false: the default record is present from construction
    pub fn is_empty(&self) -> bool {
        self.cell_xfs.is_empty()
    }

    fn number_format_id(&mut self, code: &str) -> u32 {
        if let Some(id) = builtin_format_id(code) {
            return id;
        }
        if let Some((id, _)) = self.num_fmts.iter().find(|(_, c)| c == code) {
            return *id;
        }
        let id = FIRST_CUSTOM_FORMAT_ID + self.num_fmts.len() as u32;
        self.num_fmts.push((id, code.to_string()));
        id
    }

    /// Render the styles part
    pub fn to_styles_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !self.num_fmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", self.num_fmts.len()));
            for (id, code) in &self.num_fmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        // Fonts
        xml.push_str(&format!("\n  <fonts count=\"{}\">", self.fonts.len()));
        for font in &self.fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        // Fills
        xml.push_str(&format!("\n  <fills count=\"{}\">", self.fills.len()));
        for fill in &self.fills {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        // Borders
        xml.push_str(&format!("\n  <borders count=\"{}\">", self.borders.len()));
        for border in &self.borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.cell_xfs.len()));
        for xf in &self.cell_xfs {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(xf));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

/// Index of `item` in `items`, appending it if absent
fn intern<T: PartialEq + Clone>(items: &mut Vec<T>, item: &T) -> u32 {
    match items.iter().position(|existing| existing == item) {
        Some(i) => i as u32,
        None => {
            items.push(item.clone());
            (items.len() - 1) as u32
        }
    }
}

fn write_color(tag: &str, color: &Color) -> String {
    match color {
        Color::Rgb { .. } | Color::Argb { .. } => {
            format!("<{tag} rgb=\"{}\"/>", color.to_argb_hex().unwrap_or_default())
        }
        Color::Indexed(i) => format!("<{tag} indexed=\"{}\"/>", i),
        Color::Theme { index, tint } => {
            if *tint == 0 {
                format!("<{tag} theme=\"{}\"/>", index)
            } else {
                format!(
                    "<{tag} theme=\"{}\" tint=\"{}\"/>",
                    index,
                    (*tint as f64) / 100.0
                )
            }
        }
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold == Some(true) {
        s.push_str("<b/>");
    }
    if font.italic == Some(true) {
        s.push_str("<i/>");
    }
    if font.strikethrough == Some(true) {
        s.push_str("<strike/>");
    }
    match font.underline {
        None | Some(Underline::None) => {}
        Some(Underline::Single) => s.push_str("<u/>"),
        Some(Underline::Double) => s.push_str("<u val=\"double\"/>"),
        Some(Underline::SingleAccounting) => s.push_str("<u val=\"singleAccounting\"/>"),
        Some(Underline::DoubleAccounting) => s.push_str("<u val=\"doubleAccounting\"/>"),
    }
    s.push_str(&format!(
        "<sz val=\"{}\"/>",
        font.size.unwrap_or(FontStyle::DEFAULT_SIZE)
    ));
    if let Some(color) = &font.color {
        s.push_str(&write_color("color", color));
    }
    s.push_str(&format!(
        "<name val=\"{}\"/>",
        escape_xml(font.name.as_deref().unwrap_or(FontStyle::DEFAULT_NAME))
    ));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    let pattern = fill.effective_pattern();
    if pattern == PatternType::None {
        return "<fill><patternFill patternType=\"none\"/></fill>".to_string();
    }
    if fill.fg_color.is_none() && fill.bg_color.is_none() {
        return format!("<fill><patternFill patternType=\"{}\"/></fill>", pattern.as_str());
    }

    let mut s = format!("<fill><patternFill patternType=\"{}\">", pattern.as_str());
    if let Some(fg) = &fill.fg_color {
        s.push_str(&write_color("fgColor", fg));
    }
    match &fill.bg_color {
        Some(bg) => s.push_str(&write_color("bgColor", bg)),
        None => s.push_str("<bgColor indexed=\"64\"/>"),
    }
    s.push_str("</patternFill></fill>");
    s
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge {
        Some(e) if e.style != folio_core::BorderLineStyle::None => {
            let mut s = format!("<{tag} style=\"{}\">", e.style.as_str());
            match &e.color {
                Some(color) => s.push_str(&write_color("color", color)),
                None => s.push_str("<color auto=\"1\"/>"),
            }
            s.push_str(&format!("</{tag}>"));
            s
        }
        _ => format!("<{tag}/>"),
    }
}

fn write_border(border: &BorderStyle) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str("<diagonal/>");
    s.push_str("</border>");
    s
}

fn write_alignment(al: &Alignment) -> String {
    let mut s = String::from("<alignment");
    if let Some(h) = al.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", h.as_str()));
    }
    if let Some(v) = al.vertical {
        s.push_str(&format!(" vertical=\"{}\"", v.as_str()));
    }
    if let Some(wrap) = al.wrap_text {
        s.push_str(&format!(" wrapText=\"{}\"", u8::from(wrap)));
    }
    if let Some(indent) = al.indent {
        s.push_str(&format!(" indent=\"{}\"", indent));
    }
    if let Some(rotation) = al.rotation {
        s.push_str(&format!(" textRotation=\"{}\"", rotation));
    }
    s.push_str("/>");
    s
}

fn write_xf(xf: &CellXf) -> String {
    let mut attrs = String::new();
    if xf.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if xf.font_id != 0 {
        attrs.push_str(" applyFont=\"1\"");
    }
    if xf.fill_id != 0 {
        attrs.push_str(" applyFill=\"1\"");
    }
    if xf.border_id != 0 {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if xf.alignment.is_some() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        xf.num_fmt_id, xf.font_id, xf.fill_id, xf.border_id, attrs
    );
    match &xf.alignment {
        Some(alignment) => {
            s.push('>');
            s.push_str(&write_alignment(alignment));
            s.push_str("</xf>");
        }
        None => s.push_str("/>"),
    }
    s
}

// === Reading ===

/// The slice of a styles part the reader needs: which `cellXfs` entries
/// carry a date format.
#[derive(Debug, Default)]
pub(crate) struct ReadStyles {
    date_xfs: Vec<bool>,
}

impl ReadStyles {
    /// Parse the `numFmts` and `cellXfs` sections of a styles part
    pub(crate) fn parse(part: &str, bytes: &[u8]) -> XlsxResult<Self> {
        let mut xml_reader = Reader::from_reader(bytes);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut custom_formats: HashMap<u32, String> = HashMap::new();
        let mut xf_formats: Vec<u32> = Vec::new();
        let mut in_cell_xfs = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"numFmt" => {
                        if let (Some(id), Some(code)) =
                            (parse_id(part, &e, b"numFmtId")?, attr(&e, b"formatCode"))
                        {
                            custom_formats.insert(id, code);
                        }
                    }
                    b"cellXfs" => in_cell_xfs = true,
                    b"xf" if in_cell_xfs => {
                        xf_formats.push(parse_id(part, &e, b"numFmtId")?.unwrap_or(0));
                    }
                    _ => {}
                },
                Ok(Event::End(e)) if e.name().as_ref() == b"cellXfs" => in_cell_xfs = false,
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::xml(part, e)),
                _ => {}
            }
            buf.clear();
        }

        let date_xfs = xf_formats
            .iter()
            .map(|id| is_date_format(*id, custom_formats.get(id).map(String::as_str)))
            .collect();
        Ok(Self { date_xfs })
    }

    /// Whether cells using `cellXfs[xf]` hold dates
    pub(crate) fn is_date_style(&self, xf: u32) -> bool {
        self.date_xfs.get(xf as usize).copied().unwrap_or(false)
    }
}

fn parse_id(part: &str, e: &BytesStart<'_>, key: &[u8]) -> XlsxResult<Option<u32>> {
    match attr(e, key) {
        Some(value) => value.parse().map(Some).map_err(|_| {
            let key = String::from_utf8_lossy(key);
            XlsxError::parse(part, format!("invalid {} '{}'", key, value))
        }),
        None => Ok(None),
    }
}
