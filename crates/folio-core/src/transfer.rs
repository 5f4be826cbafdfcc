//! Plain transfer shape for moving workbooks between threads
//!
//! [`serialize`] walks a [`Workbook`] into public-field structs that carry no
//! behaviour; [`rebuild`] turns them back into a validated model. Dates stay
//! typed as [`chrono::NaiveDateTime`] the whole way through and are never
//! converted to text.

use crate::cell::{Cell, CellRange, CellValue};
use crate::error::Result;
use crate::row::Row;
use crate::style::Style;
use crate::workbook::{Workbook, WorkbookMetadata};
use crate::worksheet::Worksheet;

/// Plain form of a [`Workbook`]
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferWorkbook {
    pub name: String,
    pub sheets: Vec<TransferSheet>,
    pub metadata: Option<WorkbookMetadata>,
}

/// Plain form of a [`Worksheet`]
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferSheet {
    pub name: String,
    pub rows: Vec<TransferRow>,
    pub merged_cells: Vec<CellRange>,
    pub column_widths: Vec<(u32, f64)>,
}

/// Plain form of a [`Row`]
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferRow {
    pub cells: Vec<TransferCell>,
    pub height: Option<f64>,
    pub hidden: bool,
}

/// Plain form of a [`Cell`]
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferCell {
    pub value: CellValue,
    pub style: Option<Style>,
}

/// Flatten a workbook into its transfer shape
pub fn serialize(workbook: &Workbook) -> TransferWorkbook {
    TransferWorkbook {
        name: workbook.name().to_string(),
        sheets: workbook.sheets().iter().map(serialize_sheet).collect(),
        metadata: workbook.metadata().cloned(),
    }
}

fn serialize_sheet(sheet: &Worksheet) -> TransferSheet {
    TransferSheet {
        name: sheet.name().to_string(),
        rows: sheet
            .rows()
            .iter()
            .map(|row| TransferRow {
                cells: row
                    .cells()
                    .iter()
                    .map(|cell| TransferCell {
                        value: cell.value.clone(),
                        style: cell.style.clone(),
                    })
                    .collect(),
                height: row.height(),
                hidden: row.is_hidden(),
            })
            .collect(),
        merged_cells: sheet.merged_cells().to_vec(),
        column_widths: sheet
            .column_widths()
            .iter()
            .map(|(col, width)| (*col, *width))
            .collect(),
    }
}

/// Rebuild a workbook from its transfer shape
///
/// The same invariants as building by hand apply: sheet names and merged
/// ranges are validated.
pub fn rebuild(shape: TransferWorkbook) -> Result<Workbook> {
    let mut workbook = Workbook::new(shape.name);
    if let Some(metadata) = shape.metadata {
        workbook = workbook.with_metadata(metadata);
    }
    for sheet in shape.sheets {
        workbook = workbook.add_sheet(rebuild_sheet(sheet)?)?;
    }
    Ok(workbook)
}

fn rebuild_sheet(shape: TransferSheet) -> Result<Worksheet> {
    let rows = shape
        .rows
        .into_iter()
        .map(|row| {
            let cells = row
                .cells
                .into_iter()
                .map(|cell| Cell {
                    value: cell.value,
                    style: cell.style,
                })
                .collect();
            let mut rebuilt = Row::from_cells(cells).with_hidden(row.hidden);
            if let Some(height) = row.height {
                rebuilt = rebuilt.with_height(height);
            }
            rebuilt
        })
        .collect();

    let mut sheet = Worksheet::new(shape.name).with_rows(rows);
    for range in shape.merged_cells {
        let range = CellRange::new(range.start, range.end)?;
        sheet = sheet.with_merged_cell(range)?;
    }
    for (column, width) in shape.column_widths {
        sheet = sheet.with_column_width(column, width);
    }
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::CellAddress;
    use chrono::NaiveDate;

    fn sample() -> Workbook {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let sheet = Worksheet::new("Data")
            .with_row(0, Row::from_values(["when", "ok"]).with_height(18.0))
            .with_row(
                1,
                Row::new()
                    .with_cell(0, Cell::styled(day, Style::new().number_format("yyyy-mm-dd")))
                    .with_cell(1, Cell::new(true)),
            )
            .with_merged_cell(CellRange::parse("C1:D1").unwrap())
            .unwrap()
            .with_column_width(0, 20.0);
        Workbook::new("Shape")
            .with_metadata(WorkbookMetadata::new().with_creator("me"))
            .add_sheet(sheet)
            .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let workbook = sample();
        let rebuilt = rebuild(serialize(&workbook)).unwrap();
        assert_eq!(rebuilt, workbook);
    }

    #[test]
    fn test_dates_stay_typed() {
        let shape = serialize(&sample());
        assert!(shape.sheets[0].rows[1].cells[0].value.is_date());
    }

    #[test]
    fn test_rebuild_validates() {
        let mut shape = serialize(&sample());
        shape.sheets[0].merged_cells.push(CellRange {
            start: CellAddress::new(3, 3),
            end: CellAddress::new(1, 1),
        });
        assert!(matches!(rebuild(shape), Err(Error::InvertedRange(_))));

        let mut shape = serialize(&sample());
        let duplicate = shape.sheets[0].clone();
        shape.sheets.push(duplicate);
        assert!(matches!(rebuild(shape), Err(Error::DuplicateSheetName(_))));
    }
}
