use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::{BatchError, Result};

/// A spreadsheet reduced to text: a header row and the rows under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1-based row in the sheet, counting the header
    pub number: usize,
    pub cells: Vec<String>,
}

impl Table {
    /// Take the first row as headers. Rows with nothing but blank cells are dropped.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self> {
        Self::from_rows_at(rows, 1)
    }

    /// Like `from_rows`, for a sheet whose header sits on row `header_row`
    pub fn from_rows_at(rows: Vec<Vec<String>>, header_row: usize) -> Result<Self> {
        let mut rows = rows.into_iter();
        let headers = rows
            .next()
            .ok_or(BatchError::MissingHeader)?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let rows = rows
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|cell| !cell.trim().is_empty()))
            .map(|(index, cells)| TableRow {
                number: header_row + index + 1,
                cells,
            })
            .collect();

        Ok(Self { headers, rows })
    }
}

/// Read the first worksheet of an xlsx/xls/xlsm/ods workbook
pub fn read_table(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(BatchError::MissingHeader)??;

    // calamine trims leading empty rows off the range
    let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Table::from_rows_at(rows, header_row)
}

/// Render a cell the way it reads in the sheet; whole floats lose the `.0`
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
