//! Header-plus-rows view over a spreadsheet page or a delimited file

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use closewatch_core::{from_excel_serial, normalize_date, CanonicalRecord, Column, SourceError};
use csv::ReaderBuilder;

/// One input cell, reduced to what the canonical schema can hold
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                if s.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.clone())
                }
            }
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => from_excel_serial(dt.as_f64()).map_or(Cell::Empty, Cell::DateTime),
        }
    }

    fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(field.to_string())
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text form of the cell; empty string when the cell is empty
    pub(crate) fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Date form of the cell; bare numbers are not treated as dates
    pub(crate) fn to_date(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Text(s) => normalize_date(s),
            Cell::Empty | Cell::Number(_) => None,
        }
    }
}

/// Header row plus data rows, in file order
#[derive(Clone, Debug, Default)]
pub(crate) struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Cell at `(row, col)`, empty when the row is short
    pub(crate) fn cell<'a>(row: &'a [Cell], col: usize) -> &'a Cell {
        row.get(col).unwrap_or(&Cell::Empty)
    }
}

/// Position of each canonical column within a table
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    indices: [usize; 7],
}

impl ColumnMap {
    /// Map every canonical column to the first header that `lookup` resolves
    /// to it, or list the headers of the columns that were not found
    pub(crate) fn resolve<F>(table: &Table, lookup: F) -> Result<Self, Vec<String>>
    where
        F: Fn(&str) -> Option<Column>,
    {
        let mut slots: [Option<usize>; 7] = [None; 7];
        for (idx, header) in table.headers.iter().enumerate() {
            if let Some(column) = lookup(header) {
                let slot = &mut slots[column as usize];
                if slot.is_none() {
                    *slot = Some(idx);
                }
            }
        }

        let missing: Vec<String> = Column::ALL
            .iter()
            .zip(slots.iter())
            .filter(|(_, slot)| slot.is_none())
            .map(|(column, _)| column.header().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let mut indices = [0; 7];
        for (target, slot) in indices.iter_mut().zip(slots) {
            *target = slot.unwrap_or_default();
        }
        Ok(Self { indices })
    }

    fn cell<'a>(&self, row: &'a [Cell], column: Column) -> &'a Cell {
        Table::cell(row, self.indices[column as usize])
    }

    /// Project one data row onto the canonical schema
    pub(crate) fn record(&self, row: &[Cell]) -> CanonicalRecord {
        CanonicalRecord {
            key: self.cell(row, Column::Key).to_text(),
            summary: self.cell(row, Column::Summary).to_text(),
            status: self.cell(row, Column::Status).to_text(),
            description: self.cell(row, Column::Description).to_text(),
            reporter: self.cell(row, Column::Reporter).to_text(),
            planned_start: self.cell(row, Column::PlannedStart).to_date(),
            planned_end: self.cell(row, Column::PlannedEnd).to_date(),
        }
    }
}

/// Read one named page of a spreadsheet; the first row is the header.
///
/// Blank rows inside the used range are kept. Callers decide what to drop.
pub(crate) fn read_sheet(path: &Path, sheet: &str) -> Result<Table, SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| SourceError::Unreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(SourceError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| SourceError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| {
            header
                .iter()
                .map(|data| Cell::from_data(data).to_text())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .map(|row| row.iter().map(Cell::from_data).collect())
        .collect();

    Ok(Table { headers, rows })
}

/// Read a UTF-8 comma-separated file; the first record is the header.
///
/// Records made only of separators are kept. Empty lines never reach here.
pub(crate) fn read_delimited(path: &Path) -> Result<Table, SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }

    let unreadable = |e: csv::Error| SourceError::Unreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(unreadable)?;

    let headers = reader
        .headers()
        .map_err(unreadable)?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(unreadable)?;
        rows.push(record.iter().map(Cell::from_field).collect());
    }

    Ok(Table { headers, rows })
}
