//! Maximo change export reader
//!
//! The change source is mandatory: every failure is returned to the caller.
//!
//! A directory is searched for `<stem>.xlsx` (page `Maximo`) first and
//! `<stem>.csv` second. Native Maximo headers are renamed to the canonical
//! schema:
//!
//! | Maximo            | Canonical            |
//! |-------------------|----------------------|
//! | `change_number`   | Key                  |
//! | `summary`         | Summary              |
//! | `status`          | Status               |
//! | `details`         | Description          |
//! | `owner_name`      | Reporter             |
//! | `schedule_start`  | Planned start date   |
//! | `schedule_finish` | Planned end date     |
//!
//! Rows whose key is the `String` type marker are dropped, then only
//! `AUTH` (authorized) changes are kept.

use std::path::{Path, PathBuf};

use closewatch_core::{CanonicalRecord, Column, SourceError};
use tracing::debug;

use crate::table::{read_delimited, read_sheet, ColumnMap, Table};
use crate::{detect_format, FileFormat};

/// File name (without extension) looked up in the change directory
pub const DEFAULT_CHANGE_STEM: &str = "Maximo";

/// Page name inside the spreadsheet variant
pub const DEFAULT_CHANGE_SHEET: &str = "Maximo";

/// The only status kept after filtering
pub const AUTHORIZED_STATUS: &str = "AUTH";

/// Key value of the type-marker row some exports leak into the data
pub const PLACEHOLDER_KEY: &str = "String";

/// Native Maximo header to canonical column
pub const CHANGE_RENAMES: [(&str, Column); 7] = [
    ("change_number", Column::Key),
    ("summary", Column::Summary),
    ("status", Column::Status),
    ("details", Column::Description),
    ("owner_name", Column::Reporter),
    ("schedule_start", Column::PlannedStart),
    ("schedule_finish", Column::PlannedEnd),
];

/// Canonical column for a Maximo header.
///
/// Headers that are already canonical pass through unchanged.
pub fn rename_header(header: &str) -> Option<Column> {
    CHANGE_RENAMES
        .iter()
        .find(|(native, _)| *native == header)
        .map(|(_, column)| *column)
        .or_else(|| Column::from_header(header))
}

/// Reader for the change-management export
#[derive(Clone, Debug)]
pub struct ChangeSourceReader {
    /// File name without extension
    pub file_stem: String,
    /// Page name in the spreadsheet variant
    pub sheet: String,
}

impl Default for ChangeSourceReader {
    fn default() -> Self {
        Self {
            file_stem: DEFAULT_CHANGE_STEM.into(),
            sheet: DEFAULT_CHANGE_SHEET.into(),
        }
    }
}

impl ChangeSourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file name (without extension) to look for
    pub fn file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }

    /// Set the page name of the spreadsheet variant
    pub fn sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }

    /// Find the export in `dir`, spreadsheet first
    pub fn locate(&self, dir: &Path) -> Result<(PathBuf, FileFormat), SourceError> {
        let spreadsheet = dir.join(format!("{}.xlsx", self.file_stem));
        if spreadsheet.is_file() {
            return Ok((spreadsheet, FileFormat::Spreadsheet));
        }

        let delimited = dir.join(format!("{}.csv", self.file_stem));
        if delimited.is_file() {
            return Ok((delimited, FileFormat::Delimited));
        }

        Err(SourceError::NotFound(dir.join(&self.file_stem)))
    }

    /// Read the export from a directory, or from a file named directly
    pub fn read(&self, path: &Path) -> Result<Vec<CanonicalRecord>, SourceError> {
        let (file, format) = if path.is_dir() {
            self.locate(path)?
        } else {
            (path.to_path_buf(), detect_format(path))
        };
        self.read_file(&file, format)
    }

    /// Read one export file of a known format
    pub fn read_file(
        &self,
        path: &Path,
        format: FileFormat,
    ) -> Result<Vec<CanonicalRecord>, SourceError> {
        let table = match format {
            FileFormat::Spreadsheet => read_sheet(path, &self.sheet)?,
            FileFormat::Delimited => read_delimited(path)?,
        };
        let records = normalize_changes(&table, path)?;
        debug!(
            path = %path.display(),
            format = ?format,
            rows = table.rows.len(),
            kept = records.len(),
            "change source: read"
        );
        Ok(records)
    }
}

fn normalize_changes(table: &Table, path: &Path) -> Result<Vec<CanonicalRecord>, SourceError> {
    let columns =
        ColumnMap::resolve(table, rename_header).map_err(|missing| SourceError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        })?;

    let records = table
        .rows
        .iter()
        .map(|row| columns.record(row))
        .filter(|record| record.key != PLACEHOLDER_KEY)
        .filter(|record| record.status == AUTHORIZED_STATUS)
        .collect();

    Ok(records)
}
