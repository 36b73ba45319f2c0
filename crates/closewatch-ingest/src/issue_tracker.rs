//! Jira issue export reader
//!
//! The issue tracker is an optional source. Its export must carry the
//! canonical column headers verbatim on the configured page; there is no
//! renaming step. Any problem with the file makes the whole source absent.

use std::path::Path;

use closewatch_core::{CanonicalRecord, Column, SourceError};
use tracing::{debug, warn};

use crate::table::{read_sheet, ColumnMap, Table};

/// Page name used by Jira's "Export Excel" action
pub const DEFAULT_ISSUE_SHEET: &str = "Your Jira Issues";

/// Reader for the issue-tracker spreadsheet
#[derive(Clone, Debug)]
pub struct IssueTrackerReader {
    /// Page holding the issue rows
    pub sheet: String,
}

impl Default for IssueTrackerReader {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_ISSUE_SHEET.into(),
        }
    }
}

impl IssueTrackerReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page name to read
    pub fn sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }

    /// Read the export, reporting why it could not be used
    pub fn try_read(&self, path: &Path) -> Result<Vec<CanonicalRecord>, SourceError> {
        let table = read_sheet(path, &self.sheet)?;
        let records = project_issues(&table, path)?;
        debug!(path = %path.display(), rows = records.len(), "issue tracker: read");
        Ok(records)
    }

    /// Read the export, treating every failure as "no data"
    pub fn read(&self, path: &Path) -> Option<Vec<CanonicalRecord>> {
        match self.try_read(path) {
            Ok(records) => Some(records),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "issue tracker: source skipped");
                None
            }
        }
    }
}

fn project_issues(table: &Table, path: &Path) -> Result<Vec<CanonicalRecord>, SourceError> {
    let columns = ColumnMap::resolve(table, Column::from_header).map_err(|missing| {
        SourceError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        }
    })?;

    Ok(table.rows.iter().map(|row| columns.record(row)).collect())
}
