//! # closewatch-ingest
//!
//! Readers for the two exports closewatch reconciles.
//!
//! This crate provides:
//! - `IssueTrackerReader`: Jira spreadsheet export (optional source)
//! - `ChangeSourceReader`: Maximo spreadsheet or CSV export (mandatory source)
//! - `Pipeline`: read both, merge, and classify into `ReportData`
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use closewatch_core::ClosingSystemList;
//! use closewatch_ingest::Pipeline;
//!
//! let pipeline = Pipeline::new(ClosingSystemList::default());
//! let report = pipeline.run(Some(Path::new("Jira.xlsx")), Path::new("exports/"))?;
//! println!("{} changes flagged", report.flagged.len());
//! # Ok::<(), closewatch_core::SourceError>(())
//! ```

pub mod change_source;
pub mod issue_tracker;
mod table;

pub use change_source::{ChangeSourceReader, AUTHORIZED_STATUS, PLACEHOLDER_KEY};
pub use issue_tracker::IssueTrackerReader;

use std::path::Path;

use closewatch_core::{ClosingSystemList, ReportData, SourceError};
use tracing::info;

/// Physical layout of an export file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Spreadsheet container (.xlsx, .xls, .ods)
    Spreadsheet,
    /// Comma-separated UTF-8 text (.csv)
    Delimited,
}

/// Detect file format from extension
pub fn detect_format(path: &Path) -> FileFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("csv" | "txt") => FileFormat::Delimited,
        _ => FileFormat::Spreadsheet,
    }
}

/// One reconciliation run: read, merge, classify
#[derive(Clone, Debug)]
pub struct Pipeline {
    pub issues: IssueTrackerReader,
    pub changes: ChangeSourceReader,
    pub systems: ClosingSystemList,
}

impl Pipeline {
    /// Pipeline with default readers and the given closing systems
    pub fn new(systems: ClosingSystemList) -> Self {
        Self {
            issues: IssueTrackerReader::default(),
            changes: ChangeSourceReader::default(),
            systems,
        }
    }

    /// Replace the issue-tracker reader
    pub fn issue_reader(mut self, reader: IssueTrackerReader) -> Self {
        self.issues = reader;
        self
    }

    /// Replace the change-source reader
    pub fn change_reader(mut self, reader: ChangeSourceReader) -> Self {
        self.changes = reader;
        self
    }

    /// Run against an optional issue export and a change directory or file.
    ///
    /// Only the change source can fail the run.
    pub fn run(
        &self,
        issue_path: Option<&Path>,
        change_path: &Path,
    ) -> Result<ReportData, SourceError> {
        let issues = issue_path.and_then(|path| self.issues.read(path));
        let changes = self.changes.read(change_path)?;
        let report = ReportData::new(issues, changes, &self.systems);

        info!(
            issues = report.issues.as_ref().map(Vec::len),
            changes = report.changes.len(),
            flagged = report.flagged.len(),
            "pipeline: run complete"
        );
        Ok(report)
    }
}
