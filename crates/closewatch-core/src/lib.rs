//! # closewatch-core
//!
//! Core domain model for the closewatch month-end closing checker.
//!
//! This crate provides:
//! - Domain types: `CanonicalRecord`, `Column`, `ReportData`
//! - Date normalization for heterogeneous export formats (`date`)
//! - The closing-window classification rule (`closing`)
//! - Core traits: `ReportRenderer`
//! - Error types shared by the ingest and render crates
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use closewatch_core::{CanonicalRecord, ClosingSystemList, ReportData};
//!
//! let end = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap().and_hms_opt(18, 0, 0).unwrap();
//! let change = CanonicalRecord::new("CH-1001")
//!     .summary("SAP maintenance")
//!     .status("AUTH")
//!     .planned_end(end);
//!
//! let report = ReportData::new(None, vec![change], &ClosingSystemList::default());
//! assert_eq!(report.flagged.len(), 1);
//! ```

pub mod closing;
pub mod date;

pub use closing::{
    classify, flag_records, in_closing_window, is_flagged, last_day_of_month, Classification,
    ClosingSystemList, DEFAULT_CLOSING_SYSTEMS,
};
pub use date::{from_excel_serial, normalize_date};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Canonical Schema
// ============================================================================

/// One column of the canonical seven-field schema, in output order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Key,
    Summary,
    Status,
    Description,
    Reporter,
    PlannedStart,
    PlannedEnd,
}

impl Column {
    /// All columns in the fixed report order
    pub const ALL: [Column; 7] = [
        Column::Key,
        Column::Summary,
        Column::Status,
        Column::Description,
        Column::Reporter,
        Column::PlannedStart,
        Column::PlannedEnd,
    ];

    /// Header text used by exports and by the generated report
    pub fn header(&self) -> &'static str {
        match self {
            Column::Key => "Key",
            Column::Summary => "Summary",
            Column::Status => "Status",
            Column::Description => "Description",
            Column::Reporter => "Reporter",
            Column::PlannedStart => "Planned start date",
            Column::PlannedEnd => "Planned end date",
        }
    }

    /// Look up a column by its header text (exact match)
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.header() == header)
    }

    /// Whether the column holds a date rather than text
    pub fn is_date(&self) -> bool {
        matches!(self, Column::PlannedStart | Column::PlannedEnd)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// A single issue or change projected onto the canonical schema.
///
/// String fields are never absent; an empty string marks a missing value.
/// Only the two planned dates are optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub description: String,
    pub reporter: String,
    pub planned_start: Option<NaiveDateTime>,
    pub planned_end: Option<NaiveDateTime>,
}

impl CanonicalRecord {
    /// Create a record with the given key and empty fields
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn reporter(mut self, reporter: impl Into<String>) -> Self {
        self.reporter = reporter.into();
        self
    }

    pub fn planned_start(mut self, start: NaiveDateTime) -> Self {
        self.planned_start = Some(start);
        self
    }

    pub fn planned_end(mut self, end: NaiveDateTime) -> Self {
        self.planned_end = Some(end);
        self
    }

    /// Text value of a column, `None` for the date columns
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Key => Some(&self.key),
            Column::Summary => Some(&self.summary),
            Column::Status => Some(&self.status),
            Column::Description => Some(&self.description),
            Column::Reporter => Some(&self.reporter),
            Column::PlannedStart | Column::PlannedEnd => None,
        }
    }

    /// Date value of a column, `None` for text columns or absent dates
    pub fn date(&self, column: Column) -> Option<NaiveDateTime> {
        match column {
            Column::PlannedStart => self.planned_start,
            Column::PlannedEnd => self.planned_end,
            _ => None,
        }
    }
}

// ============================================================================
// Merge and Report Data
// ============================================================================

/// Concatenate issue-tracker records and change-source records.
///
/// Issue-tracker rows come first; an absent issue tracker contributes nothing.
/// No deduplication or reordering takes place.
pub fn merge_records(
    issues: Option<&[CanonicalRecord]>,
    changes: &[CanonicalRecord],
) -> Vec<CanonicalRecord> {
    let issues = issues.unwrap_or_default();
    let mut merged = Vec::with_capacity(issues.len() + changes.len());
    merged.extend_from_slice(issues);
    merged.extend_from_slice(changes);
    merged
}

/// Named record group in the generated report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Rows read from the issue tracker (optional)
    Issues,
    /// Authorized rows read from the change source (mandatory)
    Changes,
    /// Merged rows flagged for closing-window risk (only when non-empty)
    Flagged,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Issues => "from issue tracker",
            GroupKind::Changes => "from change source",
            GroupKind::Flagged => "flagged for closing-window risk",
        }
    }
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A borrowed view of one report group
#[derive(Clone, Copy, Debug)]
pub struct RecordGroup<'a> {
    pub kind: GroupKind,
    pub records: &'a [CanonicalRecord],
}

/// Everything a report renderer needs from one run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// Issue-tracker records, `None` when that source soft-failed
    pub issues: Option<Vec<CanonicalRecord>>,
    /// Change-source records after rename and filtering
    pub changes: Vec<CanonicalRecord>,
    /// Merged records that hit the closing-window rule, in merge order
    pub flagged: Vec<CanonicalRecord>,
}

impl ReportData {
    /// Merge both sources and classify every merged record
    pub fn new(
        issues: Option<Vec<CanonicalRecord>>,
        changes: Vec<CanonicalRecord>,
        systems: &ClosingSystemList,
    ) -> Self {
        let merged = merge_records(issues.as_deref(), &changes);
        let flagged = flag_records(&merged, systems);
        Self {
            issues,
            changes,
            flagged,
        }
    }

    /// Groups in output order, omitting absent or empty optional groups
    pub fn groups(&self) -> Vec<RecordGroup<'_>> {
        let mut groups = Vec::with_capacity(3);
        if let Some(issues) = &self.issues {
            groups.push(RecordGroup {
                kind: GroupKind::Issues,
                records: issues,
            });
        }
        groups.push(RecordGroup {
            kind: GroupKind::Changes,
            records: &self.changes,
        });
        if !self.flagged.is_empty() {
            groups.push(RecordGroup {
                kind: GroupKind::Flagged,
                records: &self.flagged,
            });
        }
        groups
    }

    /// Get a group by kind, if it is part of the output
    pub fn group(&self, kind: GroupKind) -> Option<RecordGroup<'_>> {
        self.groups().into_iter().find(|g| g.kind == kind)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait ReportRenderer {
    type Output;

    /// Render the report groups to the output format
    fn render(&self, report: &ReportData) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Failure to read one of the input sources
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No source data found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Sheet '{sheet}' not found in {}", .path.display())]
    SheetNotFound { path: PathBuf, sheet: String },

    #[error("Missing required columns in {}: {}", .path.display(), .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("Unreadable source {}: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },
}

impl SourceError {
    /// The source file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }

    /// The file exists but does not have the expected sheet or columns
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            SourceError::SheetNotFound { .. } | SourceError::MissingColumns { .. }
        )
    }
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
