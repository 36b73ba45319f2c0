//! Closing-window classification
//!
//! A record is flagged when it both names a closing-sensitive system and is
//! scheduled inside the closing window.
//!
//! # Rule
//!
//! - **System hit**: the lowercased summary or description contains any
//!   lowercased entry of the [`ClosingSystemList`]. Matching is plain
//!   substring containment, so "SAPPHIRE" matches "SAP".
//! - **Date hit**: the planned start or planned end falls on the last
//!   calendar day of its own month, or on day 1 of any month.
//!
//! Day 1 counts regardless of whether the previous month held a flagged
//! last day. This over-flags and is kept as the literal policy.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::CanonicalRecord;

/// Systems sensitive to the accounting close at the retail head office
pub const DEFAULT_CLOSING_SYSTEMS: &[&str] = &[
    "ARS",
    "NCR",
    "Athena",
    "Concentrador Fiscal",
    "Concsitef",
    "CTF",
    "Gescom",
    "Gold",
    "Guepardo",
    "MasterSaf",
    "Pegasus Descontos Comerciais",
    "SAD Contábil",
    "SAP",
    "SCE",
    "Sitef",
    "Storex",
    "TPLinux",
    "XRT",
];

/// Ordered, case-insensitive list of closing-sensitive system names
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosingSystemList {
    entries: Vec<String>,
    lowered: Vec<String>,
}

impl ClosingSystemList {
    /// Build a list, skipping blank entries (they would match every text)
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries
            .into_iter()
            .map(Into::into)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        let lowered = entries.iter().map(|e| e.to_lowercase()).collect();
        Self { entries, lowered }
    }

    /// Entries as configured, in order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry contained in `text`, compared case-insensitively
    pub fn find_in(&self, text: &str) -> Option<&str> {
        if text.is_empty() {
            return None;
        }
        let text = text.to_lowercase();
        self.lowered
            .iter()
            .position(|entry| text.contains(entry.as_str()))
            .map(|i| self.entries[i].as_str())
    }

    /// Whether `text` mentions any entry
    pub fn contains_any(&self, text: &str) -> bool {
        self.find_in(text).is_some()
    }
}

impl Default for ClosingSystemList {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSING_SYSTEMS.iter().copied())
    }
}

/// Last calendar day of the given month (28 to 31)
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(31, |d| d.day())
}

/// Whether a planned date falls inside the closing window.
///
/// True on the last day of the date's own month and on day 1 of any month.
/// An absent date is never inside the window.
pub fn in_closing_window(date: Option<NaiveDateTime>) -> bool {
    let Some(date) = date else {
        return false;
    };
    let day = date.day();
    day == 1 || day == last_day_of_month(date.year(), date.month())
}

/// Outcome of classifying one record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Closing system named by the summary or description, if any
    pub system: Option<String>,
    /// Planned start is inside the closing window
    pub start_in_window: bool,
    /// Planned end is inside the closing window
    pub end_in_window: bool,
}

impl Classification {
    pub fn system_hit(&self) -> bool {
        self.system.is_some()
    }

    pub fn date_hit(&self) -> bool {
        self.start_in_window || self.end_in_window
    }

    pub fn is_flagged(&self) -> bool {
        self.system_hit() && self.date_hit()
    }
}

/// Evaluate the closing-window rule for one record
pub fn classify(record: &CanonicalRecord, systems: &ClosingSystemList) -> Classification {
    let system = systems
        .find_in(&record.summary)
        .or_else(|| systems.find_in(&record.description))
        .map(str::to_string);

    Classification {
        system,
        start_in_window: in_closing_window(record.planned_start),
        end_in_window: in_closing_window(record.planned_end),
    }
}

/// Whether a record names a closing system and is scheduled in the window
pub fn is_flagged(record: &CanonicalRecord, systems: &ClosingSystemList) -> bool {
    classify(record, systems).is_flagged()
}

/// Flagged subsequence of `records`, preserving relative order
pub fn flag_records(
    records: &[CanonicalRecord],
    systems: &ClosingSystemList,
) -> Vec<CanonicalRecord> {
    records
        .iter()
        .filter(|r| is_flagged(r, systems))
        .cloned()
        .collect()
}
