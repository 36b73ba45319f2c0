//! Plain text summary for console output
//!
//! ## Example Output
//!
//! ```text
//! from issue tracker: 2 records
//! from change source: 14 records
//! flagged for closing-window risk: 1 record
//!
//! KEY      SYSTEM  START             END               SUMMARY
//! CH-1001  SAP     30/04/2024 22:00  01/05/2024 02:00  SAP kernel patch
//! ```

use chrono::NaiveDateTime;
use closewatch_core::{classify, ClosingSystemList, RenderError, ReportData, ReportRenderer};

use crate::truncate;

/// Console renderer: group counts plus a table of flagged records
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Systems used to name the hit for each flagged record
    pub systems: ClosingSystemList,
    /// Maximum characters of the summary column
    pub summary_width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            systems: ClosingSystemList::default(),
            summary_width: 60,
        }
    }
}

impl TextRenderer {
    pub fn new(systems: ClosingSystemList) -> Self {
        Self {
            systems,
            ..Self::default()
        }
    }

    /// Set the summary column width
    pub fn summary_width(mut self, width: usize) -> Self {
        self.summary_width = width;
        self
    }
}

impl ReportRenderer for TextRenderer {
    type Output = String;

    fn render(&self, report: &ReportData) -> Result<String, RenderError> {
        let mut out = String::new();

        for group in report.groups() {
            let noun = if group.records.len() == 1 { "record" } else { "records" };
            out.push_str(&format!("{}: {} {}\n", group.kind, group.records.len(), noun));
        }

        if report.flagged.is_empty() {
            out.push_str("\nNo records in the closing window.\n");
            return Ok(out);
        }

        let rows: Vec<[String; 5]> = report
            .flagged
            .iter()
            .map(|record| {
                let hit = classify(record, &self.systems);
                [
                    record.key.clone(),
                    hit.system.unwrap_or_default(),
                    format_date(record.planned_start),
                    format_date(record.planned_end),
                    truncate(&record.summary, self.summary_width),
                ]
            })
            .collect();

        let headers = ["KEY", "SYSTEM", "START", "END", "SUMMARY"];
        let mut widths = headers.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        out.push('\n');
        push_row(&mut out, &headers.map(String::from), &widths);
        for row in &rows {
            push_row(&mut out, row, &widths);
        }

        Ok(out)
    }
}

fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%d/%m/%Y %H:%M").to_string())
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let last = cells.len() - 1;
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            out.push_str(cell);
        } else {
            let pad = width - cell.chars().count();
            out.push_str(cell);
            out.push_str(&" ".repeat(pad + 2));
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use closewatch_core::CanonicalRecord;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap()
    }

    #[test]
    fn counts_every_present_group() {
        let report = ReportData::new(
            Some(Vec::new()),
            vec![CanonicalRecord::new("CH-1").summary("Cabling")],
            &ClosingSystemList::default(),
        );
        let text = TextRenderer::default().render(&report).unwrap();

        assert!(text.contains("from issue tracker: 0 records"));
        assert!(text.contains("from change source: 1 record\n"));
        assert!(!text.contains("flagged for closing-window risk"));
        assert!(text.contains("No records in the closing window."));
    }

    #[test]
    fn flagged_table_names_the_system() {
        let report = ReportData::new(
            None,
            vec![CanonicalRecord::new("CH-1001")
                .summary("Kernel patch")
                .description("coordinate with Concsitef team")
                .planned_start(at(2024, 4, 30))],
            &ClosingSystemList::default(),
        );
        let text = TextRenderer::default().render(&report).unwrap();

        assert!(text.contains("flagged for closing-window risk: 1 record"));
        let row = text.lines().find(|l| l.starts_with("CH-1001")).unwrap();
        assert!(row.contains("Concsitef"));
        assert!(row.contains("30/04/2024 22:00"));
        assert!(row.contains(" - "));
        assert!(row.ends_with("Kernel patch"));
    }

    #[test]
    fn long_summaries_are_truncated() {
        let summary = "SAP ".repeat(30);
        let report = ReportData::new(
            None,
            vec![CanonicalRecord::new("CH-1").summary(summary).planned_end(at(2024, 6, 30))],
            &ClosingSystemList::default(),
        );
        let text = TextRenderer::default().summary_width(20).render(&report).unwrap();
        let row = text.lines().find(|l| l.starts_with("CH-1")).unwrap();
        assert!(row.ends_with("..."));
    }
}
