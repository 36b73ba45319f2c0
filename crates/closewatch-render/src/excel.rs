//! Excel report renderer
//!
//! Generates the XLSX workbook handed to the change advisory board:
//! - Jira: issue-tracker rows (only when the Jira export was usable)
//! - Maximo: authorized change rows
//! - Participantes: participant groups, member names attached as cell notes
//! - Verificação: rows flagged for closing-window risk (only when non-empty)
//!
//! Every record sheet has the seven canonical columns in fixed order:
//!
//! ```text
//! | Key | Summary | Status | Description | Reporter | Planned start date | Planned end date |
//! ```
//!
//! Each sheet has its own palette (header fill plus alternating even/odd row
//! fills). Dates are written as real Excel dates, formatted `dd/mm/yyyy hh:mm`.
//! Column widths follow the longest value in the column plus a margin,
//! capped at 50 characters.

use std::path::Path;

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Note, Workbook, Worksheet, XlsxError};
use serde::{Deserialize, Serialize};

use closewatch_core::{
    CanonicalRecord, Column, GroupKind, RenderError, ReportData, ReportRenderer,
};

/// Characters taken by a rendered `dd/mm/yyyy hh:mm` date
const DATE_WIDTH: usize = 16;

/// Header fill plus alternating row fills for one sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetPalette {
    pub header: u32,
    pub even: u32,
    pub odd: u32,
}

impl SheetPalette {
    pub const fn new(header: u32, even: u32, odd: u32) -> Self {
        Self { header, even, odd }
    }
}

/// Whether a worksheet row (row 0 is the header) takes the even fill.
///
/// Banding counts rows from 1 with the header included.
fn is_even_row(row: u32) -> bool {
    (row + 1) % 2 == 0
}

/// Sheet names for every report group
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub issues: String,
    pub changes: String,
    pub participants: String,
    pub flagged: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            issues: "Jira".into(),
            changes: "Maximo".into(),
            participants: "Participantes".into(),
            flagged: "Verificação".into(),
        }
    }
}

impl SheetNames {
    /// Sheet name for a record group
    pub fn for_group(&self, kind: GroupKind) -> &str {
        match kind {
            GroupKind::Issues => &self.issues,
            GroupKind::Changes => &self.changes,
            GroupKind::Flagged => &self.flagged,
        }
    }
}

/// People responsible for one area, listed on the participants sheet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantGroup {
    /// Area or role shown in the cell
    pub label: String,
    /// Names attached to the cell as a note
    #[serde(default)]
    pub members: Vec<String>,
}

impl ParticipantGroup {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            members: Vec::new(),
        }
    }

    /// Add a member
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.push(name.into());
        self
    }
}

/// Excel report renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Sheet names per group
    pub sheet_names: SheetNames,
    /// Palette for the issue-tracker sheet
    pub issues_palette: SheetPalette,
    /// Palette for the change-source sheet
    pub changes_palette: SheetPalette,
    /// Palette for the participants sheet
    pub participants_palette: SheetPalette,
    /// Palette for the flagged sheet
    pub flagged_palette: SheetPalette,
    /// Font family for every cell
    pub font_name: String,
    /// Number format for the planned date columns
    pub date_format: String,
    /// Maximum column width in characters
    pub max_column_width: usize,
    /// Whether to include the participants sheet
    pub include_participants: bool,
    /// Header text of the participants sheet
    pub participants_header: String,
    /// Author recorded on participant notes
    pub note_author: String,
    participants: Vec<ParticipantGroup>,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            sheet_names: SheetNames::default(),
            issues_palette: SheetPalette::new(0x8989EB, 0xC4C3F7, 0xE8E7FC),
            changes_palette: SheetPalette::new(0x8BC34A, 0xFFFFFF, 0xEEF7E3),
            participants_palette: SheetPalette::new(0x4B7BEC, 0xE6F0FF, 0xFFFFFF),
            flagged_palette: SheetPalette::new(0xFF8A65, 0xFFF3EE, 0xFFE0D3),
            font_name: "Montserrat".into(),
            date_format: "dd/mm/yyyy hh:mm".into(),
            max_column_width: 50,
            include_participants: true,
            participants_header: "Participantes".into(),
            note_author: "closewatch".into(),
            participants: Vec::new(),
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set sheet names
    pub fn sheet_names(mut self, names: SheetNames) -> Self {
        self.sheet_names = names;
        self
    }

    /// Set font family
    pub fn font(mut self, name: impl Into<String>) -> Self {
        self.font_name = name.into();
        self
    }

    /// Set the number format used for planned dates
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Disable the participants sheet
    pub fn no_participants(mut self) -> Self {
        self.include_participants = false;
        self
    }

    /// Participant groups for the participants sheet
    pub fn with_participants(mut self, groups: Vec<ParticipantGroup>) -> Self {
        self.include_participants = true;
        self.participants = groups;
        self
    }

    /// Configured participant groups
    pub fn participants(&self) -> &[ParticipantGroup] {
        &self.participants
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, report: &ReportData) -> Result<Vec<u8>, RenderError> {
        let mut workbook = self.build_workbook(report)?;
        workbook.save_to_buffer().map_err(xlsx_error)
    }

    /// Write the workbook to `path`
    pub fn save(&self, report: &ReportData, path: &Path) -> Result<(), RenderError> {
        let bytes = self.render_to_bytes(report)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn build_workbook(&self, report: &ReportData) -> Result<Workbook, RenderError> {
        let names = [
            &self.sheet_names.issues,
            &self.sheet_names.changes,
            &self.sheet_names.participants,
            &self.sheet_names.flagged,
        ];
        for (i, name) in names.iter().enumerate() {
            if names[..i].iter().any(|other| other.eq_ignore_ascii_case(name)) {
                return Err(RenderError::InvalidData(format!(
                    "Duplicate sheet name: {name}"
                )));
            }
        }

        let mut workbook = Workbook::new();

        if let Some(issues) = &report.issues {
            self.add_record_sheet(
                &mut workbook,
                &self.sheet_names.issues,
                issues,
                &self.issues_palette,
            )?;
        }

        self.add_record_sheet(
            &mut workbook,
            &self.sheet_names.changes,
            &report.changes,
            &self.changes_palette,
        )?;

        if self.include_participants {
            self.add_participants_sheet(&mut workbook)?;
        }

        if !report.flagged.is_empty() {
            self.add_record_sheet(
                &mut workbook,
                &self.sheet_names.flagged,
                &report.flagged,
                &self.flagged_palette,
            )?;
        }

        Ok(workbook)
    }

    /// Create the header, text and date formats for one palette
    fn create_formats(&self, palette: &SheetPalette) -> SheetFormats {
        let base = Format::new()
            .set_font_name(&self.font_name)
            .set_border(FormatBorder::Thin)
            .set_border_color(0xC4C7C5)
            .set_text_wrap()
            .set_align(FormatAlign::VerticalCenter);

        let header = base
            .clone()
            .set_bold()
            .set_font_size(12)
            .set_align(FormatAlign::Center)
            .set_background_color(palette.header);

        let body = base.set_font_size(11).set_align(FormatAlign::Left);

        let even_text = body.clone().set_background_color(palette.even);
        let odd_text = body.set_background_color(palette.odd);
        let even_date = even_text.clone().set_num_format(&self.date_format);
        let odd_date = odd_text.clone().set_num_format(&self.date_format);

        SheetFormats {
            header,
            even_text,
            odd_text,
            even_date,
            odd_date,
        }
    }

    /// Add one sheet of canonical records
    fn add_record_sheet(
        &self,
        workbook: &mut Workbook,
        name: &str,
        records: &[CanonicalRecord],
        palette: &SheetPalette,
    ) -> Result<(), RenderError> {
        let formats = self.create_formats(palette);
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).map_err(xlsx_error)?;

        let mut widths: Vec<usize> = Column::ALL.iter().map(|c| c.header().chars().count()).collect();

        for (col, column) in Column::ALL.iter().enumerate() {
            sheet
                .write_string_with_format(0, col as u16, column.header(), &formats.header)
                .map_err(xlsx_error)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = i as u32 + 1;
            for (col, column) in Column::ALL.iter().enumerate() {
                let width = if column.is_date() {
                    write_date(sheet, row, col as u16, record.date(*column), &formats)?
                } else {
                    let text = record.text(*column).unwrap_or_default();
                    write_text(sheet, row, col as u16, text, &formats)?
                };
                widths[col] = widths[col].max(width);
            }
        }

        for (col, width) in widths.into_iter().enumerate() {
            sheet
                .set_column_width(col as u16, self.column_width(width) as f64)
                .map_err(xlsx_error)?;
        }

        Ok(())
    }

    /// Add the participants sheet with one noted cell per group
    fn add_participants_sheet(&self, workbook: &mut Workbook) -> Result<(), RenderError> {
        let formats = self.create_formats(&self.participants_palette);
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&self.sheet_names.participants)
            .map_err(xlsx_error)?;

        sheet
            .write_string_with_format(0, 0, &self.participants_header, &formats.header)
            .map_err(xlsx_error)?;
        let mut width = self.participants_header.chars().count();

        for (i, group) in self.participants.iter().enumerate() {
            let row = i as u32 + 1;
            width = width.max(write_text(sheet, row, 0, &group.label, &formats)?);

            if !group.members.is_empty() {
                let note = Note::new(group.members.join(", ")).set_author(&self.note_author);
                sheet.insert_note(row, 0, &note).map_err(xlsx_error)?;
            }
        }

        sheet
            .set_column_width(0, self.column_width(width) as f64)
            .map_err(xlsx_error)?;

        Ok(())
    }

    /// Column width for the longest value in a column
    fn column_width(&self, longest: usize) -> usize {
        (longest + 5).min(self.max_column_width)
    }
}

impl ReportRenderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &ReportData) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(report)
    }
}

/// Formats for one sheet
struct SheetFormats {
    header: Format,
    even_text: Format,
    odd_text: Format,
    even_date: Format,
    odd_date: Format,
}

impl SheetFormats {
    fn text(&self, row: u32) -> &Format {
        if is_even_row(row) {
            &self.even_text
        } else {
            &self.odd_text
        }
    }

    fn date(&self, row: u32) -> &Format {
        if is_even_row(row) {
            &self.even_date
        } else {
            &self.odd_date
        }
    }
}

/// Write a text cell and return its display width
fn write_text(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    formats: &SheetFormats,
) -> Result<usize, RenderError> {
    let format = formats.text(row);
    if text.is_empty() {
        sheet.write_blank(row, col, format).map_err(xlsx_error)?;
        return Ok(0);
    }
    sheet
        .write_string_with_format(row, col, text, format)
        .map_err(xlsx_error)?;
    Ok(display_width(text))
}

/// Write a date cell and return its display width
fn write_date(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    date: Option<NaiveDateTime>,
    formats: &SheetFormats,
) -> Result<usize, RenderError> {
    let format = formats.date(row);
    match date {
        Some(date) => {
            sheet
                .write_datetime_with_format(row, col, &date, format)
                .map_err(xlsx_error)?;
            Ok(DATE_WIDTH)
        }
        None => {
            sheet.write_blank(row, col, format).map_err(xlsx_error)?;
            Ok(0)
        }
    }
}

/// Width of the longest line of a cell value
fn display_width(text: &str) -> usize {
    text.lines().map(|l| l.chars().count()).max().unwrap_or(0)
}

fn xlsx_error(e: XlsxError) -> RenderError {
    RenderError::Format(format!("Failed to create Excel: {e}"))
}
