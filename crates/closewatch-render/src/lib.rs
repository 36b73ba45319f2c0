//! # closewatch-render
//!
//! Output backends for a closewatch run.
//!
//! This crate provides:
//! - Styled Excel workbook (the report handed to the change advisory board)
//! - Text summary for console output
//!
//! ## Example
//!
//! ```rust,ignore
//! use closewatch_core::{ClosingSystemList, ReportRenderer};
//! use closewatch_render::{ExcelRenderer, ParticipantGroup, TextRenderer};
//!
//! let renderer = ExcelRenderer::new()
//!     .with_participants(vec![ParticipantGroup::new("Infra").member("Carla Dias")]);
//! renderer.save(&report, Path::new("planilha_final.xlsx"))?;
//!
//! let summary = TextRenderer::new(ClosingSystemList::default()).render(&report)?;
//! println!("{summary}");
//! ```

pub mod excel;
pub mod text;

pub use excel::{ExcelRenderer, ParticipantGroup, SheetNames, SheetPalette};
pub use text::TextRenderer;

/// Shorten `s` to at most `max` characters, marking the cut with `...`
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
