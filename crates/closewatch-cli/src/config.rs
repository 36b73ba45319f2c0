//! Run configuration from `closewatch.toml`
//!
//! Every field has a default matching the stock Jira and Maximo exports, so an
//! empty file (or no file at all) gives the standard report.
//!
//! ```toml
//! closing_systems = ["SAP", "Sitef"]
//! participants_sheet = true
//!
//! [issues]
//! sheet = "Your Jira Issues"
//!
//! [changes]
//! file_stem = "Maximo"
//! sheet = "Maximo"
//!
//! [sheets]
//! flagged = "Verificação"
//!
//! [[participants]]
//! label = "Infraestrutura"
//! members = ["Carla Dias", "Ivo Mota"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use closewatch_core::{ClosingSystemList, DEFAULT_CLOSING_SYSTEMS};
use closewatch_ingest::change_source::{DEFAULT_CHANGE_SHEET, DEFAULT_CHANGE_STEM};
use closewatch_ingest::issue_tracker::DEFAULT_ISSUE_SHEET;
use closewatch_ingest::{ChangeSourceReader, IssueTrackerReader, Pipeline};
use closewatch_render::{ExcelRenderer, ParticipantGroup, SheetNames};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File looked up in the working directory when `--config` is not given
pub const CONFIG_FILE: &str = "closewatch.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// System names searched in summaries and descriptions
    pub closing_systems: Vec<String>,
    pub issues: IssuesConfig,
    pub changes: ChangesConfig,
    /// Report sheet names
    pub sheets: SheetNames,
    /// Whether the report carries the participants sheet
    pub participants_sheet: bool,
    /// Groups listed on the participants sheet
    pub participants: Vec<ParticipantGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuesConfig {
    /// Page holding the Jira issues
    pub sheet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangesConfig {
    /// File name without extension, looked up as `.xlsx` then `.csv`
    pub file_stem: String,
    /// Page holding the Maximo changes
    pub sheet: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            closing_systems: DEFAULT_CLOSING_SYSTEMS.iter().map(|s| (*s).to_string()).collect(),
            issues: IssuesConfig::default(),
            changes: ChangesConfig::default(),
            sheets: SheetNames::default(),
            participants_sheet: true,
            participants: Vec::new(),
        }
    }
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            sheet: DEFAULT_ISSUE_SHEET.to_string(),
        }
    }
}

impl Default for ChangesConfig {
    fn default() -> Self {
        Self {
            file_stem: DEFAULT_CHANGE_STEM.to_string(),
            sheet: DEFAULT_CHANGE_SHEET.to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Searches in order:
    /// 1. Explicit config path (if provided, must exist)
    /// 2. ./closewatch.toml
    ///
    /// Returns defaults if no config found.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(&local);
        }

        debug!("config: no {CONFIG_FILE} found, using defaults");
        Ok(Self::default())
    }

    /// Parse one TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        debug!(
            path = %path.display(),
            systems = config.closing_systems.len(),
            participants = config.participants.len(),
            "config: loaded"
        );
        Ok(config)
    }

    pub fn systems(&self) -> ClosingSystemList {
        ClosingSystemList::new(&self.closing_systems)
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.systems())
            .issue_reader(IssueTrackerReader::new().sheet(&self.issues.sheet))
            .change_reader(
                ChangeSourceReader::new()
                    .file_stem(&self.changes.file_stem)
                    .sheet(&self.changes.sheet),
            )
    }

    pub fn excel_renderer(&self) -> ExcelRenderer {
        let renderer = ExcelRenderer::new()
            .sheet_names(self.sheets.clone())
            .with_participants(self.participants.clone());
        if self.participants_sheet {
            renderer
        } else {
            renderer.no_participants()
        }
    }
}
