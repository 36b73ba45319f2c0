//! closewatch CLI - Month-end closing window checker
//!
//! Reads the Jira and Maximo exports, flags work that touches a closing
//! system inside the closing window, and writes the review workbook.

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use closewatch_core::{classify, CanonicalRecord, Classification, ReportData, ReportRenderer};
use closewatch_render::TextRenderer;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "closewatch")]
#[command(author, version, about = "Month-end closing window checker", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./closewatch.toml when present)
    #[arg(long, global = true, value_name = "FILE", env = "CLOSEWATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Sources {
    /// Jira export (skipped with a warning when missing or unusable)
    #[arg(long, value_name = "FILE", default_value = "Jira.xlsx")]
    issues: PathBuf,

    /// Directory holding the Maximo export, or the export file itself
    #[arg(long, value_name = "DIR", default_value = ".")]
    changes: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the review workbook
    Report {
        #[command(flatten)]
        sources: Sources,

        /// Output workbook path
        #[arg(short, long, default_value = "planilha_final.xlsx")]
        output: PathBuf,
    },

    /// Print flagged records without writing a workbook
    Check {
        #[command(flatten)]
        sources: Sources,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Report { sources, output } => cmd_report(&config, &sources, &output),
        Commands::Check { sources, format } => cmd_check(&config, &sources, format),
    }
}

fn read_report(config: &Config, sources: &Sources) -> Result<ReportData> {
    config
        .pipeline()
        .run(Some(&sources.issues), &sources.changes)
        .with_context(|| {
            format!(
                "Failed to read change source from {}",
                sources.changes.display()
            )
        })
}

fn cmd_report(config: &Config, sources: &Sources, output: &Path) -> Result<()> {
    let report = read_report(config, sources)?;

    // Render fully before touching the output path
    let bytes = config
        .excel_renderer()
        .render(&report)
        .context("Failed to render workbook")?;
    std::fs::write(output, bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        path = %output.display(),
        flagged = report.flagged.len(),
        "report: workbook written"
    );
    println!(
        "Wrote {} ({} flagged)",
        output.display(),
        report.flagged.len()
    );
    Ok(())
}

/// JSON shape of `check --format json`
#[derive(Serialize)]
struct CheckOutput<'a> {
    issues: Option<usize>,
    changes: usize,
    flagged: Vec<FlaggedEntry<'a>>,
}

#[derive(Serialize)]
struct FlaggedEntry<'a> {
    #[serde(flatten)]
    record: &'a CanonicalRecord,
    #[serde(flatten)]
    classification: Classification,
}

fn cmd_check(config: &Config, sources: &Sources, format: Format) -> Result<()> {
    let report = read_report(config, sources)?;

    match format {
        Format::Text => {
            let text = TextRenderer::new(config.systems())
                .render(&report)
                .context("Failed to render summary")?;
            print!("{text}");
        }
        Format::Json => {
            let systems = config.systems();
            let output = CheckOutput {
                issues: report.issues.as_ref().map(Vec::len),
                changes: report.changes.len(),
                flagged: report
                    .flagged
                    .iter()
                    .map(|record| FlaggedEntry {
                        record,
                        classification: classify(record, &systems),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
