//! Report sink: renders [`Report`]s as text tables, CSV or JSON, to a string
//! or to disk.

pub mod export;
pub mod table_view;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use attendance_core::error::{AttendanceError, Result};
use attendance_core::report::Report;

pub use attendance_core as core;

/// How a report is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(AttendanceError::Config(format!(
                "unknown output format \"{}\"",
                other
            ))),
        }
    }
}

/// Render `report` for stdout.
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(table_view::render_report(report)),
        OutputFormat::Csv => export::report_to_csv(report),
        OutputFormat::Json => export::report_to_json(report),
    }
}

/// Write `report` under `target` and return the files written.
///
/// CSV treats `target` as a directory holding one file per section; text and
/// JSON write a single file.
pub fn write(report: &Report, format: OutputFormat, target: &Path) -> Result<Vec<PathBuf>> {
    match format {
        OutputFormat::Csv => export::export_csv(report, target),
        OutputFormat::Json => {
            export::export_json(report, target)?;
            Ok(vec![target.to_path_buf()])
        }
        OutputFormat::Text => {
            std::fs::write(target, table_view::render_report(report)).map_err(|e| {
                AttendanceError::Export {
                    path: target.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
            Ok(vec![target.to_path_buf()])
        }
    }
}
