//! CSV and JSON serialization of reports.
//!
//! CSV output is one table per section. Empty sections are still written,
//! holding a single `Info` placeholder row, so every export has the same
//! set of files.

use std::path::{Path, PathBuf};

use attendance_core::error::{AttendanceError, Result};
use attendance_core::report::{Report, Table};
use tracing::{debug, info};

use crate::table_view::NO_DATA;

// ── CSV ───────────────────────────────────────────────────────────────────────

/// Serialize one table as CSV text.
pub fn table_to_csv(table: &Table) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let write_err = |e: csv::Error| AttendanceError::Io(std::io::Error::from(e));

    if table.is_empty() {
        writer.write_record(["Info"]).map_err(write_err)?;
        writer.write_record([NO_DATA]).map_err(write_err)?;
    } else {
        writer.write_record(&table.columns).map_err(write_err)?;
        for row in &table.rows {
            writer.write_record(row).map_err(write_err)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AttendanceError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AttendanceError::Other(e.into()))
}

/// All sections as one CSV stream, each preceded by a `# <name>` line.
pub fn report_to_csv(report: &Report) -> Result<String> {
    let mut out = String::new();
    for (idx, section) in report.sections.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format!("# {}\n", section.name));
        out.push_str(&table_to_csv(&section.table)?);
    }
    Ok(out)
}

/// Write each section to `<dir>/<section_name>.csv`, creating `dir` if needed.
///
/// Returns the written paths in section order.
pub fn export_csv(report: &Report, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| export_err(dir, e))?;

    let mut written = Vec::with_capacity(report.sections.len());
    for section in &report.sections {
        let path = dir.join(format!("{}.csv", section_file_name(&section.name)));
        let content = table_to_csv(&section.table)?;
        std::fs::write(&path, content).map_err(|e| export_err(&path, e))?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    info!("Exported {} sections to {}", written.len(), dir.display());
    Ok(written)
}

/// File-name form of a section name, e.g. `"Students to Notify"` becomes
/// `"students_to_notify"`.
pub fn section_file_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Pretty-printed JSON document for `report`.
pub fn report_to_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write `report` as JSON to `path`, creating parent directories if needed.
pub fn export_json(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| export_err(parent, e))?;
    }
    let json = report_to_json(report)?;
    std::fs::write(path, json).map_err(|e| export_err(path, e))?;
    info!("Exported report to {}", path.display());
    Ok(())
}

fn export_err(path: &Path, e: std::io::Error) -> AttendanceError {
    AttendanceError::Export {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report() -> Report {
        let mut report = Report::new("Daily Report: 01-July-2025");
        let mut notify = Table::new(&["Student Name", "Room No."]);
        notify.push_row(["Meera, K", "003"]);
        report.push_section("Students to Notify", notify);
        report.push_section("Late Biometric Punches", Table::new(&["Student Name"]));
        report
    }

    #[test]
    fn test_table_to_csv_quotes_commas() {
        let csv = table_to_csv(&report().sections[0].table).unwrap();
        assert_eq!(csv, "Student Name,Room No.\n\"Meera, K\",003\n");
    }

    #[test]
    fn test_table_to_csv_empty_placeholder() {
        let csv = table_to_csv(&Table::new(&["Student Name"])).unwrap();
        assert_eq!(csv, "Info\nNo data to display.\n");
    }

    #[test]
    fn test_report_to_csv_sections() {
        let csv = report_to_csv(&report()).unwrap();
        assert!(csv.starts_with("# Students to Notify\n"));
        assert!(csv.contains("\n\n# Late Biometric Punches\nInfo\n"));
    }

    #[test]
    fn test_section_file_name() {
        assert_eq!(section_file_name("Students to Notify"), "students_to_notify");
        assert_eq!(section_file_name("Late Biometric Punches"), "late_biometric_punches");
        assert_eq!(section_file_name("  Room No. / Floor "), "room_no_floor");
    }

    #[test]
    fn test_export_csv_writes_every_section() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("july");
        let paths = export_csv(&report(), &out).unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], out.join("students_to_notify.csv"));
        let empty = std::fs::read_to_string(&paths[1]).unwrap();
        assert!(empty.contains(NO_DATA));
    }

    #[test]
    fn test_export_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("report.json");
        export_json(&report(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Report = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, report());
    }

    #[test]
    fn test_export_json_into_file_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let err = export_json(&report(), &blocker.join("report.json")).unwrap_err();
        assert!(matches!(err, AttendanceError::Export { .. }));
    }
}
