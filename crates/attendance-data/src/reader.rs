//! CSV discovery and loading for daily attendance sheets.
//!
//! The directory enumerator lists `.csv` files; the source loader reads one
//! file into a [`RawTable`] and hands it to the normalizer to build a
//! [`DailyFile`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use attendance_core::dates::{file_identifier, DateResolver};
use attendance_core::error::{AttendanceError, Result};
use attendance_core::models::{Column, DailyFile};
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::normalizer;

// ── RawTable ──────────────────────────────────────────────────────────────────

/// Header-indexed rows of one CSV file, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Header cells as they appear in the file.
    pub headers: Vec<String>,
    /// Known columns mapped to their position. First occurrence wins.
    positions: HashMap<Column, usize>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from header and row cells.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut positions = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let cleaned = header.trim_start_matches('\u{feff}');
            if let Some(column) = Column::from_header(cleaned) {
                positions.entry(column).or_insert(idx);
            }
        }
        Self {
            headers,
            positions,
            rows,
        }
    }

    /// `true` when the file has a header for `column`.
    pub fn has_column(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }

    /// Known columns present in the header.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.positions.keys().copied()
    }

    /// Cell of `column` in row `row`.
    ///
    /// `None` means the column is absent from the file; a present column with
    /// a blank or short row yields `Some("")`.
    pub fn value(&self, row: usize, column: Column) -> Option<&str> {
        let idx = *self.positions.get(&column)?;
        let cells = self.rows.get(row)?;
        Some(cells.get(idx).map(String::as_str).unwrap_or(""))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── FileEntry ─────────────────────────────────────────────────────────────────

/// An eligible file and its resolved date, before its content is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub identifier: String,
    pub date: Option<NaiveDate>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find the `.csv` files directly under `data_path`, sorted by path.
///
/// Subdirectories are not descended into, so exports written beside the data
/// are never read back as attendance sheets.
pub fn find_attendance_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// List eligible files with their resolved dates.
///
/// Files whose name carries no recognised date are kept with `date: None`
/// and a warning is logged for each.
pub fn catalog_files(data_path: &Path, resolver: &DateResolver) -> Vec<FileEntry> {
    find_attendance_files(data_path)
        .into_iter()
        .map(|path| {
            let identifier = file_identifier(&path);
            let date = resolve_or_warn(&identifier, resolver);
            FileEntry {
                path,
                identifier,
                date,
            }
        })
        .collect()
}

/// Read one CSV file into a [`RawTable`].
///
/// Fails with [`AttendanceError::SourceRead`] when the file cannot be opened
/// or is not valid CSV.
pub fn load_table(path: &Path) -> Result<RawTable> {
    let source_err = |e: csv::Error| AttendanceError::SourceRead {
        path: path.to_path_buf(),
        source: std::io::Error::from(e),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(source_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(source_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(source_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(
        "Read {} rows, {} columns from {}",
        rows.len(),
        headers.len(),
        path.display()
    );

    Ok(RawTable::new(headers, rows))
}

/// Load and normalize one daily file.
///
/// An unresolvable file-name date is not an error here: the file is returned
/// with `date: None` and a warning is logged.
pub fn load_daily_file(path: &Path, resolver: &DateResolver) -> Result<DailyFile> {
    let table = load_table(path)?;
    let identifier = file_identifier(path);
    let date = resolve_or_warn(&identifier, resolver);
    let mut day = normalizer::normalize(identifier, date, &table);
    day.path = path.to_path_buf();
    Ok(day)
}

/// Load many files in parallel, skipping (and warning about) unreadable ones.
///
/// The result keeps the order of `paths`.
pub fn load_daily_files(paths: &[PathBuf], resolver: &DateResolver) -> Vec<DailyFile> {
    let loaded: Vec<Option<DailyFile>> = paths
        .par_iter()
        .map(|path| match load_daily_file(path, resolver) {
            Ok(day) => Some(day),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    let files: Vec<DailyFile> = loaded.into_iter().flatten().collect();
    debug!("Loaded {} of {} daily files", files.len(), paths.len());
    files
}

/// Locate the file for a single-day request.
///
/// `name` may be an existing path, or a file name (with or without `.csv`)
/// relative to `data_path`.
pub fn resolve_day_path(data_path: &Path, name: &str) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.is_file() {
        return direct;
    }
    let candidate = data_path.join(name);
    if candidate.is_file() {
        return candidate;
    }
    data_path.join(format!("{}.csv", name))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn resolve_or_warn(identifier: &str, resolver: &DateResolver) -> Option<NaiveDate> {
    match resolver.resolve(identifier) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("{}; excluded from month cohorts", e);
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::models::Status;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const SHEET: &str = "\
Employee Code,Student Name,Status,Block,Floor,Room No.,Last Punch
S1,Asha,Present,A,FirstFloor,101,20:10:00
S2,Ravi,Not Present,A,FirstFloor,102,
";

    // ── find_attendance_files ─────────────────────────────────────────────────

    #[test]
    fn test_find_attendance_files_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "02-July-2025.csv", SHEET);
        write_csv(dir.path(), "01-July-2025.csv", SHEET);
        write_csv(dir.path(), "notes.txt", "ignore me");

        let files = find_attendance_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["01-July-2025.csv", "02-July-2025.csv"]);
    }

    #[test]
    fn test_find_attendance_files_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        let exports = dir.path().join("exports");
        std::fs::create_dir_all(&exports).unwrap();
        write_csv(dir.path(), "01-July-2025.csv", SHEET);
        write_csv(&exports, "reduction_days.csv", SHEET);

        let files = find_attendance_files(dir.path());
        assert_eq!(files, vec![dir.path().join("01-July-2025.csv")]);
    }

    #[test]
    fn test_find_attendance_files_nonexistent_path() {
        let files = find_attendance_files(Path::new("/tmp/does-not-exist-attendance-xyz"));
        assert!(files.is_empty());
    }

    // ── catalog_files ─────────────────────────────────────────────────────────

    #[test]
    fn test_catalog_files_keeps_undated_entries() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "01-July-2025.csv", SHEET);
        write_csv(dir.path(), "latest.csv", SHEET);

        let entries = catalog_files(dir.path(), &DateResolver::default());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].identifier, "01-July-2025");
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2025, 7, 1));
        assert_eq!(entries[1].identifier, "latest");
        assert_eq!(entries[1].date, None);
    }

    // ── load_table ────────────────────────────────────────────────────────────

    #[test]
    fn test_load_table_distinguishes_absent_and_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "01-July-2025.csv", SHEET);

        let table = load_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, Column::LastPunch), Some("20:10:00"));
        assert_eq!(table.value(1, Column::LastPunch), Some(""));

        let path = write_csv(dir.path(), "02-July-2025.csv", "Status\nPresent\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.value(0, Column::Status), Some("Present"));
        assert_eq!(table.value(0, Column::LastPunch), None);
    }

    #[test]
    fn test_load_table_trims_headers_and_cells() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "01-July-2025.csv",
            " Status , Room No. \n Present , 0101 \n",
        );
        let table = load_table(&path).unwrap();
        assert!(table.has_column(Column::RoomNumber));
        assert_eq!(table.value(0, Column::RoomNumber), Some("0101"));
    }

    #[test]
    fn test_load_table_short_rows_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "x.csv", "Status,Floor\nPresent\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.value(0, Column::Floor), Some(""));
    }

    #[test]
    fn test_load_table_missing_file_is_source_read_error() {
        let err = load_table(Path::new("/tmp/does-not-exist-attendance-xyz/a.csv")).unwrap_err();
        assert!(matches!(err, AttendanceError::SourceRead { .. }));
    }

    // ── load_daily_file(s) ────────────────────────────────────────────────────

    #[test]
    fn test_load_daily_file_resolves_date() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "05-Jul2025.csv", SHEET);

        let day = load_daily_file(&path, &DateResolver::default()).unwrap();
        assert_eq!(day.identifier, "05-Jul2025");
        assert_eq!(day.path, path);
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2025, 7, 5));
        assert_eq!(day.records.len(), 2);
        assert_eq!(day.records[1].status, Status::NotPresent);
    }

    #[test]
    fn test_load_daily_file_undated_still_loads() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "attendance.csv", SHEET);

        let day = load_daily_file(&path, &DateResolver::default()).unwrap();
        assert_eq!(day.date, None);
        assert_eq!(day.records.len(), 2);
    }

    #[test]
    fn test_load_daily_files_skips_unreadable() {
        let dir = TempDir::new().unwrap();
        let good = write_csv(dir.path(), "01-July-2025.csv", SHEET);
        let missing = dir.path().join("02-July-2025.csv");

        let files = load_daily_files(&[good, missing], &DateResolver::default());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].identifier, "01-July-2025");
    }

    // ── resolve_day_path ──────────────────────────────────────────────────────

    #[test]
    fn test_resolve_day_path_accepts_bare_name() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "01-July-2025.csv", SHEET);

        assert_eq!(resolve_day_path(dir.path(), "01-July-2025"), path);
        assert_eq!(resolve_day_path(dir.path(), "01-July-2025.csv"), path);
        assert_eq!(
            resolve_day_path(dir.path(), path.to_str().unwrap()),
            path
        );
    }
}
