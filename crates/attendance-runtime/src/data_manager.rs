//! Caller-owned cache in front of the stateless analyses.
//!
//! [`ReportManager`] loads the data directory once and reloads only when the
//! file set changes, judged by a fingerprint of every file's path, size and
//! modification time. Reduction reports are memoized per
//! (file set, location filter) pair, since they are the expensive
//! cross-file fold and are typically requested repeatedly with different
//! filters over the same data.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use attendance_data::analysis;
use attendance_data::calendar::DayCalendar;
use attendance_data::core::config::EngineConfig;
use attendance_data::core::error::{AttendanceError, Result};
use attendance_data::core::models::{DailyFile, LocationFilter, MonthKey};
use attendance_data::core::report::Report;
use attendance_data::grouper::MonthGrouper;
use attendance_data::locations::collect_locations;
use attendance_data::reader::{
    catalog_files, find_attendance_files, load_daily_files, resolve_day_path,
};
use tracing::{debug, info};

// ── FileSetKey ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FileStamp {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

/// Fingerprint of a set of source files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileSetKey(Vec<FileStamp>);

impl FileSetKey {
    /// Stamp `paths` with their current size and modification time.
    /// Files that vanished in between are stamped as empty.
    pub fn scan(paths: &[PathBuf]) -> Self {
        Self(
            paths
                .iter()
                .map(|path| {
                    let meta = std::fs::metadata(path).ok();
                    FileStamp {
                        path: path.clone(),
                        len: meta.as_ref().map(|m| m.len()).unwrap_or(0),
                        modified: meta.and_then(|m| m.modified().ok()),
                    }
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct LoadedSet {
    key: FileSetKey,
    files: Vec<DailyFile>,
}

// ── ReportManager ─────────────────────────────────────────────────────────────

/// Builds reports for one data directory, reusing loaded files and
/// reduction results while the directory is unchanged.
///
/// # Example
/// ```no_run
/// use attendance_runtime::data_manager::ReportManager;
/// use attendance_data::core::config::EngineConfig;
/// use attendance_data::core::models::LocationFilter;
///
/// let mut mgr = ReportManager::new("./attendance", EngineConfig::default());
/// let report = mgr.reduction_report(&LocationFilter::all());
/// println!("{} sections", report.sections.len());
/// ```
pub struct ReportManager {
    data_dir: PathBuf,
    config: EngineConfig,
    loaded: Option<LoadedSet>,
    reductions: HashMap<(FileSetKey, LocationFilter), Report>,
}

impl ReportManager {
    pub fn new(data_dir: impl Into<PathBuf>, config: EngineConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
            loaded: None,
            reductions: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Single-day report.
    ///
    /// With `file` given, that file is read directly (a path, or a name
    /// relative to the data directory, `.csv` optional) and an unreadable file
    /// is an error. Without it, the newest dated file is used.
    pub fn daily_report(&mut self, file: Option<&str>) -> Result<Report> {
        if let Some(name) = file {
            let path = resolve_day_path(&self.data_dir, name);
            return analysis::analyze_day(&path, &self.config);
        }

        self.refresh();
        let newest = self
            .files()
            .iter()
            .filter(|f| f.date.is_some())
            .max_by(|a, b| {
                a.date
                    .cmp(&b.date)
                    .then_with(|| a.identifier.cmp(&b.identifier))
                    .then_with(|| a.path.cmp(&b.path))
            })
            .ok_or_else(|| self.no_data("dated attendance files"))?;
        debug!("Defaulting to newest day {}", newest.identifier);
        Ok(analysis::daily_report(newest, &self.config))
    }

    /// Trend report for `month`, or for the newest month when `None`.
    pub fn monthly_report(&mut self, month: Option<MonthKey>) -> Result<Report> {
        self.refresh();
        let mut cohorts = MonthGrouper::group(self.files().to_vec());
        let key = match month.or_else(|| cohorts.keys().next_back().copied()) {
            Some(key) => key,
            None => return Err(self.no_data("dated attendance files")),
        };
        let cohort = cohorts
            .remove(&key)
            .ok_or_else(|| self.no_data("attendance files for the requested month"))?;
        Ok(analysis::monthly_report(&cohort))
    }

    /// Reduction-days report, memoized per file set and filter.
    pub fn reduction_report(&mut self, filter: &LocationFilter) -> Report {
        let key = (self.refresh(), filter.clone());
        if let Some(hit) = self.reductions.get(&key) {
            debug!("Reduction cache hit ({} files)", key.0.len());
            return hit.clone();
        }
        let report = analysis::reduction_report(self.files(), filter);
        self.reductions.insert(key, report.clone());
        report
    }

    /// Distinct blocks, floors and rooms across the loaded files.
    pub fn locations_report(&mut self) -> Report {
        self.refresh();
        analysis::locations_report(&collect_locations(self.files()))
    }

    /// Dated files arranged year / month / day, newest first.
    pub fn calendar_report(&self) -> Report {
        let entries = catalog_files(&self.data_dir, &self.config.date_resolver);
        analysis::calendar_report(&DayCalendar::build(&entries))
    }

    /// Drop loaded files and memoized reports.
    pub fn invalidate_cache(&mut self) {
        self.loaded = None;
        self.reductions.clear();
        debug!("cache invalidated");
    }

    /// Number of memoized reduction reports.
    pub fn cached_reductions(&self) -> usize {
        self.reductions.len()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Reload when the file set changed. Returns the current fingerprint.
    fn refresh(&mut self) -> FileSetKey {
        let paths = find_attendance_files(&self.data_dir);
        let key = FileSetKey::scan(&paths);

        let current = match self.loaded.take() {
            Some(set) if set.key == key => set,
            previous => {
                if previous.is_some() {
                    info!("Attendance files changed; reloading {}", self.data_dir.display());
                }
                self.reductions.retain(|(k, _), _| *k == key);
                LoadedSet {
                    files: load_daily_files(&paths, &self.config.date_resolver),
                    key: key.clone(),
                }
            }
        };
        self.loaded = Some(current);
        key
    }

    fn files(&self) -> &[DailyFile] {
        self.loaded
            .as_ref()
            .map(|set| set.files.as_slice())
            .unwrap_or(&[])
    }

    fn no_data(&self, what: &'static str) -> AttendanceError {
        AttendanceError::NoData {
            what,
            path: self.data_dir.clone(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
