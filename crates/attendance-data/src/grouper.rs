//! Buckets daily files into calendar-month cohorts.

use std::collections::BTreeMap;

use attendance_core::models::{DailyFile, MonthCohort, MonthKey};
use tracing::debug;

/// Stateless month grouping.
pub struct MonthGrouper;

impl MonthGrouper {
    /// Group `files` by the calendar month of their resolved date.
    ///
    /// Files without a date are left out; the loader has already warned about
    /// them. Each cohort is sorted ascending by date, ties broken by identifier
    /// then source path, so the result does not depend on input order.
    pub fn group(files: Vec<DailyFile>) -> BTreeMap<MonthKey, MonthCohort> {
        let mut cohorts: BTreeMap<MonthKey, MonthCohort> = BTreeMap::new();
        let mut undated = 0usize;

        for file in files {
            let Some(date) = file.date else {
                debug!("{}: undated; left out of month cohorts", file.identifier);
                undated += 1;
                continue;
            };
            let key = MonthKey::from_date(date);
            cohorts
                .entry(key)
                .or_insert_with(|| MonthCohort {
                    month_key: key,
                    files: Vec::new(),
                })
                .files
                .push(file);
        }

        for cohort in cohorts.values_mut() {
            cohort
                .files
                .sort_by(|a, b| {
                    a.date
                        .cmp(&b.date)
                        .then_with(|| a.identifier.cmp(&b.identifier))
                        .then_with(|| a.path.cmp(&b.path))
                });
        }

        debug!(
            "Grouped into {} month cohorts ({} undated files left out)",
            cohorts.len(),
            undated
        );
        cohorts
    }

    /// The most recent month present in `files`, if any file is dated.
    pub fn latest_month(files: &[DailyFile]) -> Option<MonthKey> {
        files.iter().filter_map(|f| f.date).max().map(MonthKey::from_date)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
