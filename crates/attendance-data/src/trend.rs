//! Per-day present / not-present series for one month cohort.

use attendance_core::dates::day_label;
use attendance_core::models::{MonthCohort, TrendPoint};
use tracing::warn;

use crate::daily::DailyAnalyzer;
use crate::normalizer::{require, Requirement};

/// Stateless trend builder.
pub struct TrendAggregator;

impl TrendAggregator {
    /// One point per file of `cohort`, in cohort order.
    ///
    /// A file that lacks the status column, or has no rows, still yields a
    /// point with zero counts so the x-axis keeps every day.
    pub fn trend(cohort: &MonthCohort) -> Vec<TrendPoint> {
        cohort
            .files
            .iter()
            .filter_map(|file| {
                let date = file.date?;
                let (present, not_present) = match require(file, Requirement::Summary) {
                    Ok(()) => {
                        let summary = DailyAnalyzer::summarize(file);
                        (summary.present, summary.not_present)
                    }
                    Err(e) => {
                        warn!("{}: {}; plotted as zero", file.identifier, e);
                        (0, 0)
                    }
                };
                Some(TrendPoint {
                    day_label: day_label(date),
                    date,
                    present,
                    not_present,
                })
            })
            .collect()
    }
}
