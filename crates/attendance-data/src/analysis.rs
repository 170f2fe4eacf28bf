//! Report assembly.
//!
//! Turns the results of the daily analyzer, the trend aggregator and the
//! cumulative reducer into [`Report`]s for the sink. A daily section whose
//! columns are missing from the file is still emitted, empty, with a note
//! explaining why; other sections of the same report are unaffected.

use std::path::Path;

use attendance_core::config::EngineConfig;
use attendance_core::error::Result;
use attendance_core::models::{DailyFile, LocationFilter, MonthCohort, Status};
use attendance_core::report::{Report, Table};
use tracing::{info, warn};

use crate::calendar::DayCalendar;
use crate::daily::DailyAnalyzer;
use crate::locations::LocationCatalog;
use crate::normalizer::{require, Requirement};
use crate::reader::load_daily_file;
use crate::reducer::CumulativeReducer;
use crate::trend::TrendAggregator;

// ── Section names ─────────────────────────────────────────────────────────────

pub const DAILY_SUMMARY: &str = "Daily Summary";
pub const LATE_PUNCHES: &str = "Late Biometric Punches";
pub const STUDENTS_TO_NOTIFY: &str = "Students to Notify";
pub const PRESENT_PER_ROOM: &str = "Present Students per Room";
pub const ABSENT_PER_ROOM: &str = "Absent Students per Room";
pub const STUDENTS_PER_FLOOR: &str = "Students per Floor";
pub const ATTENDANCE_TREND: &str = "Daily Attendance Trend";
pub const REDUCTION_DAYS: &str = "Reduction Days";

// ── Daily ─────────────────────────────────────────────────────────────────────

/// Load the file at `path` and build its daily report.
///
/// Unreadable files fail with [`SourceRead`](attendance_core::AttendanceError::SourceRead);
/// an unrecognised file-name date does not.
pub fn analyze_day(path: &Path, config: &EngineConfig) -> Result<Report> {
    let day = load_daily_file(path, &config.date_resolver)?;
    Ok(daily_report(&day, config))
}

/// Every single-day section for `day`.
pub fn daily_report(day: &DailyFile, config: &EngineConfig) -> Report {
    let mut report = Report::new(format!("Daily Report: {}", day.identifier));

    push_checked(&mut report, day, Requirement::Summary, DAILY_SUMMARY, &["Metric", "Count"], |t| {
        let summary = DailyAnalyzer::summarize(day);
        t.push_row(["Total Students".to_string(), summary.total.to_string()]);
        t.push_row(["Present".to_string(), summary.present.to_string()]);
        t.push_row(["Absent".to_string(), summary.not_present.to_string()]);
    });

    push_checked(
        &mut report,
        day,
        Requirement::LatePunch,
        LATE_PUNCHES,
        &["Student Name", "Room No.", "Last Punch"],
        |t| {
            for late in DailyAnalyzer::late_arrivals(day, config.late_punch_cutoff) {
                t.push_row([
                    late.student_name,
                    late.room_number,
                    late.last_punch.format("%H:%M:%S").to_string(),
                ]);
            }
        },
    );

    push_checked(
        &mut report,
        day,
        Requirement::Notify,
        STUDENTS_TO_NOTIFY,
        &["Student Name", "Room No."],
        |t| {
            for entry in DailyAnalyzer::notify_list(day) {
                t.push_row([entry.student_name, entry.room_number]);
            }
        },
    );

    for (name, status, label) in [
        (PRESENT_PER_ROOM, Status::Present, "Present"),
        (ABSENT_PER_ROOM, Status::NotPresent, "Absent"),
    ] {
        let count_col = format!("{label} Count");
        let names_col = format!("{label} Names");
        let columns = ["Block", "Floor", "Room No.", count_col.as_str(), names_col.as_str()];
        push_checked(&mut report, day, Requirement::Breakdown, name, &columns, |t| {
            for group in DailyAnalyzer::room_breakdown(day, &status) {
                let names = group.names_display();
                t.push_row([group.block, group.floor, group.room_number, group.count.to_string(), names]);
            }
        });
    }

    push_checked(
        &mut report,
        day,
        Requirement::Occupancy,
        STUDENTS_PER_FLOOR,
        &["Floor", "Students"],
        |t| {
            for count in DailyAnalyzer::floor_occupancy(day) {
                t.push_row([count.floor, count.count.to_string()]);
            }
        },
    );

    report
}

// ── Monthly ───────────────────────────────────────────────────────────────────

/// Present / absent counts per day of `cohort`.
pub fn monthly_report(cohort: &MonthCohort) -> Report {
    let mut report = Report::new(format!("Monthly Trend: {}", cohort.month_key));
    let mut table = Table::new(&["Day", "Date", "Present", "Not Present"]);
    for point in TrendAggregator::trend(cohort) {
        table.push_row([
            point.day_label,
            point.date.format("%Y-%m-%d").to_string(),
            point.present.to_string(),
            point.not_present.to_string(),
        ]);
    }
    report.push_section(ATTENDANCE_TREND, table);
    report
}

// ── Reduction ─────────────────────────────────────────────────────────────────

/// Students with reduction days across `files`, narrowed by `filter`.
pub fn reduction_report(files: &[DailyFile], filter: &LocationFilter) -> Report {
    let reduction = CumulativeReducer::reduce_detailed(files, filter);
    info!(
        "Reduction over {} files: {} students",
        reduction.files_folded,
        reduction.records.len()
    );

    let mut report = Report::new("Reduction Days Report");
    let mut table = Table::new(&[
        "Employee Code",
        "Student Name",
        "Block",
        "Floor",
        "Room No.",
        "Reduction Days",
    ]);
    for rec in reduction.records {
        table.push_row([
            rec.student_id,
            rec.student_name,
            rec.block,
            rec.floor,
            rec.room_number,
            rec.reduction_days.to_string(),
        ]);
    }
    report.push_section(REDUCTION_DAYS, table);

    if reduction.files_skipped > 0 {
        report.push_note(format!(
            "{} of {} files skipped for missing columns",
            reduction.files_skipped,
            files.len()
        ));
    }
    report
}

// ── Navigation ────────────────────────────────────────────────────────────────

/// Filter choices available across the data directory.
pub fn locations_report(catalog: &LocationCatalog) -> Report {
    let mut report = Report::new("Locations");
    for (name, header, values) in [
        ("Blocks", "Block", &catalog.blocks),
        ("Floors", "Floor", &catalog.floors),
        ("Rooms", "Room No.", &catalog.rooms),
    ] {
        let mut table = Table::new(&[header]);
        for value in values {
            table.push_row([value.as_str()]);
        }
        report.push_section(name, table);
    }
    report
}

/// Dated files, newest first.
pub fn calendar_report(calendar: &DayCalendar) -> Report {
    let mut report = Report::new("Available Days");
    let mut table = Table::new(&["Year", "Month", "Day", "File"]);
    for year in &calendar.years {
        for month in &year.months {
            for day in &month.days {
                table.push_row([
                    year.year.to_string(),
                    month.month_key.to_string(),
                    day.label.clone(),
                    day.identifier.clone(),
                ]);
            }
        }
    }
    report.push_section("Days", table);
    report
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn push_checked<F>(
    report: &mut Report,
    day: &DailyFile,
    requirement: Requirement,
    name: &str,
    columns: &[&str],
    fill: F,
) where
    F: FnOnce(&mut Table),
{
    let mut table = Table::new(columns);
    match require(day, requirement) {
        Ok(()) => fill(&mut table),
        Err(e) => {
            warn!("{}: {}", day.identifier, e);
            report.push_note(e.to_string());
        }
    }
    report.push_section(name, table);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
