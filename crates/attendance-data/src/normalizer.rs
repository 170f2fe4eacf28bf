//! Turns raw CSV rows into [`AttendanceRecord`]s and checks that a day file
//! carries the columns a given analysis needs.

use attendance_core::error::{AttendanceError, Result};
use attendance_core::models::{AttendanceRecord, Column, DailyFile, Status};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::reader::RawTable;

// ── Requirement ───────────────────────────────────────────────────────────────

/// Column sets needed by each analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Head counts and trend points.
    Summary,
    /// Absent-student follow-up list.
    Notify,
    /// Per-room groups.
    Breakdown,
    /// Late punches: the breakdown set plus the punch column.
    LatePunch,
    /// Cross-day reduction: the breakdown set plus the student id.
    Cumulative,
    /// Rows per floor.
    Occupancy,
}

impl Requirement {
    pub fn columns(self) -> &'static [Column] {
        match self {
            Requirement::Summary => &[Column::Status],
            Requirement::Notify => &[Column::Status, Column::StudentName, Column::RoomNumber],
            Requirement::Breakdown => &[
                Column::Status,
                Column::StudentName,
                Column::RoomNumber,
                Column::Block,
                Column::Floor,
            ],
            Requirement::LatePunch => &[
                Column::Status,
                Column::StudentName,
                Column::RoomNumber,
                Column::Block,
                Column::Floor,
                Column::LastPunch,
            ],
            Requirement::Cumulative => &[
                Column::StudentId,
                Column::Status,
                Column::StudentName,
                Column::RoomNumber,
                Column::Block,
                Column::Floor,
            ],
            Requirement::Occupancy => &[Column::Floor],
        }
    }

    /// Analysis name used in warnings.
    pub fn analysis(self) -> &'static str {
        match self {
            Requirement::Summary => "daily summary",
            Requirement::Notify => "students to notify",
            Requirement::Breakdown => "per-room breakdown",
            Requirement::LatePunch => "late punch detection",
            Requirement::Cumulative => "reduction days",
            Requirement::Occupancy => "floor occupancy",
        }
    }
}

/// Check that `day` satisfies `requirement`.
pub fn require(day: &DailyFile, requirement: Requirement) -> Result<()> {
    let missing = day.missing_columns(requirement.columns());
    if missing.is_empty() {
        return Ok(());
    }
    Err(AttendanceError::MissingColumns {
        analysis: requirement.analysis(),
        missing: missing.iter().map(|c| c.header().to_string()).collect(),
    })
}

/// [`require`], logging a warning naming the file when unmet.
pub fn require_or_warn(day: &DailyFile, requirement: Requirement) -> bool {
    match require(day, requirement) {
        Ok(()) => true,
        Err(e) => {
            warn!("{}: {}; skipping", day.identifier, e);
            false
        }
    }
}

// ── normalize ─────────────────────────────────────────────────────────────────

/// Build a [`DailyFile`] from a raw table.
///
/// Every non-blank row becomes a record; fields of absent columns are empty.
/// The returned file has an empty `path`; the loader fills it in.
/// Unrecognised status values are kept as [`Status::Unknown`].
pub fn normalize(identifier: String, date: Option<NaiveDate>, table: &RawTable) -> DailyFile {
    let columns = table.columns().collect();
    let mut records = Vec::with_capacity(table.len());
    let mut blank_rows = 0usize;

    for row in 0..table.len() {
        if table.rows[row].iter().all(|cell| cell.trim().is_empty()) {
            blank_rows += 1;
            continue;
        }
        records.push(map_row(table, row));
    }

    let unknown = records
        .iter()
        .filter(|r| matches!(r.status, Status::Unknown(_)))
        .count();

    debug!(
        "File {}: {} records, {} blank rows skipped, {} unrecognised statuses",
        identifier,
        records.len(),
        blank_rows,
        unknown,
    );

    DailyFile {
        identifier,
        path: PathBuf::new(),
        date,
        columns,
        records,
    }
}

fn map_row(table: &RawTable, row: usize) -> AttendanceRecord {
    let text = |column: Column| -> String {
        table
            .value(row, column)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };
    let optional = |column: Column| -> Option<String> {
        table
            .value(row, column)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    AttendanceRecord {
        student_id: optional(Column::StudentId),
        student_name: text(Column::StudentName),
        status: Status::parse(&text(Column::Status)),
        block: text(Column::Block),
        floor: text(Column::Floor),
        room_number: text(Column::RoomNumber),
        last_punch: optional(Column::LastPunch),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_normalize_full_row() {
        let raw = table(
            &["Employee Code", "Student Name", "Status", "Block", "Floor", "Room No.", "Last Punch"],
            &[&["S1", "Asha", "Present", "A", "FirstFloor", "101", "20:50:00"]],
        );
        let day = normalize("01-July-2025".to_string(), None, &raw);

        assert_eq!(day.records.len(), 1);
        let rec = &day.records[0];
        assert_eq!(rec.student_id.as_deref(), Some("S1"));
        assert_eq!(rec.status, Status::Present);
        assert_eq!(rec.room_number, "101");
        assert_eq!(rec.last_punch.as_deref(), Some("20:50:00"));
        assert!(require(&day, Requirement::Cumulative).is_ok());
        assert!(require(&day, Requirement::LatePunch).is_ok());
    }

    #[test]
    fn test_normalize_preserves_unknown_status() {
        let raw = table(&["Status"], &[&["Present"], &["On Leave"], &[""]]);
        let day = normalize("d".to_string(), None, &raw);

        // The blank row is dropped; the unrecognised one is kept.
        assert_eq!(day.records.len(), 2);
        assert_eq!(day.records[1].status, Status::Unknown("On Leave".to_string()));
    }

    #[test]
    fn test_normalize_blank_student_id_is_none() {
        let raw = table(&["Employee Code", "Status"], &[&["", "Present"]]);
        let day = normalize("d".to_string(), None, &raw);
        assert_eq!(day.records[0].student_id, None);
    }

    #[test]
    fn test_require_reports_missing_columns() {
        let raw = table(&["Status", "Student Name"], &[&["Present", "Asha"]]);
        let day = normalize("d".to_string(), None, &raw);

        assert!(require(&day, Requirement::Summary).is_ok());
        match require(&day, Requirement::Breakdown) {
            Err(AttendanceError::MissingColumns { analysis, missing }) => {
                assert_eq!(analysis, "per-room breakdown");
                assert_eq!(missing, vec!["Room No.", "Block", "Floor"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!require_or_warn(&day, Requirement::Cumulative));
    }

    #[test]
    fn test_requirement_sets_nest() {
        for col in Requirement::Breakdown.columns() {
            assert!(Requirement::Cumulative.columns().contains(col));
            assert!(Requirement::LatePunch.columns().contains(col));
        }
        assert!(Requirement::Cumulative.columns().contains(&Column::StudentId));
    }
}
