//! In-memory fixtures shared by the unit tests of this crate.

use std::path::PathBuf;

use attendance_core::dates::DateResolver;
use attendance_core::models::{AttendanceRecord, Column, DailyFile, Status};

/// Row under construction.
pub struct Row(AttendanceRecord);

impl Row {
    pub fn punch(mut self, time: &str) -> Self {
        self.0.last_punch = Some(time.to_string());
        self
    }
}

pub fn row(id: &str, name: &str, status: &str, block: &str, floor: &str, room: &str) -> Row {
    Row(AttendanceRecord {
        student_id: (!id.is_empty()).then(|| id.to_string()),
        student_name: name.to_string(),
        status: Status::parse(status),
        block: block.to_string(),
        floor: floor.to_string(),
        room_number: room.to_string(),
        last_punch: None,
    })
}

/// A day carrying every known column, dated from `identifier` when it parses.
pub fn day(identifier: &str, rows: Vec<Row>) -> DailyFile {
    day_without(identifier, rows, &[])
}

/// Like [`day`], with `missing` columns dropped from the header set.
pub fn day_without(identifier: &str, rows: Vec<Row>, missing: &[Column]) -> DailyFile {
    DailyFile {
        identifier: identifier.to_string(),
        path: PathBuf::from(format!("{identifier}.csv")),
        date: DateResolver::default().resolve(identifier).ok(),
        columns: Column::ALL
            .into_iter()
            .filter(|c| !missing.contains(c))
            .collect(),
        records: rows.into_iter().map(|r| r.0).collect(),
    }
}
