use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::error::{AttendanceError, Result};

// ── Column ────────────────────────────────────────────────────────────────────

/// A column of the daily attendance sheet the engine knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    /// Stable per-student identifier.
    StudentId,
    StudentName,
    /// `Present`, `Not Present`, or anything else.
    Status,
    Block,
    Floor,
    RoomNumber,
    /// Last biometric check-in, `HH:MM:SS`.
    LastPunch,
}

impl Column {
    /// Every known column, in header order of the source export.
    pub const ALL: [Column; 7] = [
        Column::StudentId,
        Column::StudentName,
        Column::Status,
        Column::Block,
        Column::Floor,
        Column::RoomNumber,
        Column::LastPunch,
    ];

    /// Header text used by the source sheets.
    pub fn header(self) -> &'static str {
        match self {
            Column::StudentId => "Employee Code",
            Column::StudentName => "Student Name",
            Column::Status => "Status",
            Column::Block => "Block",
            Column::Floor => "Floor",
            Column::RoomNumber => "Room No.",
            Column::LastPunch => "Last Punch",
        }
    }

    /// Map a header cell back to a column, ignoring surrounding whitespace.
    pub fn from_header(header: &str) -> Option<Column> {
        let trimmed = header.trim();
        Column::ALL.into_iter().find(|c| c.header() == trimmed)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Presence status of one student on one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Present,
    NotPresent,
    /// Any other value, kept verbatim. Counts toward totals only.
    Unknown(String),
}

impl Status {
    /// Parse a raw status cell.
    ///
    /// Matching ignores case and whitespace, so `"Not Present"`,
    /// `"not present"` and `"NotPresent"` are all [`Status::NotPresent`].
    pub fn parse(raw: &str) -> Status {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "present" => Status::Present,
            "notpresent" => Status::NotPresent,
            _ => Status::Unknown(raw.trim().to_string()),
        }
    }

    /// Display label used in reports.
    pub fn label(&self) -> &str {
        match self {
            Status::Present => "Present",
            Status::NotPresent => "Not Present",
            Status::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── AttendanceRecord / DailyFile ──────────────────────────────────────────────

/// One row of a daily attendance sheet.
///
/// Text fields are empty when their column is absent from the file; use
/// [`DailyFile::columns`] to tell an absent column from an empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// `None` when the column is absent or the cell is blank.
    pub student_id: Option<String>,
    pub student_name: String,
    pub status: Status,
    pub block: String,
    pub floor: String,
    /// Kept as text: `"0101"` and `"101"` are different rooms.
    pub room_number: String,
    /// Raw punch cell, `None` when absent or blank.
    pub last_punch: Option<String>,
}

/// All records of one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyFile {
    /// File stem, e.g. `"01-July-2025"`.
    pub identifier: String,
    /// Source path; empty for files built in memory. Breaks ordering ties
    /// between files sharing an identifier.
    #[serde(default)]
    pub path: PathBuf,
    /// Date resolved from the identifier, `None` when no format matched.
    pub date: Option<NaiveDate>,
    /// Columns the source actually provided.
    pub columns: BTreeSet<Column>,
    pub records: Vec<AttendanceRecord>,
}

impl DailyFile {
    /// `true` when the source sheet carried `column`.
    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Columns from `required` that this file lacks, in declaration order.
    pub fn missing_columns(&self, required: &[Column]) -> Vec<Column> {
        required
            .iter()
            .copied()
            .filter(|c| !self.columns.contains(c))
            .collect()
    }
}

// ── MonthKey / MonthCohort ────────────────────────────────────────────────────

/// Calendar month used to bucket daily files. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse the display form, e.g. `"Jul-2025"` (full month names work too).
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(&format!("01-{}", s.trim()), "%d-%B-%Y")
            .map(Self::from_date)
            .map_err(|_| AttendanceError::Config(format!("invalid month \"{}\"", s)))
    }

    /// First day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_day() {
            Some(day) => write!(f, "{}", day.format("%b-%Y")),
            None => write!(f, "{:02}-{}", self.month, self.year),
        }
    }
}

/// Daily files of one calendar month, sorted ascending by date.
#[derive(Debug, Clone)]
pub struct MonthCohort {
    pub month_key: MonthKey,
    pub files: Vec<DailyFile>,
}

// ── Daily analysis results ────────────────────────────────────────────────────

/// Head counts for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Number of rows, whatever their status.
    pub total: usize,
    pub present: usize,
    pub not_present: usize,
}

/// A present student whose last punch came after the cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatePunch {
    pub student_name: String,
    pub room_number: String,
    pub last_punch: chrono::NaiveTime,
}

/// An absent student to be followed up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyEntry {
    pub student_name: String,
    pub room_number: String,
}

/// Students of one status sharing a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomGroup {
    pub block: String,
    pub floor: String,
    pub room_number: String,
    pub count: usize,
    /// Sorted ascending.
    pub names: Vec<String>,
}

impl RoomGroup {
    /// Names joined for display, e.g. `"Asha, Ravi"`.
    pub fn names_display(&self) -> String {
        self.names.join(", ")
    }
}

/// Number of rows recorded against one floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorCount {
    pub floor: String,
    pub count: usize,
}

/// One x-axis point of a monthly trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Two-digit day of month, e.g. `"07"`.
    pub day_label: String,
    pub date: NaiveDate,
    pub present: usize,
    pub not_present: usize,
}

// ── Cumulative reduction ──────────────────────────────────────────────────────

/// Absence total for one student across all folded days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeAbsenceRecord {
    pub student_id: String,
    pub student_name: String,
    pub block: String,
    pub floor: String,
    pub room_number: String,
    pub reduction_days: u32,
}

/// Accepted values on one filter axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    /// Do not restrict on this axis.
    #[default]
    All,
    /// Keep only these values. Never empty.
    Only(BTreeSet<String>),
}

impl Selection {
    /// Build an explicit selection. Fails when `values` is empty.
    pub fn only<I, S>(axis: &'static str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if set.is_empty() {
            return Err(AttendanceError::InvalidFilter {
                axis,
                reason: "an explicit selection needs at least one value".to_string(),
            });
        }
        Ok(Selection::Only(set))
    }

    /// Interpret user input: no values, or any value equal to `all`
    /// (case-insensitive), means [`Selection::All`].
    pub fn from_values(axis: &'static str, values: &[String]) -> Result<Self> {
        if values.is_empty() || values.iter().any(|v| v.trim().eq_ignore_ascii_case("all")) {
            return Ok(Selection::All);
        }
        Self::only(axis, values)
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value.trim()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

/// Location predicates for the reduction report. All three axes are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationFilter {
    pub blocks: Selection,
    pub floors: Selection,
    pub rooms: Selection,
}

impl LocationFilter {
    /// Filter that keeps everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn accepts(&self, block: &str, floor: &str, room_number: &str) -> bool {
        self.blocks.accepts(block) && self.floors.accepts(floor) && self.rooms.accepts(room_number)
    }

    /// `true` when no axis restricts anything.
    pub fn is_unrestricted(&self) -> bool {
        self.blocks.is_all() && self.floors.is_all() && self.rooms.is_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Column ────────────────────────────────────────────────────────────────

    #[test]
    fn test_column_from_header_trims() {
        assert_eq!(Column::from_header(" Room No. "), Some(Column::RoomNumber));
        assert_eq!(Column::from_header("Employee Code"), Some(Column::StudentId));
        assert_eq!(Column::from_header("Remarks"), None);
    }

    // ── Status ────────────────────────────────────────────────────────────────

    #[test]
    fn test_status_parse_variants() {
        assert_eq!(Status::parse("Present"), Status::Present);
        assert_eq!(Status::parse(" present "), Status::Present);
        assert_eq!(Status::parse("Not Present"), Status::NotPresent);
        assert_eq!(Status::parse("NotPresent"), Status::NotPresent);
        assert_eq!(
            Status::parse(" On Leave "),
            Status::Unknown("On Leave".to_string())
        );
    }

    #[test]
    fn test_status_label() {
        assert_eq!(Status::NotPresent.to_string(), "Not Present");
        assert_eq!(Status::Unknown("Leave".to_string()).label(), "Leave");
    }

    // ── MonthKey ──────────────────────────────────────────────────────────────

    #[test]
    fn test_month_key_display_and_parse() {
        let key = MonthKey::from_date(NaiveDate::from_ymd_opt(2025, 7, 14).unwrap());
        assert_eq!(key.to_string(), "Jul-2025");
        assert_eq!(MonthKey::parse("Jul-2025").unwrap(), key);
        assert_eq!(MonthKey::parse("July-2025").unwrap(), key);
        assert!(MonthKey::parse("2025-07").is_err());
    }

    #[test]
    fn test_month_key_orders_chronologically() {
        let dec = MonthKey { year: 2024, month: 12 };
        let jan = MonthKey { year: 2025, month: 1 };
        let feb = MonthKey { year: 2025, month: 2 };
        let mut keys = vec![feb, dec, jan];
        keys.sort();
        assert_eq!(keys, vec![dec, jan, feb]);
    }

    // ── Selection / LocationFilter ────────────────────────────────────────────

    #[test]
    fn test_selection_only_rejects_empty() {
        let empty: Vec<String> = Vec::new();
        assert!(Selection::only("room", empty).is_err());
        assert!(Selection::only("room", ["  "]).is_err());
    }

    #[test]
    fn test_selection_from_values_all_sentinel() {
        assert_eq!(Selection::from_values("block", &[]).unwrap(), Selection::All);
        let values = vec!["A".to_string(), "All".to_string()];
        assert_eq!(Selection::from_values("block", &values).unwrap(), Selection::All);
    }

    #[test]
    fn test_selection_accepts_trimmed_strings() {
        let sel = Selection::only("room", ["101", "102"]).unwrap();
        assert!(sel.accepts("101"));
        assert!(sel.accepts(" 102"));
        assert!(!sel.accepts("0101"));
    }

    #[test]
    fn test_location_filter_ands_axes() {
        let filter = LocationFilter {
            blocks: Selection::only("block", ["A"]).unwrap(),
            floors: Selection::All,
            rooms: Selection::only("room", ["101"]).unwrap(),
        };
        assert!(filter.accepts("A", "FirstFloor", "101"));
        assert!(!filter.accepts("B", "FirstFloor", "101"));
        assert!(!filter.accepts("A", "FirstFloor", "102"));
        assert!(!filter.is_unrestricted());
        assert!(LocationFilter::all().is_unrestricted());
    }

    #[test]
    fn test_daily_file_missing_columns() {
        let day = DailyFile {
            identifier: "01-July-2025".to_string(),
            path: PathBuf::from("01-July-2025.csv"),
            date: None,
            columns: [Column::Status, Column::StudentName].into_iter().collect(),
            records: vec![],
        };
        assert!(day.has_column(Column::Status));
        assert_eq!(
            day.missing_columns(&[Column::Status, Column::Block, Column::Floor]),
            vec![Column::Block, Column::Floor]
        );
    }

    #[test]
    fn test_room_group_names_display() {
        let group = RoomGroup {
            block: "A".to_string(),
            floor: "FirstFloor".to_string(),
            room_number: "101".to_string(),
            count: 2,
            names: vec!["Asha".to_string(), "Ravi".to_string()],
        };
        assert_eq!(group.names_display(), "Asha, Ravi");
    }
}
