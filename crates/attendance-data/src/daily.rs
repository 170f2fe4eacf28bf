//! Single-day analysis: head counts, late punches, per-room groups and the
//! absent-student follow-up list.
//!
//! Every operation is a pure function of one [`DailyFile`]. Callers are
//! expected to have checked the matching [`Requirement`](crate::normalizer::Requirement)
//! first; rows of a file lacking a column simply carry empty text.

use std::collections::{BTreeMap, BTreeSet};

use attendance_core::error::{AttendanceError, Result};
use attendance_core::floor;
use attendance_core::models::{
    DailyFile, DailySummary, FloorCount, LatePunch, NotifyEntry, RoomGroup, Status,
};
use chrono::NaiveTime;
use tracing::debug;

/// Punch cells are exported as `HH:MM:SS`.
const PUNCH_FORMAT: &str = "%H:%M:%S";

/// Stateless helper grouping the per-day computations.
pub struct DailyAnalyzer;

impl DailyAnalyzer {
    /// Row count plus present / not-present counts.
    ///
    /// Unrecognised statuses count toward `total` only, so
    /// `present + not_present <= total`.
    pub fn summarize(day: &DailyFile) -> DailySummary {
        day.records
            .iter()
            .fold(DailySummary::default(), |mut acc, rec| {
                acc.total += 1;
                match rec.status {
                    Status::Present => acc.present += 1,
                    Status::NotPresent => acc.not_present += 1,
                    Status::Unknown(_) => {}
                }
                acc
            })
    }

    /// Present students whose last punch is strictly after `threshold`, in
    /// file order. Rows with a missing or unparsable punch are left out.
    pub fn late_arrivals(day: &DailyFile, threshold: NaiveTime) -> Vec<LatePunch> {
        let mut skipped = 0usize;
        let late: Vec<LatePunch> = day
            .records
            .iter()
            .filter(|rec| rec.status == Status::Present)
            .filter_map(|rec| {
                let raw = rec.last_punch.as_deref()?;
                match parse_punch_time(raw) {
                    Ok(time) => Some((rec, time)),
                    Err(_) => {
                        skipped += 1;
                        None
                    }
                }
            })
            .filter(|(_, time)| *time > threshold)
            .map(|(rec, time)| LatePunch {
                student_name: rec.student_name.clone(),
                room_number: rec.room_number.clone(),
                last_punch: time,
            })
            .collect();

        if skipped > 0 {
            debug!(
                "{}: {} punch times could not be parsed",
                day.identifier, skipped
            );
        }
        late
    }

    /// Rows with `status`, grouped by (block, floor, room).
    ///
    /// Names inside a group are sorted ascending; groups are sorted by block,
    /// floor rank, then room number as text.
    pub fn room_breakdown(day: &DailyFile, status: &Status) -> Vec<RoomGroup> {
        let mut groups: BTreeMap<(&str, &str, &str), Vec<String>> = BTreeMap::new();
        for rec in day.records.iter().filter(|r| &r.status == status) {
            groups
                .entry((rec.block.as_str(), rec.floor.as_str(), rec.room_number.as_str()))
                .or_default()
                .push(rec.student_name.clone());
        }

        let mut result: Vec<RoomGroup> = groups
            .into_iter()
            .map(|((block, floor, room), mut names)| {
                names.sort();
                RoomGroup {
                    block: block.to_string(),
                    floor: floor.to_string(),
                    room_number: room.to_string(),
                    count: names.len(),
                    names,
                }
            })
            .collect();

        result.sort_by(|a, b| {
            floor::compare_location(
                (a.block.as_str(), a.floor.as_str(), a.room_number.as_str()),
                (b.block.as_str(), b.floor.as_str(), b.room_number.as_str()),
            )
        });
        result
    }

    /// Absent students sorted by name.
    pub fn notify_list(day: &DailyFile) -> Vec<NotifyEntry> {
        let mut entries: Vec<NotifyEntry> = day
            .records
            .iter()
            .filter(|r| r.status == Status::NotPresent)
            .map(|r| NotifyEntry {
                student_name: r.student_name.clone(),
                room_number: r.room_number.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.student_name.cmp(&b.student_name));
        entries
    }

    /// Rows per floor, whatever their status, in floor order.
    pub fn floor_occupancy(day: &DailyFile) -> Vec<FloorCount> {
        let floors: BTreeSet<&str> = day.records.iter().map(|r| r.floor.as_str()).collect();
        let mut counts: Vec<FloorCount> = floors
            .into_iter()
            .map(|name| FloorCount {
                floor: name.to_string(),
                count: day.records.iter().filter(|r| r.floor == name).count(),
            })
            .collect();
        counts.sort_by(|a, b| floor::compare(&a.floor, &b.floor));
        counts
    }
}

/// Parse a punch cell as `HH:MM:SS`.
pub fn parse_punch_time(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), PUNCH_FORMAT)
        .map_err(|_| AttendanceError::UnparsableTime(raw.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
