//! Cross-day "reduction days" fold.
//!
//! Absence counts are summed per student id across every eligible file. The
//! location attributes reported for a student come from the latest file that
//! mentions them: files are put into a canonical order (ascending date,
//! undated last, ties by identifier, then source path) before the per-file
//! partials are merged, so the result never depends on the order files were
//! handed in.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use attendance_core::floor;
use attendance_core::models::{CumulativeAbsenceRecord, DailyFile, LocationFilter, Status};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::normalizer::{require_or_warn, Requirement};

// ── Types ─────────────────────────────────────────────────────────────────────

/// Outcome of a reduction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reduction {
    /// Students with at least one absent day, after filtering, location sorted.
    pub records: Vec<CumulativeAbsenceRecord>,
    /// Files that contributed to the counts.
    pub files_folded: usize,
    /// Files left out for lacking required columns.
    pub files_skipped: usize,
}

#[derive(Debug, Clone)]
struct Snapshot {
    student_name: String,
    block: String,
    floor: String,
    room_number: String,
}

#[derive(Debug, Clone)]
struct Tally {
    absent_days: u32,
    snapshot: Snapshot,
}

/// Per-file contribution: at most one absent day per student.
type Partial = HashMap<String, Tally>;

// ── CumulativeReducer ─────────────────────────────────────────────────────────

/// Stateless cross-day reducer.
pub struct CumulativeReducer;

impl CumulativeReducer {
    /// Reduce `files` and keep only records accepted by `filter`.
    pub fn reduce(files: &[DailyFile], filter: &LocationFilter) -> Vec<CumulativeAbsenceRecord> {
        Self::reduce_detailed(files, filter).records
    }

    /// Like [`reduce`](Self::reduce), also reporting how many files were used.
    pub fn reduce_detailed(files: &[DailyFile], filter: &LocationFilter) -> Reduction {
        let mut ordered: Vec<&DailyFile> = files.iter().collect();
        ordered.sort_by(|a, b| canonical_order(a, b));

        let eligible: Vec<&DailyFile> = ordered
            .into_iter()
            .filter(|file| require_or_warn(file, Requirement::Cumulative))
            .collect();
        let files_skipped = files.len() - eligible.len();

        // Collecting a parallel iterator keeps the canonical order.
        let partials: Vec<Partial> = eligible.par_iter().map(|file| fold_file(file)).collect();

        let mut totals: BTreeMap<String, Tally> = BTreeMap::new();
        for partial in partials {
            for (id, tally) in partial {
                match totals.get_mut(&id) {
                    Some(existing) => {
                        existing.absent_days += tally.absent_days;
                        existing.snapshot = tally.snapshot;
                    }
                    None => {
                        totals.insert(id, tally);
                    }
                }
            }
        }

        let students_seen = totals.len();
        let mut records: Vec<CumulativeAbsenceRecord> = totals
            .into_iter()
            .filter(|(_, tally)| tally.absent_days > 0)
            .map(|(student_id, tally)| CumulativeAbsenceRecord {
                student_id,
                student_name: tally.snapshot.student_name,
                block: tally.snapshot.block,
                floor: tally.snapshot.floor,
                room_number: tally.snapshot.room_number,
                reduction_days: tally.absent_days,
            })
            .filter(|r| filter.accepts(&r.block, &r.floor, &r.room_number))
            .collect();

        records.sort_by(|a, b| {
            floor::compare_location(
                (a.block.as_str(), a.floor.as_str(), a.room_number.as_str()),
                (b.block.as_str(), b.floor.as_str(), b.room_number.as_str()),
            )
            .then_with(|| a.student_name.cmp(&b.student_name))
            .then_with(|| a.student_id.cmp(&b.student_id))
        });

        debug!(
            "Reduced {} files ({} skipped): {} students seen, {} reported",
            eligible.len(),
            files_skipped,
            students_seen,
            records.len()
        );

        Reduction {
            records,
            files_folded: eligible.len(),
            files_skipped,
        }
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn canonical_order(a: &DailyFile, b: &DailyFile) -> Ordering {
    match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.identifier.cmp(&b.identifier))
    .then_with(|| a.path.cmp(&b.path))
}

fn fold_file(file: &DailyFile) -> Partial {
    let mut partial: Partial = HashMap::with_capacity(file.records.len());
    let mut missing_ids = 0usize;

    for rec in &file.records {
        let Some(id) = rec.student_id.as_deref() else {
            missing_ids += 1;
            continue;
        };
        let absent = u32::from(rec.status == Status::NotPresent);
        let snapshot = Snapshot {
            student_name: rec.student_name.clone(),
            block: rec.block.clone(),
            floor: rec.floor.clone(),
            room_number: rec.room_number.clone(),
        };
        match partial.get_mut(id) {
            Some(existing) => {
                warn!(
                    "{}: student id {} appears more than once; counted once",
                    file.identifier, id
                );
                existing.absent_days = existing.absent_days.max(absent);
                existing.snapshot = snapshot;
            }
            None => {
                partial.insert(
                    id.to_string(),
                    Tally {
                        absent_days: absent,
                        snapshot,
                    },
                );
            }
        }
    }

    if missing_ids > 0 {
        debug!(
            "{}: {} rows without a student id ignored",
            file.identifier, missing_ids
        );
    }
    partial
}

// ── Tests ─────────────────────────────────────────────────────────────────────
