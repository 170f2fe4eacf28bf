//! Distinct location values across a file set, used to offer filter choices.

use std::collections::BTreeSet;

use attendance_core::floor;
use attendance_core::models::DailyFile;
use serde::{Deserialize, Serialize};

/// Unique blocks, floors and rooms seen in any file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCatalog {
    /// Sorted ascending.
    pub blocks: Vec<String>,
    /// In floor order.
    pub floors: Vec<String>,
    /// Sorted as text.
    pub rooms: Vec<String>,
}

impl LocationCatalog {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.floors.is_empty() && self.rooms.is_empty()
    }
}

/// Collect the location catalog of `files`. Blank cells are ignored.
pub fn collect_locations(files: &[DailyFile]) -> LocationCatalog {
    let mut blocks = BTreeSet::new();
    let mut floors = BTreeSet::new();
    let mut rooms = BTreeSet::new();

    for rec in files.iter().flat_map(|f| f.records.iter()) {
        for (set, value) in [
            (&mut blocks, &rec.block),
            (&mut floors, &rec.floor),
            (&mut rooms, &rec.room_number),
        ] {
            if !value.is_empty() {
                set.insert(value.clone());
            }
        }
    }

    let mut floors: Vec<String> = floors.into_iter().collect();
    floors.sort_by(|a, b| floor::compare(a, b));

    LocationCatalog {
        blocks: blocks.into_iter().collect(),
        floors,
        rooms: rooms.into_iter().collect(),
    }
}
