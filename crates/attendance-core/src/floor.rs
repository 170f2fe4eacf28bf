//! Fixed floor ordering used by every location-sorted view.
//!
//! Known floors rank by their position in [`STANDARD_FLOORS`]; any other name
//! ranks after all of them, alphabetically among the unknowns.

use std::cmp::Ordering;

/// Canonical floor names, lowest first.
pub const STANDARD_FLOORS: [&str; 9] = [
    "GroundFloor",
    "FirstFloor",
    "SecondFloor",
    "ThirdFloor",
    "FourthFloor",
    "FifthFloor",
    "SixthFloor",
    "SeventhFloor",
    "EighthFloor",
];

/// Sort key for a floor name.
///
/// Variant order matters: every `Known` sorts before every `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FloorRank {
    Known(usize),
    Unknown(String),
}

/// Rank `floor` against [`STANDARD_FLOORS`].
///
/// Matching ignores case, whitespace, `_` and `-`, so `"First Floor"` and
/// `"first_floor"` both rank as `FirstFloor`.
pub fn rank(floor: &str) -> FloorRank {
    let key = match_key(floor);
    STANDARD_FLOORS
        .iter()
        .position(|known| match_key(known) == key)
        .map(FloorRank::Known)
        .unwrap_or_else(|| FloorRank::Unknown(floor.trim().to_string()))
}

/// Compare two floor names by rank.
pub fn compare(a: &str, b: &str) -> Ordering {
    rank(a).cmp(&rank(b))
}

/// Order by (block ascending, floor rank, room number as text).
pub fn compare_location(a: (&str, &str, &str), b: (&str, &str, &str)) -> Ordering {
    a.0.cmp(b.0)
        .then_with(|| compare(a.1, b.1))
        .then_with(|| a.2.cmp(b.2))
}

fn match_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
