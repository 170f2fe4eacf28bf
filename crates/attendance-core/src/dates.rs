use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AttendanceError, Result};

// ── DateResolver ──────────────────────────────────────────────────────────────

/// Accepted file-name date encodings, tried in this order.
///
/// `%B` also accepts the abbreviated month name when parsing, so
/// `"05-Jul-2025"` resolves through the first entry.
pub const DEFAULT_DATE_FORMATS: [&str; 4] = ["%d-%B-%Y", "%d-%b-%Y", "%d-%B%Y", "%d-%b%Y"];

/// Resolves the calendar date encoded in a daily file's name.
///
/// Pure function of the identifier: the first format in the list that parses
/// wins, so the list order is part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateResolver {
    formats: Vec<String>,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self {
            formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl DateResolver {
    /// Resolver with a custom ordered format list.
    pub fn new(formats: Vec<String>) -> Result<Self> {
        if formats.is_empty() {
            return Err(AttendanceError::Config(
                "at least one date format is required".to_string(),
            ));
        }
        Ok(Self { formats })
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// Resolve the date of `identifier`, a file name with or without its
    /// `.csv` extension.
    pub fn resolve(&self, identifier: &str) -> Result<NaiveDate> {
        self.resolve_with_format(identifier).map(|(date, _)| date)
    }

    /// Like [`resolve`](Self::resolve) but also reports which format matched.
    pub fn resolve_with_format(&self, identifier: &str) -> Result<(NaiveDate, &str)> {
        let stem = strip_extension(identifier.trim());
        self.formats
            .iter()
            .find_map(|fmt| {
                NaiveDate::parse_from_str(stem, fmt)
                    .ok()
                    .map(|date| (date, fmt.as_str()))
            })
            .ok_or_else(|| AttendanceError::DateFormat {
                identifier: identifier.to_string(),
            })
    }
}

// ── Labels ────────────────────────────────────────────────────────────────────

/// Two-digit day of month used as a trend x-axis label.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%d").to_string()
}

/// Calendar label, e.g. `"05 (Sat)"`.
pub fn calendar_label(date: NaiveDate) -> String {
    date.format("%d (%a)").to_string()
}

/// File identifier for a path: its file name without the `.csv` extension.
pub fn file_identifier(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    strip_extension(&name).to_string()
}

fn strip_extension(name: &str) -> &str {
    let len = name.len();
    if len >= 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".csv") {
        &name[..len - 4]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_each_accepted_encoding() {
        let resolver = DateResolver::default();
        assert_eq!(resolver.resolve("01-July-2025").unwrap(), date(2025, 7, 1));
        assert_eq!(resolver.resolve("01-Jul-2025").unwrap(), date(2025, 7, 1));
        assert_eq!(resolver.resolve("01-July2025").unwrap(), date(2025, 7, 1));
        assert_eq!(resolver.resolve("01-Jul2025").unwrap(), date(2025, 7, 1));
    }

    #[test]
    fn test_resolve_strips_csv_extension() {
        let resolver = DateResolver::default();
        assert_eq!(resolver.resolve("15-June-2025.csv").unwrap(), date(2025, 6, 15));
        assert_eq!(resolver.resolve("15-Jun-2025.CSV").unwrap(), date(2025, 6, 15));
    }

    #[test]
    fn test_resolve_round_trips_every_format() {
        let resolver = DateResolver::default();
        let days = [date(2025, 1, 1), date(2025, 7, 9), date(2024, 2, 29), date(2025, 12, 31)];
        for fmt in DEFAULT_DATE_FORMATS {
            for day in days {
                let name = day.format(fmt).to_string();
                assert_eq!(resolver.resolve(&name).unwrap(), day, "format {fmt}, name {name}");
            }
        }
    }

    #[test]
    fn test_first_matching_format_wins() {
        let resolver = DateResolver::default();
        let (_, fmt) = resolver.resolve_with_format("03-Jul-2025").unwrap();
        assert_eq!(fmt, "%d-%B-%Y");
        let (_, fmt) = resolver.resolve_with_format("03-Jul2025").unwrap();
        assert_eq!(fmt, "%d-%B%Y");
    }

    #[test]
    fn test_resolve_failure_is_date_format_error() {
        let resolver = DateResolver::default();
        let err = resolver.resolve("attendance-latest").unwrap_err();
        assert!(matches!(err, AttendanceError::DateFormat { .. }));
        assert!(resolver.resolve("2025-07-01").is_err());
        assert!(resolver.resolve("31-June-2025").is_err());
    }

    #[test]
    fn test_custom_format_list() {
        let resolver = DateResolver::new(vec!["%Y-%m-%d".to_string()]).unwrap();
        assert_eq!(resolver.resolve("2025-07-01.csv").unwrap(), date(2025, 7, 1));
        assert!(resolver.resolve("01-July-2025").is_err());
        assert!(DateResolver::new(Vec::new()).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(day_label(date(2025, 7, 5)), "05");
        assert_eq!(calendar_label(date(2025, 7, 5)), "05 (Sat)");
    }

    #[test]
    fn test_file_identifier() {
        assert_eq!(file_identifier(Path::new("/data/01-July-2025.csv")), "01-July-2025");
        assert_eq!(file_identifier(Path::new("notes.txt")), "notes.txt");
    }
}
