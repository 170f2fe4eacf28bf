//! Year / month / day navigation over the dated files of a directory.

use std::collections::BTreeMap;

use attendance_core::dates::calendar_label;
use attendance_core::models::MonthKey;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::reader::FileEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// e.g. `"05 (Sat)"`.
    pub label: String,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub month_key: MonthKey,
    /// Newest first.
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarYear {
    pub year: i32,
    /// Newest first.
    pub months: Vec<CalendarMonth>,
}

/// Dated files arranged newest first at every level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCalendar {
    pub years: Vec<CalendarYear>,
}

impl DayCalendar {
    /// Build the calendar from catalogued files. Undated entries are ignored.
    pub fn build(entries: &[FileEntry]) -> Self {
        let mut tree: BTreeMap<i32, BTreeMap<MonthKey, Vec<CalendarDay>>> = BTreeMap::new();
        for entry in entries {
            let Some(date) = entry.date else { continue };
            tree.entry(date.year())
                .or_default()
                .entry(MonthKey::from_date(date))
                .or_default()
                .push(CalendarDay {
                    date,
                    label: calendar_label(date),
                    identifier: entry.identifier.clone(),
                });
        }

        let years = tree
            .into_iter()
            .rev()
            .map(|(year, months)| CalendarYear {
                year,
                months: months
                    .into_iter()
                    .rev()
                    .map(|(month_key, mut days)| {
                        days.sort_by(|a, b| {
                            b.date.cmp(&a.date).then_with(|| a.identifier.cmp(&b.identifier))
                        });
                        CalendarMonth { month_key, days }
                    })
                    .collect(),
            })
            .collect();

        Self { years }
    }

    /// The most recent day, if any.
    pub fn newest(&self) -> Option<&CalendarDay> {
        self.years
            .first()
            .and_then(|y| y.months.first())
            .and_then(|m| m.days.first())
    }

    /// Every day, newest first.
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.years
            .iter()
            .flat_map(|y| y.months.iter())
            .flat_map(|m| m.days.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(identifier: &str, date: Option<(i32, u32, u32)>) -> FileEntry {
        FileEntry {
            path: PathBuf::from(format!("{identifier}.csv")),
            identifier: identifier.to_string(),
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    #[test]
    fn test_build_orders_newest_first() {
        let calendar = DayCalendar::build(&[
            entry("30-December-2024", Some((2024, 12, 30))),
            entry("01-July-2025", Some((2025, 7, 1))),
            entry("05-July-2025", Some((2025, 7, 5))),
            entry("15-June-2025", Some((2025, 6, 15))),
            entry("notes", None),
        ]);

        let years: Vec<i32> = calendar.years.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2025, 2024]);

        let months: Vec<String> = calendar.years[0]
            .months
            .iter()
            .map(|m| m.month_key.to_string())
            .collect();
        assert_eq!(months, vec!["Jul-2025", "Jun-2025"]);

        let labels: Vec<&str> = calendar.years[0].months[0]
            .days
            .iter()
            .map(|d| d.label.as_str())
            .collect();
        assert_eq!(labels, vec!["05 (Sat)", "01 (Tue)"]);

        assert_eq!(calendar.newest().unwrap().identifier, "05-July-2025");
        assert_eq!(calendar.days().count(), 4);
    }

    #[test]
    fn test_build_without_dated_files() {
        let calendar = DayCalendar::build(&[entry("latest", None)]);
        assert!(calendar.is_empty());
        assert!(calendar.newest().is_none());
    }
}
