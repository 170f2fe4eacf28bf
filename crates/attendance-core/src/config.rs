use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::dates::DateResolver;
use crate::error::{AttendanceError, Result};

/// Default late-punch cutoff (8:45 PM). Punches strictly after it are late.
pub const DEFAULT_LATE_PUNCH_CUTOFF: &str = "20:45:00";

/// Tunables the aggregation engine reads instead of hard-coding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Exclusive cutoff for the late-punch view.
    pub late_punch_cutoff: NaiveTime,
    /// Ordered file-name date encodings.
    pub date_resolver: DateResolver,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            late_punch_cutoff: NaiveTime::from_hms_opt(20, 45, 0).unwrap_or(NaiveTime::MIN),
            date_resolver: DateResolver::default(),
        }
    }
}

impl EngineConfig {
    /// Build a config from user-facing strings.
    ///
    /// An empty `date_formats` list keeps the default encodings.
    pub fn from_parts(late_punch_cutoff: &str, date_formats: &[String]) -> Result<Self> {
        let cutoff = parse_cutoff(late_punch_cutoff)?;
        let date_resolver = if date_formats.is_empty() {
            DateResolver::default()
        } else {
            DateResolver::new(date_formats.to_vec())?
        };
        Ok(Self {
            late_punch_cutoff: cutoff,
            date_resolver,
        })
    }
}

/// Parse a cutoff given as `HH:MM:SS` or `HH:MM`.
pub fn parse_cutoff(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| {
            AttendanceError::Config(format!(
                "late punch cutoff \"{}\" is not a HH:MM[:SS] time",
                s
            ))
        })
}
