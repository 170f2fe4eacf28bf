use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{EngineConfig, DEFAULT_LATE_PUNCH_CUTOFF};
use crate::error::Result;
use crate::models::{LocationFilter, MonthKey, Selection};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Daily, monthly and reduction-day reports from attendance snapshots
#[derive(Parser, Debug, Clone)]
#[command(
    name = "attendance-report",
    about = "Daily, monthly and reduction-day reports from attendance snapshots",
    version
)]
pub struct Settings {
    /// Report to produce
    #[arg(long, default_value = "daily", value_parser = ["daily", "monthly", "reduction", "locations", "calendar"])]
    pub view: String,

    /// Directory holding the daily CSV files (defaults to the current directory)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Day file for the daily view, as a name ("01-July-2025") or a path
    #[arg(long)]
    pub file: Option<String>,

    /// Month for the monthly view, e.g. "Jul-2025" (defaults to the newest)
    #[arg(long)]
    pub month: Option<String>,

    /// Keep only these blocks in the reduction view (repeatable, "all" for no filter)
    #[arg(long = "block")]
    pub blocks: Vec<String>,

    /// Keep only these floors in the reduction view (repeatable)
    #[arg(long = "floor")]
    pub floors: Vec<String>,

    /// Keep only these room numbers in the reduction view (repeatable)
    #[arg(long = "room")]
    pub rooms: Vec<String>,

    /// Punches strictly after this time are late (HH:MM[:SS])
    #[arg(long, default_value = DEFAULT_LATE_PUNCH_CUTOFF)]
    pub late_cutoff: String,

    /// Accepted file-name date formats, tried in order (repeatable, chrono syntax)
    #[arg(long = "date-format")]
    pub date_formats: Vec<String>,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "csv", "json"])]
    pub format: String,

    /// Write the report here instead of stdout (a directory for csv)
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.attendance-report/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_cutoff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".attendance-report").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Temp file then rename.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`load_with_last_used`](Self::load_with_last_used) with an
    /// explicit argument list and config path, so tests can use a temp dir.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. Filters, file and month are per-run and never loaded.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "data_dir") && settings.data_dir.is_none() {
            settings.data_dir = last.data_dir;
        }
        if !is_arg_explicitly_set(&matches, "late_cutoff") {
            if let Some(v) = last.late_cutoff {
                settings.late_cutoff = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Engine tunables derived from the CLI values.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::from_parts(&self.late_cutoff, &self.date_formats)
    }

    /// Location filter for the reduction view.
    pub fn location_filter(&self) -> Result<LocationFilter> {
        Ok(LocationFilter {
            blocks: Selection::from_values("block", &self.blocks)?,
            floors: Selection::from_values("floor", &self.floors)?,
            rooms: Selection::from_values("room", &self.rooms)?,
        })
    }

    /// Month requested with `--month`, if any.
    pub fn month_key(&self) -> Result<Option<MonthKey>> {
        self.month.as_deref().map(MonthKey::parse).transpose()
    }

    /// Directory to scan, defaulting to the working directory.
    pub fn data_dir_or_default(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// `--debug` overrides log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            data_dir: s.data_dir.clone(),
            late_cutoff: Some(s.late_cutoff.clone()),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
