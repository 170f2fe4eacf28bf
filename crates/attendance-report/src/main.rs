mod bootstrap;

use anyhow::{Context, Result};
use attendance_core::report::Report;
use attendance_core::settings::Settings;
use attendance_runtime::ReportManager;
use attendance_sink::OutputFormat;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("attendance-report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Data dir: {}, Format: {}",
        settings.view,
        settings.data_dir_or_default().display(),
        settings.format
    );

    let report = build_report(&settings)?;
    let format: OutputFormat = settings.format.parse()?;

    match &settings.export {
        Some(target) => {
            let written = attendance_sink::write(&report, format, target)
                .with_context(|| format!("exporting {} report", settings.view))?;
            for path in written {
                println!("Wrote {}", path.display());
            }
        }
        None => print!("{}", attendance_sink::render(&report, format)?),
    }

    Ok(())
}

/// Produce the report selected by `--view`.
fn build_report(settings: &Settings) -> Result<Report> {
    let config = settings.engine_config()?;
    let mut manager = ReportManager::new(settings.data_dir_or_default(), config);

    let report = match settings.view.as_str() {
        "daily" => manager.daily_report(settings.file.as_deref())?,
        "monthly" => manager.monthly_report(settings.month_key()?)?,
        "reduction" => manager.reduction_report(&settings.location_filter()?),
        "locations" => manager.locations_report(),
        "calendar" => manager.calendar_report(),
        unknown => anyhow::bail!("Unknown view mode: {}", unknown),
    };

    tracing::debug!(
        "Built \"{}\" with {} sections",
        report.title,
        report.sections.len()
    );
    Ok(report)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
