mod bootstrap;

use anyhow::Result;
use meter_core::formatting::{format_count, format_kwh};
use meter_core::settings::Settings;
use meter_runtime::orchestrator::{run_batch, BatchOptions, BatchReport};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let _log_guard = bootstrap::setup_logging(settings.verbose, settings.log_file.as_deref())?;

    tracing::info!("Meterline v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Data dir: {}, scratch dir: {}, no-cache: {}",
        settings.data_dir.display(),
        settings.scratch_dir.display(),
        settings.no_cache
    );

    let options = BatchOptions {
        data_dir: settings.data_dir.clone(),
        scratch_dir: settings.scratch_dir.clone(),
        force: settings.no_cache,
    };
    let report = run_batch(&options)?;

    print_report(&report);

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} export file(s) failed",
            report.failures.len(),
            report.discovered
        );
    }
    Ok(())
}

/// Human-readable summary of the batch, printed to stdout.
fn print_report(report: &BatchReport) {
    println!(
        "{} export file(s): {} rebuilt, {} reused, {} failed",
        report.discovered,
        report.rebuilt,
        report.reused,
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  failed: {}: {}", failure.path.display(), failure.error);
    }
    println!(
        "Corpus: {} record(s) -> {}",
        format_count(report.aggregate.record_count as u64),
        report.aggregate.jsonl_path.display()
    );
    println!(
        "Daily summary: {} day(s), {} imported -> {}",
        format_count(report.summary.days as u64),
        format_kwh(report.summary.total_import_kwh),
        report.summary.jsonl_path.display()
    );
}
