//! Daily import summarization over the aggregate corpus.
//!
//! Buckets every interval by the UTC day of its `start_time` and emits one
//! total per calendar day, with zero-filled days covering any gaps between
//! the first and last observed day.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use meter_core::error::{PipelineError, Result};
use meter_core::models::{DailyTotal, IntervalRecord};
use meter_core::time_utils::{day_floor, format_day, SECONDS_PER_DAY};
use tracing::{debug, info};

use crate::pipeline::write_atomic;

/// Daily summary artifact written as JSON Lines.
pub const DAILY_JSONL: &str = "daily_import_usage.jsonl";

/// Daily summary artifact written as one pretty-printed JSON array.
pub const DAILY_JSON: &str = "daily_import_usage.json";

/// Paths and coverage of a finished daily summary.
#[derive(Debug, Clone)]
pub struct SummaryOutput {
    pub jsonl_path: PathBuf,
    pub json_path: PathBuf,
    pub days: usize,
    pub total_import_kwh: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Resample the aggregate corpus into contiguous daily import totals,
/// written next to the corpus itself.
///
/// A day's total is the sum of `import_kwh` over every interval starting
/// that UTC day; missing import values contribute nothing. The series runs
/// without gaps from the first to the last observed day, zero days included,
/// so downstream consumers can index it by offset.
pub fn summarize_daily(aggregate_path: &Path) -> Result<SummaryOutput> {
    let out_dir = aggregate_path.parent().unwrap_or(Path::new("."));

    let text = std::fs::read_to_string(aggregate_path).map_err(|source| {
        PipelineError::FileRead {
            path: aggregate_path.to_path_buf(),
            source,
        }
    })?;

    let mut totals_by_day: BTreeMap<i64, f64> = BTreeMap::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let record: IntervalRecord = serde_json::from_str(line)?;
        let day = day_floor(record.start_time);
        let total = totals_by_day.entry(day).or_insert(0.0);
        if let Some(import) = record.import_kwh {
            *total += import;
        }
    }

    let totals = fill_gaps(&totals_by_day);
    let total_import_kwh: f64 = totals.iter().map(|t| t.import_kwh).sum();

    let mut jsonl = String::new();
    for total in &totals {
        jsonl.push_str(&serde_json::to_string(total)?);
        jsonl.push('\n');
    }
    let jsonl_path = out_dir.join(DAILY_JSONL);
    write_atomic(&jsonl_path, &jsonl)?;

    let json_path = out_dir.join(DAILY_JSON);
    let mut pretty = serde_json::to_string_pretty(&totals)?;
    pretty.push('\n');
    write_atomic(&json_path, &pretty)?;

    if let (Some(first), Some(last)) = (totals.first(), totals.last()) {
        debug!(
            "Summary range {} to {}",
            format_day(first.start_time),
            format_day(last.start_time)
        );
    }
    info!("Daily summary covers {} days", totals.len());

    Ok(SummaryOutput {
        jsonl_path,
        json_path,
        days: totals.len(),
        total_import_kwh,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Expand observed daily totals into a contiguous series from the first to
/// the last observed day.
fn fill_gaps(totals_by_day: &BTreeMap<i64, f64>) -> Vec<DailyTotal> {
    let (Some(&first), Some(&last)) =
        (totals_by_day.keys().next(), totals_by_day.keys().next_back())
    else {
        return Vec::new();
    };

    let mut series = Vec::with_capacity(((last - first) / SECONDS_PER_DAY + 1) as usize);
    let mut day = first;
    while day <= last {
        series.push(DailyTotal {
            start_time: day,
            import_kwh: totals_by_day.get(&day).copied().unwrap_or(0.0),
        });
        day += SECONDS_PER_DAY;
    }
    series
}

// ── Tests ─────────────────────────────────────────────────────────────────────
