//! Batch orchestrator for a full ingestion run.
//!
//! Discovers export files, drives each one through the cached per-file
//! pipeline with failure isolation, and then derives the aggregate corpus and
//! daily summary. Aggregation starts only after every per-file outcome is
//! settled and consumes exactly the artifacts produced or reused by this run,
//! so leftovers from files that no longer exist cannot leak into the corpus.

use std::path::PathBuf;

use meter_core::error::{PipelineError, Result};
use meter_data::aggregate::{self, AggregateOutput};
use meter_data::reader::find_export_files;
use meter_data::summary::{self, SummaryOutput};
use tracing::{error, info, warn};

use crate::cache::{ArtifactCache, CacheAction};

// ── Public types ──────────────────────────────────────────────────────────────

/// Inputs of one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory scanned recursively for vendor export files.
    pub data_dir: PathBuf,
    /// Directory receiving per-file artifacts and aggregate outputs.
    pub scratch_dir: PathBuf,
    /// When `true`, existing artifacts are discarded and recomputed.
    pub force: bool,
}

/// One export file that failed, with the error that stopped it.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: PipelineError,
}

/// Outcome of a batch run.
///
/// A report exists even when some files failed; only environment-level
/// problems (unwritable scratch directory, failed aggregation) abort the run
/// without one.
#[derive(Debug)]
pub struct BatchReport {
    /// Export files found under the data directory.
    pub discovered: usize,
    /// Files whose existing artifact was kept.
    pub reused: usize,
    /// Files the pipeline (re)computed.
    pub rebuilt: usize,
    /// Files that failed, in discovery order.
    pub failures: Vec<FileFailure>,
    /// The deduplicated, sorted corpus artifacts.
    pub aggregate: AggregateOutput,
    /// The daily import summary artifacts.
    pub summary: SummaryOutput,
}

impl BatchReport {
    /// `true` when every discovered file contributed to the corpus.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Run one full batch: normalize, aggregate, summarize.
///
/// A failing export file is recorded in the report and skipped; it fails
/// neither the batch nor its sibling files. The aggregate and summary are
/// always derived, over however many files succeeded.
pub fn run_batch(options: &BatchOptions) -> Result<BatchReport> {
    let cache = ArtifactCache::new(&options.scratch_dir, options.force);
    cache.ensure_scratch_dir()?;

    let inputs = find_export_files(&options.data_dir);
    if inputs.is_empty() {
        warn!(
            "No export files found under {}",
            options.data_dir.display()
        );
    } else {
        info!(
            "Processing {} export files from {}",
            inputs.len(),
            options.data_dir.display()
        );
    }

    let mut artifacts: Vec<PathBuf> = Vec::with_capacity(inputs.len());
    let mut reused = 0;
    let mut rebuilt = 0;
    let mut failures: Vec<FileFailure> = Vec::new();

    for input in &inputs {
        match cache.process_one_file(input) {
            Ok(outcome) => {
                match outcome.action {
                    CacheAction::Reused => reused += 1,
                    CacheAction::Rebuilt => rebuilt += 1,
                }
                artifacts.push(outcome.artifact);
            }
            Err(err) => {
                error!("Failed to process {}: {}", input.display(), err);
                failures.push(FileFailure {
                    path: input.clone(),
                    error: err,
                });
            }
        }
    }

    let aggregate = aggregate::aggregate(&artifacts, cache.scratch_dir())?;
    let summary = summary::summarize_daily(&aggregate.jsonl_path)?;

    info!(
        "Batch done: {} files ({} rebuilt, {} reused, {} failed), {} records, {} days",
        inputs.len(),
        rebuilt,
        reused,
        failures.len(),
        aggregate.record_count,
        summary.days
    );

    Ok(BatchReport {
        discovered: inputs.len(),
        reused,
        rebuilt,
        failures,
        aggregate,
        summary,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
