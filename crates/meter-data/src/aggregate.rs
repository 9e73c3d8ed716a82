//! Cross-file aggregation of normalized artifacts.
//!
//! Vendor exports overlap freely (a month export and a year export both
//! carry July), so the corpus is built as a set union over serialized lines
//! rather than a concatenation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use meter_core::error::{PipelineError, Result};
use meter_core::models::IntervalRecord;
use tracing::info;

use crate::pipeline::write_atomic;

/// Aggregate artifact written as JSON Lines.
pub const AGGREGATE_JSONL: &str = "all.jsonl";

/// Aggregate artifact written as one pretty-printed JSON array.
pub const AGGREGATE_JSON: &str = "all.json";

/// Paths and record count of a finished aggregation.
#[derive(Debug, Clone)]
pub struct AggregateOutput {
    pub jsonl_path: PathBuf,
    pub json_path: PathBuf,
    pub record_count: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Merge per-file artifacts into the deduplicated, sorted corpus.
///
/// Deduplication is exact equality over serialized lines and ordering is
/// lexicographic, so the corpus is byte-identical for a given record set no
/// matter how the records were split across input files or which order the
/// files were processed in. The `BTreeSet` gives both properties at once.
pub fn aggregate(artifact_paths: &[PathBuf], out_dir: &Path) -> Result<AggregateOutput> {
    let mut lines: BTreeSet<String> = BTreeSet::new();
    for path in artifact_paths {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::FileRead {
            path: path.clone(),
            source,
        })?;
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            lines.insert(line.to_string());
        }
    }

    let mut jsonl = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in &lines {
        jsonl.push_str(line);
        jsonl.push('\n');
    }
    let jsonl_path = out_dir.join(AGGREGATE_JSONL);
    write_atomic(&jsonl_path, &jsonl)?;

    // Re-parse through the typed record so the pretty rendering keeps schema
    // field order instead of the alphabetical order of a raw JSON map.
    let records = parse_lines(&lines)?;
    let json_path = out_dir.join(AGGREGATE_JSON);
    let mut pretty = serde_json::to_string_pretty(&records)?;
    pretty.push('\n');
    write_atomic(&json_path, &pretty)?;

    info!(
        "Aggregated {} unique records from {} artifacts",
        lines.len(),
        artifact_paths.len()
    );

    Ok(AggregateOutput {
        jsonl_path,
        json_path,
        record_count: lines.len(),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_lines(lines: &BTreeSet<String>) -> Result<Vec<IntervalRecord>> {
    lines
        .iter()
        .map(|line| serde_json::from_str(line).map_err(PipelineError::from))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
