//! Whole-file artifact cache for the normalization pipeline.
//!
//! Each export file maps to exactly one artifact in the scratch directory.
//! An existing artifact is proof the file was fully processed before (writes
//! are atomic, so no partial artifact can exist) and the pipeline is skipped
//! for it entirely. The cache has no partial invalidation: `force` recomputes
//! everything.

use std::path::{Path, PathBuf};

use meter_core::error::Result;
use meter_data::pipeline;
use tracing::{debug, info};

// ── Public types ──────────────────────────────────────────────────────────────

/// What the cache decided to do for one export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// An artifact already existed and was kept as-is.
    Reused,
    /// The pipeline ran and (re)wrote the artifact.
    Rebuilt,
}

/// Outcome of processing one export file.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// The export file that was processed.
    pub input: PathBuf,
    /// The artifact now backing it in the scratch directory.
    pub artifact: PathBuf,
    /// Whether the artifact was reused or rebuilt.
    pub action: CacheAction,
}

// ── ArtifactCache ─────────────────────────────────────────────────────────────

/// File-granular cache over normalized artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    /// Directory holding per-file artifacts and aggregate outputs.
    scratch_dir: PathBuf,
    /// When `true`, existing artifacts are discarded and recomputed.
    force: bool,
}

impl ArtifactCache {
    pub fn new(scratch_dir: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            force,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Create the scratch directory if it does not exist yet.
    pub fn ensure_scratch_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.scratch_dir)?;
        Ok(())
    }

    /// The artifact path backing `input`: the input's file stem with a
    /// `.jsonl` extension, directly inside the scratch directory.
    pub fn artifact_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("export");
        self.scratch_dir.join(format!("{stem}.jsonl"))
    }

    /// Process one export file, reusing its artifact when allowed.
    ///
    /// On a rebuild the stale artifact is removed before the pipeline runs,
    /// so a failed rebuild leaves no artifact behind rather than an outdated
    /// one that a later cached run would silently trust.
    pub fn process_one_file(&self, input: &Path) -> Result<ProcessOutcome> {
        let artifact = self.artifact_path(input);

        if !self.force && artifact.exists() {
            debug!(
                "Skipping {}: artifact {} already exists",
                input.display(),
                artifact.display()
            );
            return Ok(ProcessOutcome {
                input: input.to_path_buf(),
                artifact,
                action: CacheAction::Reused,
            });
        }

        remove_stale(&artifact)?;

        let records = pipeline::normalize_file(input)?;
        let jsonl = pipeline::to_jsonl(&records)?;
        pipeline::write_atomic(&artifact, &jsonl)?;

        info!(
            "Processed {} into {}",
            file_name(input),
            file_name(&artifact)
        );
        Ok(ProcessOutcome {
            input: input.to_path_buf(),
            artifact,
            action: CacheAction::Rebuilt,
        })
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Remove a leftover artifact, treating "already gone" as success.
fn remove_stale(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn file_name(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use meter_core::schema::VENDOR_HEADER;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const EXPORT_NAME: &str = "scl_electric_usage_interval_data.csv";

    fn write_export(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let mut text = format!("Name,JANE EXAMPLE\n\n{VENDOR_HEADER}\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    const GOOD_ROW: &str = "Electric usage,2023-07-11,00:00,00:14,0.33,0.0";

    // ── artifact_path ─────────────────────────────────────────────────────────

    #[test]
    fn test_artifact_path_swaps_extension_and_directory() {
        let cache = ArtifactCache::new("/scratch", false);
        let artifact = cache.artifact_path(Path::new("/data/deep/nested/file.csv"));
        assert_eq!(artifact, PathBuf::from("/scratch/file.jsonl"));
    }

    // ── process_one_file ──────────────────────────────────────────────────────

    #[test]
    fn test_process_writes_artifact() {
        let data = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let input = write_export(data.path(), EXPORT_NAME, &[GOOD_ROW]);

        let cache = ArtifactCache::new(scratch.path(), false);
        let outcome = cache.process_one_file(&input).unwrap();

        assert_eq!(outcome.action, CacheAction::Rebuilt);
        let artifact = std::fs::read_to_string(&outcome.artifact).unwrap();
        assert_eq!(artifact.lines().count(), 1);
        assert!(artifact.contains("\"start_time\":1689033600"));
    }

    #[test]
    fn test_existing_artifact_is_reused_untouched() {
        let data = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let input = write_export(data.path(), EXPORT_NAME, &[GOOD_ROW]);

        let cache = ArtifactCache::new(scratch.path(), false);
        let artifact = cache.artifact_path(&input);
        std::fs::write(&artifact, "sentinel-line\n").unwrap();

        let outcome = cache.process_one_file(&input).unwrap();

        assert_eq!(outcome.action, CacheAction::Reused);
        // The artifact is trusted as-is; the pipeline must not have run.
        assert_eq!(
            std::fs::read_to_string(&artifact).unwrap(),
            "sentinel-line\n"
        );
    }

    #[test]
    fn test_force_recomputes_existing_artifact() {
        let data = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let input = write_export(data.path(), EXPORT_NAME, &[GOOD_ROW]);

        let cache = ArtifactCache::new(scratch.path(), true);
        let artifact = cache.artifact_path(&input);
        std::fs::write(&artifact, "sentinel-line\n").unwrap();

        let outcome = cache.process_one_file(&input).unwrap();

        assert_eq!(outcome.action, CacheAction::Rebuilt);
        let contents = std::fs::read_to_string(&artifact).unwrap();
        assert!(!contents.contains("sentinel-line"));
        assert!(contents.contains("\"import_kwh\":0.33"));
    }

    #[test]
    fn test_failed_rebuild_leaves_no_stale_artifact() {
        let data = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let input = data.path().join(EXPORT_NAME);
        std::fs::write(&input, "no header in here\n").unwrap();

        let cache = ArtifactCache::new(scratch.path(), true);
        let artifact = cache.artifact_path(&input);
        std::fs::write(&artifact, "stale-line\n").unwrap();

        assert!(cache.process_one_file(&input).is_err());
        assert!(
            !artifact.exists(),
            "stale artifact must not survive a failed rebuild"
        );
    }

    #[test]
    fn test_cached_run_skips_unreadable_input() {
        let scratch = TempDir::new().unwrap();
        let input = Path::new("/tmp/meterline-gone.csv");

        let cache = ArtifactCache::new(scratch.path(), false);
        let artifact = cache.artifact_path(input);
        std::fs::write(&artifact, "kept-line\n").unwrap();

        // With a valid artifact present the input file is never opened.
        let outcome = cache.process_one_file(input).unwrap();
        assert_eq!(outcome.action, CacheAction::Reused);
    }

    #[test]
    fn test_ensure_scratch_dir_creates_nested_path() {
        let tmp = TempDir::new().unwrap();
        let scratch = tmp.path().join("a").join("b");

        let cache = ArtifactCache::new(&scratch, false);
        cache.ensure_scratch_dir().unwrap();

        assert!(scratch.is_dir());
    }
}
