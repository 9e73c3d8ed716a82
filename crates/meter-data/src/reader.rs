//! Vendor export discovery and loading for Meterline.
//!
//! Scans a data directory recursively for utility interval export files and
//! reads them into memory for the normalization pipeline.

use std::path::{Path, PathBuf};

use meter_core::error::{PipelineError, Result};
use meter_core::schema::is_export_file_name;
use tracing::warn;

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all vendor interval export files recursively under `data_dir`,
/// sorted by path.
///
/// A missing directory yields an empty list rather than an error, so a run
/// against a not-yet-synced export folder still produces (empty) artifacts.
pub fn find_export_files(data_dir: &Path) -> Vec<PathBuf> {
    if !data_dir.exists() {
        warn!("Data directory does not exist: {}", data_dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map(is_export_file_name)
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Read a vendor export into memory as text.
pub fn read_export(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
