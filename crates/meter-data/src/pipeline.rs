//! Per-file normalization pipeline.
//!
//! Composes the header and row stages into the full text-to-records
//! transformation, attaches the trailing rolling average, and handles JSONL
//! serialization and atomic artifact writes. A file either normalizes
//! completely or fails with the first error; there are no partial artifacts.

use std::path::Path;

use meter_core::error::Result;
use meter_core::models::IntervalRecord;
use meter_core::rolling::import_rolling_average;
use meter_core::schema::{RENAMED_HEADER, VENDOR_HEADER};
use tracing::debug;

use crate::{header, normalize, reader};

// ── Public API ────────────────────────────────────────────────────────────────

/// Run the full normalization pipeline over raw export text.
pub fn normalize_text(text: &str) -> Result<Vec<IntervalRecord>> {
    // 1. Cut the preamble; the document starts at the vendor header line.
    let document = header::strip_preamble(text, VENDOR_HEADER)?;

    // 2. Parse, then validate the vendor header field-for-field.
    let table = normalize::parse_table(document)?;
    header::validate_columns(&table.header, VENDOR_HEADER)?;

    // 3. Bring every row to full width, then rename to canonical columns and
    //    re-validate before anything downstream relies on the names.
    let table = normalize::pad_notes(table)?;
    let table = normalize::rename_header(table);
    header::validate_columns(&table.header, RENAMED_HEADER)?;

    // 4. Convert wall-clock fields to epoch seconds, drop the date column.
    let table = normalize::convert_timestamps(table)?;
    let table = normalize::drop_date_column(table)?;

    // 5. Type the rows and attach the trailing rolling average.
    let mut records = normalize::into_records(table)?;
    attach_rolling_average(&mut records);
    Ok(records)
}

/// Normalize one export file from disk.
pub fn normalize_file(path: &Path) -> Result<Vec<IntervalRecord>> {
    let text = reader::read_export(path)?;
    let records = normalize_text(&text)?;
    debug!(
        "Normalized {} records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Serialize records as JSON Lines, one compact object per line.
pub fn to_jsonl(records: &[IntervalRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Write `contents` to `path` atomically via a temp file and rename, creating
/// parent directories if needed. Readers of `path` never observe a
/// half-written artifact.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => path.with_extension(format!("{ext}.tmp")),
        None => path.with_extension("tmp"),
    };
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Fill `rolling_average_import_kwh` on every record in place.
fn attach_rolling_average(records: &mut [IntervalRecord]) {
    let imports: Vec<Option<f64>> = records.iter().map(|r| r.import_kwh).collect();
    for (record, average) in records.iter_mut().zip(import_rolling_average(&imports)) {
        record.rolling_average_import_kwh = average;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use meter_core::error::PipelineError;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const PREAMBLE: &str = "Name,JANE EXAMPLE\nAddress,123 MAIN ST SEATTLE WA 98100\n\n";

    /// Build export text with the standard preamble, vendor header and rows.
    fn export_text(rows: &[&str]) -> String {
        let mut text = String::from(PREAMBLE);
        text.push_str(VENDOR_HEADER);
        text.push('\n');
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    /// Five quarter-hour intervals with import 1.0 through 5.0 kWh.
    fn five_interval_rows() -> Vec<String> {
        (0..5)
            .map(|i| {
                format!(
                    "Electric usage,2023-07-11,{:02}:{:02},{:02}:{:02},{}.0,0.0",
                    i / 4,
                    (i % 4) * 15,
                    i / 4,
                    (i % 4) * 15 + 14,
                    i + 1
                )
            })
            .collect()
    }

    // ── normalize_text ────────────────────────────────────────────────────────

    #[test]
    fn test_normalize_text_end_to_end() {
        let rows = five_interval_rows();
        let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let records = normalize_text(&export_text(&row_refs)).unwrap();

        assert_eq!(records.len(), 5);
        let first = &records[0];
        assert_eq!(first.kind, "Electric usage");
        assert_eq!(first.start_time, 1_689_033_600);
        assert_eq!(first.end_time, 1_689_033_600 + 14 * 60);
        assert_eq!(first.import_kwh, Some(1.0));
        assert_eq!(first.export_kwh, Some(0.0));
        assert_eq!(first.notes, "");
    }

    #[test]
    fn test_normalize_text_rolling_average_fills_after_window() {
        let rows = five_interval_rows();
        let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let records = normalize_text(&export_text(&row_refs)).unwrap();

        let averages: Vec<Option<f64>> = records
            .iter()
            .map(|r| r.rolling_average_import_kwh)
            .collect();
        assert_eq!(averages, vec![None, None, None, Some(2.5), Some(3.5)]);
    }

    #[test]
    fn test_normalize_text_pads_short_rows() {
        let records = normalize_text(&export_text(&[
            "Electric usage,2023-07-11,00:00,00:14,0.33,0.0",
        ]))
        .unwrap();
        assert_eq!(records[0].notes, "");
    }

    #[test]
    fn test_normalize_text_missing_header_is_error() {
        let err = normalize_text("Name,JANE EXAMPLE\nno,such,header\n").unwrap_err();
        assert!(matches!(err, PipelineError::HeaderNotFound { .. }));
    }

    #[test]
    fn test_normalize_text_extra_header_column_is_mismatch() {
        // Line still contains the vendor header so the preamble cut finds it,
        // but the parsed field list has one column too many.
        let text = format!("{VENDOR_HEADER},METER\nrow\n");
        let err = normalize_text(&text).unwrap_err();
        assert!(matches!(err, PipelineError::HeaderMismatch { .. }));
    }

    #[test]
    fn test_normalize_text_malformed_row_fails_file() {
        let err = normalize_text(&export_text(&[
            "Electric usage,2023-07-11,00:00,00:14,0.33,0.0",
            "Electric usage,2023-07-11",
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedRow { row: 2, found: 2, .. }
        ));
    }

    #[test]
    fn test_normalize_text_bad_timestamp_fails_file() {
        let err = normalize_text(&export_text(&[
            "Electric usage,2023-07-11,25:99,26:00,0.33,0.0",
        ]))
        .unwrap_err();
        assert!(matches!(err, PipelineError::Timestamp { .. }));
    }

    #[test]
    fn test_normalize_text_header_only_yields_no_records() {
        let records = normalize_text(&export_text(&[])).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_normalize_text_non_numeric_import_survives() {
        let records = normalize_text(&export_text(&[
            "Electric usage,2023-07-11,00:00,00:14,n/a,0.0",
        ]))
        .unwrap();
        assert_eq!(records[0].import_kwh, None);
    }

    // ── normalize_file ────────────────────────────────────────────────────────

    #[test]
    fn test_normalize_file_reads_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scl_electric_usage_interval_data.csv");
        std::fs::write(
            &path,
            export_text(&["Electric usage,2023-07-11,00:00,00:14,0.33,0.0"]),
        )
        .unwrap();

        let records = normalize_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start_time, 1_689_033_600);
    }

    #[test]
    fn test_normalize_file_missing_file_is_file_read_error() {
        let err = normalize_file(Path::new("/tmp/meterline-no-such-export.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::FileRead { .. }));
    }

    // ── to_jsonl ──────────────────────────────────────────────────────────────

    #[test]
    fn test_to_jsonl_one_line_per_record() {
        let records = normalize_text(&export_text(&[
            "Electric usage,2023-07-11,00:00,00:14,0.33,0.0",
            "Electric usage,2023-07-11,00:15,00:29,0.5,0.0",
        ]))
        .unwrap();
        let jsonl = to_jsonl(&records).unwrap();
        assert_eq!(jsonl.lines().count(), 2);
        assert!(jsonl.ends_with('\n'));
    }

    #[test]
    fn test_to_jsonl_golden_line() {
        let records = normalize_text(&export_text(&[
            "Electric usage,2023-07-11,00:00,00:14,0.33,0.0",
        ]))
        .unwrap();
        let jsonl = to_jsonl(&records).unwrap();
        assert_eq!(
            jsonl,
            "{\"type\":\"Electric usage\",\"start_time\":1689033600,\
             \"end_time\":1689034440,\"import_kwh\":0.33,\"export_kwh\":0.0,\
             \"notes\":\"\",\"rolling_average_import_kwh\":null}\n"
        );
    }

    #[test]
    fn test_to_jsonl_empty_records_is_empty_string() {
        assert_eq!(to_jsonl(&[]).unwrap(), "");
    }

    // ── write_atomic ──────────────────────────────────────────────────────────

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("out.jsonl");
        write_atomic(&path, "line\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line\n");
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        write_atomic(&path, "old\n").unwrap();
        write_atomic(&path, "new\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        write_atomic(&path, "line\n").unwrap();

        let entries: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["out.jsonl"]);
    }
}
