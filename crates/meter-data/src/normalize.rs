//! Row normalization stages for vendor interval exports.
//!
//! A stripped export is parsed into a [`RowTable`] and pushed through a fixed
//! sequence of stages: pad the optional notes field, rename header columns,
//! convert wall-clock date/time pairs to epoch seconds, drop the redundant
//! date column, and finally type the rows into [`IntervalRecord`]s. Each
//! stage takes the table by value and returns a new one, so a failed stage
//! never leaves a partially transformed table behind.

use meter_core::error::{PipelineError, Result};
use meter_core::models::IntervalRecord;
use meter_core::schema::{
    rename_column, DATE_COLUMN, FIELDS_WITHOUT_NOTES, FIELDS_WITH_NOTES, RENAMED_HEADER,
    VENDOR_HEADER,
};
use meter_core::time_utils::wall_clock_to_epoch;
use tracing::warn;

// ── RowTable ──────────────────────────────────────────────────────────────────

/// One parsed CSV document: a header row plus zero or more data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse CSV text into a [`RowTable`].
///
/// The reader is flexible about per-row field counts because the vendor
/// omits the empty trailing notes field on most rows; field counts are
/// enforced later by [`pad_notes`]. Blank lines are skipped.
pub fn parse_table(text: &str) -> Result<RowTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut header: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        match header {
            None => header = Some(fields),
            Some(_) => rows.push(fields),
        }
    }

    let header = header.ok_or_else(|| PipelineError::HeaderNotFound {
        expected: VENDOR_HEADER.to_string(),
    })?;
    Ok(RowTable { header, rows })
}

// ── Normalization stages ──────────────────────────────────────────────────────

/// Pad rows that omit the empty trailing notes field back to full width.
///
/// Any row that fits neither the complete nor the notes-omitted shape is a
/// malformed export and fails the whole file; `row` in the error is 1-based
/// over the data rows.
pub fn pad_notes(table: RowTable) -> Result<RowTable> {
    let RowTable { header, rows } = table;
    let mut padded = Vec::with_capacity(rows.len());
    for (idx, mut row) in rows.into_iter().enumerate() {
        match row.len() {
            FIELDS_WITHOUT_NOTES => row.push(String::new()),
            FIELDS_WITH_NOTES => {}
            other => {
                return Err(PipelineError::MalformedRow {
                    row: idx + 1,
                    found: other,
                    content: row.join(","),
                });
            }
        }
        padded.push(row);
    }
    Ok(RowTable {
        header,
        rows: padded,
    })
}

/// Rename header columns from vendor names to canonical snake_case names.
/// Data rows are untouched.
pub fn rename_header(mut table: RowTable) -> RowTable {
    table.header = table
        .header
        .iter()
        .map(|name| rename_column(name).to_string())
        .collect();
    table
}

/// Replace the wall-clock `start_time` and `end_time` fields with epoch
/// seconds derived from the `date` column.
///
/// Both timestamps read the same date field, so an interval that crosses
/// midnight still gets its start on the correct day. Rows are expected in
/// chronological order; a regression is logged but not rejected.
pub fn convert_timestamps(table: RowTable) -> Result<RowTable> {
    let date_idx = column_index(&table.header, DATE_COLUMN)?;
    let start_idx = column_index(&table.header, "start_time")?;
    let end_idx = column_index(&table.header, "end_time")?;

    let RowTable { header, rows } = table;
    let mut converted = Vec::with_capacity(rows.len());
    let mut last_start: Option<i64> = None;
    for mut row in rows {
        let start = wall_clock_to_epoch(&row[date_idx], &row[start_idx])?;
        let end = wall_clock_to_epoch(&row[date_idx], &row[end_idx])?;

        if let Some(prev) = last_start {
            if start < prev {
                warn!(
                    "Rows out of chronological order: start_time {} follows {}",
                    start, prev
                );
            }
        }
        last_start = Some(start);

        row[start_idx] = start.to_string();
        row[end_idx] = end.to_string();
        converted.push(row);
    }
    Ok(RowTable {
        header,
        rows: converted,
    })
}

/// Remove the `date` column from the header and every row, its information
/// now fully carried by the epoch timestamps.
pub fn drop_date_column(table: RowTable) -> Result<RowTable> {
    let date_idx = column_index(&table.header, DATE_COLUMN)?;
    let RowTable { mut header, rows } = table;
    header.remove(date_idx);
    let rows = rows
        .into_iter()
        .map(|mut row| {
            row.remove(date_idx);
            row
        })
        .collect();
    Ok(RowTable { header, rows })
}

/// Type the normalized rows into [`IntervalRecord`]s.
///
/// The kWh fields are coerced leniently: an empty or non-numeric value
/// becomes `None` with a warning instead of failing the file. The rolling
/// average is left unset here and attached by the pipeline.
pub fn into_records(table: RowTable) -> Result<Vec<IntervalRecord>> {
    let kind_idx = column_index(&table.header, "type")?;
    let start_idx = column_index(&table.header, "start_time")?;
    let end_idx = column_index(&table.header, "end_time")?;
    let import_idx = column_index(&table.header, "import_kwh")?;
    let export_idx = column_index(&table.header, "export_kwh")?;
    let notes_idx = column_index(&table.header, "notes")?;

    let mut records = Vec::with_capacity(table.rows.len());
    for mut row in table.rows {
        records.push(IntervalRecord {
            kind: std::mem::take(&mut row[kind_idx]),
            start_time: parse_epoch(&row[start_idx])?,
            end_time: parse_epoch(&row[end_idx])?,
            import_kwh: coerce_kwh(&row[import_idx], "import_kwh"),
            export_kwh: coerce_kwh(&row[export_idx], "export_kwh"),
            notes: std::mem::take(&mut row[notes_idx]),
            rolling_average_import_kwh: None,
        });
    }
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Find the position of `name` in the header.
fn column_index(header: &[String], name: &str) -> Result<usize> {
    header
        .iter()
        .position(|column| column == name)
        .ok_or_else(|| PipelineError::HeaderMismatch {
            expected: RENAMED_HEADER.to_string(),
            actual: header.join(","),
        })
}

/// Parse an epoch-seconds field produced by [`convert_timestamps`].
fn parse_epoch(value: &str) -> Result<i64> {
    value.parse::<i64>().map_err(|err| PipelineError::Timestamp {
        value: value.to_string(),
        reason: err.to_string(),
    })
}

/// Coerce a kWh field to a number, treating anything unparseable as missing.
///
/// Non-finite values are also rejected; a NaN would otherwise poison every
/// rolling window and daily sum it touches.
fn coerce_kwh(raw: &str, column: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        Ok(value) => {
            warn!("Non-finite {} value {}; treating as missing", column, value);
            None
        }
        Err(_) => {
            warn!(
                "Could not coerce {} value {:?} to a number; treating as missing",
                column, raw
            );
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
