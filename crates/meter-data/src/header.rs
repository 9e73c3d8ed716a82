//! Header location and validation for vendor exports.
//!
//! Vendor exports open with a free-form preamble (account holder, address,
//! disclaimers) of no fixed length. The real CSV document starts at the first
//! line containing the known column header; everything above it is discarded.

use meter_core::error::{PipelineError, Result};

// ── Public API ────────────────────────────────────────────────────────────────

/// Return the suffix of `text` starting at the first line that contains
/// `header`, preamble removed.
///
/// The match is substring containment, so a trailing `\r` or other vendor
/// noise around the header line does not defeat it. An export with no such
/// line is rejected outright rather than passed through.
pub fn strip_preamble<'a>(text: &'a str, header: &str) -> Result<&'a str> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.contains(header) {
            return Ok(&text[offset..]);
        }
        offset += line.len();
    }
    Err(PipelineError::HeaderNotFound {
        expected: header.to_string(),
    })
}

/// Validate that parsed header fields match `expected` exactly, in order.
///
/// Runs at two checkpoints: against the vendor header right after the
/// preamble is stripped, and against the renamed header before timestamp
/// conversion. Any extra, missing, reordered or misspelled column fails.
pub fn validate_columns(actual: &[String], expected: &str) -> Result<()> {
    let expected_fields: Vec<&str> = expected.split(',').collect();
    let matches = actual.len() == expected_fields.len()
        && actual.iter().zip(&expected_fields).all(|(a, e)| a == e);
    if matches {
        return Ok(());
    }
    Err(PipelineError::HeaderMismatch {
        expected: expected.to_string(),
        actual: actual.join(","),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
