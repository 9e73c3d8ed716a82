use std::sync::OnceLock;

use regex::Regex;

// ── Vendor export schema ─────────────────────────────────────────────────────

/// Column header exactly as the utility portal writes it. Everything above
/// this line in an export file is preamble and is discarded.
pub const VENDOR_HEADER: &str = "TYPE,DATE,START TIME,END TIME,IMPORT (KWh),EXPORT (KWh),NOTES";

/// Column header after renaming to canonical snake_case names. The `date`
/// column is still present at this point; it is dropped once both wall-clock
/// timestamps have been converted to epoch seconds.
pub const RENAMED_HEADER: &str = "type,date,start_time,end_time,import_kwh,export_kwh,notes";

/// Fixed vendor-name to canonical-name mapping applied to the header row.
pub const HEADER_RENAMES: &[(&str, &str)] = &[
    ("TYPE", "type"),
    ("DATE", "date"),
    ("START TIME", "start_time"),
    ("END TIME", "end_time"),
    ("IMPORT (KWh)", "import_kwh"),
    ("EXPORT (KWh)", "export_kwh"),
    ("NOTES", "notes"),
];

/// Column removed after timestamp conversion, its information having been
/// folded into `start_time` and `end_time`.
pub const DATE_COLUMN: &str = "date";

/// Field count of a complete data row.
pub const FIELDS_WITH_NOTES: usize = 7;

/// Field count of a data row whose empty trailing notes field was omitted
/// by the vendor.
pub const FIELDS_WITHOUT_NOTES: usize = 6;

/// Width of the trailing rolling-average window over `import_kwh`.
pub const ROLLING_WINDOW: usize = 4;

/// Filename pattern identifying a vendor interval export.
pub const EXPORT_FILE_PATTERN: &str = r"^scl_electric_usage_interval_data.*\.csv$";

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Returns true when `name` looks like a vendor interval export filename.
pub fn is_export_file_name(name: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(EXPORT_FILE_PATTERN).expect("regex is valid"));
    pattern.is_match(name)
}

/// Maps a vendor column name to its canonical name. Names without a mapping
/// pass through unchanged.
pub fn rename_column(name: &str) -> &str {
    HEADER_RENAMES
        .iter()
        .find(|(vendor, _)| *vendor == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// The vendor header split into its ordered column names.
pub fn vendor_columns() -> Vec<&'static str> {
    VENDOR_HEADER.split(',').collect()
}

/// The renamed header split into its ordered column names.
pub fn renamed_columns() -> Vec<&'static str> {
    RENAMED_HEADER.split(',').collect()
}
