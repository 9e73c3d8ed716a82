use serde::{Deserialize, Serialize};

/// One normalized metering interval, the unit record of every artifact.
///
/// Field order matters: serialization emits fields in declaration order, and
/// artifact files are compared line-for-line across runs, so reordering
/// fields here would invalidate every existing artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRecord {
    /// Reading category as labelled by the vendor, e.g. "Electric usage".
    #[serde(rename = "type")]
    pub kind: String,

    /// Interval start as seconds since the Unix epoch (UTC).
    pub start_time: i64,

    /// Interval end as seconds since the Unix epoch (UTC).
    pub end_time: i64,

    /// Energy drawn from the grid during the interval, in kWh. `None` when
    /// the vendor field was empty or not numeric.
    pub import_kwh: Option<f64>,

    /// Energy exported to the grid during the interval, in kWh. `None` when
    /// the vendor field was empty or not numeric.
    pub export_kwh: Option<f64>,

    /// Free-text vendor notes, usually empty.
    pub notes: String,

    /// Trailing mean of `import_kwh` over the last four intervals, `None`
    /// until the window is full or when any value in the window is missing.
    #[serde(default)]
    pub rolling_average_import_kwh: Option<f64>,
}

/// Total imported energy for one UTC day of the summarized corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// Midnight UTC of the day, as seconds since the Unix epoch.
    pub start_time: i64,

    /// Sum of `import_kwh` over every interval starting that day, in kWh.
    /// Days inside the observed range with no intervals report `0.0`.
    pub import_kwh: f64,
}
