use crate::schema::ROLLING_WINDOW;

/// Trailing mean over a fixed window, aligned to the end of the window.
///
/// Position `i` holds the mean of `values[i + 1 - window ..= i]`. The first
/// `window - 1` positions are `None` because the window is not yet full, and
/// any window containing a missing value yields `None` rather than a mean
/// over fewer points.
pub fn trailing_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                return None;
            }
            let span = &values[i + 1 - window..=i];
            let mut sum = 0.0;
            for value in span {
                sum += (*value)?;
            }
            Some(sum / window as f64)
        })
        .collect()
}

/// Trailing mean of `import_kwh` values over the standard four-interval
/// window.
pub fn import_rolling_average(values: &[Option<f64>]) -> Vec<Option<f64>> {
    trailing_mean(values, ROLLING_WINDOW)
}
