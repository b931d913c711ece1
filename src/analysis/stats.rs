//! Descriptive statistics over `f64` slices.
//!
//! All functions return `None` for an empty slice. The standard deviation
//! is the sample (n - 1) definition and is used for both group statistics
//! and cross-group variation checks.

/// Sum of all values.
pub fn sum(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum())
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    sum(values).map(|total| total / values.len() as f64)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Median; the mean of the two middle values for even-sized input.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation. A single value has a deviation of zero.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }

    let squared: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((squared / (values.len() - 1) as f64).sqrt())
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats with `places` decimals, rounding halves away from zero.
pub fn to_fixed(value: f64, places: usize) -> String {
    let scale = 10f64.powi(places as i32);
    format!("{:.*}", places, (value * scale).round() / scale)
}
