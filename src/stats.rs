//! Statistics primitives shared by both scoring engines.
//!
//! Every function here is total over its input: an empty slice resolves to
//! 0.0, never NaN or infinity, so downstream scoring can divide and weight
//! without guarding.

/// Arithmetic mean; 0.0 for an empty slice.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median over an ascending sort; even-length slices average the two
/// central elements. 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation around the mean; 0.0 for an empty slice.
pub fn std_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = average(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Percentage change from `previous` to `recent`, rounded to the nearest
/// integer. Zero-division policy: a previous period at or below zero maps
/// to the +100 sentinel when the recent period is positive, and to 0 when
/// both are.
pub fn compute_growth(recent: f64, previous: f64) -> i64 {
    if previous <= 0.0 {
        return if recent > 0.0 { 100 } else { 0 };
    }
    ((recent - previous) / previous * 100.0).round() as i64
}

/// Round to one decimal place, matching the report's wire precision.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
