//! Descriptive statistics over plain `f64` samples.
//!
//! Every function returns `None` for an empty sample instead of producing
//! `NaN`.

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Linear-interpolation percentile.
///
/// Sorts a copy of `values`, takes the fractional index
/// `p / 100 * (n - 1)` and interpolates between its floor and ceiling.
/// `p` is clamped to `[0, 100]`.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let index = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = (index.ceil() as usize).min(sorted.len() - 1);
    let weight = index.fract();

    Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

/// Population standard deviation around a precomputed `mean`
pub fn standard_deviation(values: &[f64], mean: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Most common value after bucketing to the nearest multiple of 10.
///
/// Ties go to the bucket seen first.
pub fn mode(values: &[f64]) -> Option<f64> {
    // (bucket, count) in first-seen order
    let mut buckets: Vec<(f64, usize)> = Vec::new();
    for value in values {
        // halves round up, e.g. 15 -> 20 and -15 -> -10
        let bucket = (value / 10.0 + 0.5).floor() * 10.0;
        match buckets.iter_mut().find(|(b, _)| *b == bucket) {
            Some((_, count)) => *count += 1,
            None => buckets.push((bucket, 1)),
        }
    }

    let mut best: Option<(f64, usize)> = None;
    for (bucket, count) in buckets {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((bucket, count));
        }
    }
    best.map(|(bucket, _)| bucket)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
