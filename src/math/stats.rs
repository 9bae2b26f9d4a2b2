//! Order statistics over replicate distributions.

/// Sort in place; NaNs (which the engine never produces) compare equal.
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Linearly interpolated empirical quantile of already sorted values.
///
/// Matches the common "type 7" definition: position `h = (len - 1) · q`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// `(lower, upper)` equal-tailed bounds for a confidence level.
pub fn equal_tail_bounds(sorted: &[f64], confidence_level: f64) -> Option<(f64, f64)> {
    let alpha = (1.0 - confidence_level) / 2.0;
    Some((
        quantile_sorted(sorted, alpha)?,
        quantile_sorted(sorted, 1.0 - alpha)?,
    ))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (`n - 1` denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}
