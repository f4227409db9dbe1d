//! Small statistical helpers shared by the calculators

use statrs::statistics::Statistics;

/// Copy and sort ascending using the IEEE total order
pub(crate) fn sorted_ascending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Empirical lower-tail index `floor(tail_fraction * len)`, clamped to `[0, len - 1]`
///
/// `len` must be non-zero. Rounding in `tail_fraction * len` can land on
/// `len` itself for fractions just below one, hence the upper clamp.
pub(crate) fn tail_index(tail_fraction: f64, len: usize) -> usize {
    debug_assert!(len > 0);
    let raw = (tail_fraction * len as f64).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(len - 1)
    }
}

/// Arithmetic mean (running update, so a constant sample returns that constant exactly)
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Population variance, dividing by n
pub(crate) fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mu = mean(values);
    values.iter().map(|x| (x - mu) * (x - mu)).sum::<f64>() / values.len() as f64
}
