//! Pack-level voltage statistics for anomaly detection.
//!
//! Mean and population standard deviation across all cells, plus the
//! z-score derived from them.

/// Mean and population standard deviation of a sample.
///
/// Returns `(0.0, 0.0)` for an empty sample. A constant sample returns its
/// value and exactly `0.0`, since summing would drift the mean by an ulp and
/// leave a spurious non-zero spread.
pub fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    let Some(&first) = values.first() else {
        return (0.0, 0.0);
    };
    if values.iter().all(|&v| v == first) {
        return (first, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    (mean, variance.sqrt())
}

/// Signed z-score of `value`; zero when there is no spread.
#[inline]
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev > 0.0 {
        (value - mean) / std_dev
    } else {
        0.0
    }
}
