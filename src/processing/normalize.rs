//! Detrend and normalize
//!
//! The single detrend-then-normalize routine shared by the whole-signal
//! stage, the per-window POS stage and both candidate signals.

use statrs::statistics::Statistics;

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().mean()
}

/// Population standard deviation; 0 for an empty slice.
pub fn std_dev(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().population_std_dev()
}

/// Population variance; 0 for an empty slice.
pub fn variance(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().population_variance()
}

/// Population standard deviation with a zero result replaced by 1, for use
/// as a divisor.
pub fn safe_std(signal: &[f64]) -> f64 {
    let sd = std_dev(signal);
    if sd > 0.0 && sd.is_finite() {
        sd
    } else {
        1.0
    }
}

/// Subtract the ordinary least-squares line fitted over the sample index.
pub fn detrend(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(signal);

    let (sxy, sxx) = signal
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
            let dx = i as f64 - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });

    // A single point has no slope.
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = y_mean - slope * x_mean;

    signal
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (slope * i as f64 + intercept))
        .collect()
}

/// Zero mean, unit population variance.
pub fn normalize(signal: &[f64]) -> Vec<f64> {
    let m = mean(signal);
    let sd = safe_std(signal);
    signal.iter().map(|&x| (x - m) / sd).collect()
}

/// Detrend, then normalize.
pub fn detrend_normalize(signal: &[f64]) -> Vec<f64> {
    normalize(&detrend(signal))
}
