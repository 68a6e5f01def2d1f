//! Ingestion and validity gate
//!
//! Drops failed captures, enforces the minimum sample count and detects
//! captures whose green channel never moved (covered camera, no face).

use tracing::debug;

use super::ProcessingError;
use crate::config::IngestConfig;
use crate::types::RawSample;

/// Valid samples split into per-channel traces, in capture order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    pub r: Vec<f64>,
    pub g: Vec<f64>,
    pub b: Vec<f64>,
}

impl SampleSeries {
    pub fn len(&self) -> usize {
        self.g.len()
    }

    pub fn is_empty(&self) -> bool {
        self.g.is_empty()
    }

    /// max(g) - min(g)
    pub fn green_range(&self) -> f64 {
        if self.g.is_empty() {
            return 0.0;
        }
        let (lo, hi) = self
            .g
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        hi - lo
    }
}

/// Outcome of the validity gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// Enough samples with real green-channel movement
    Ready(SampleSeries),
    /// Well-formed but uninformative; carries the valid sample count
    NoVariation(usize),
}

/// Resolve the caller's sampling rate.
///
/// A missing rate falls back to the configured default; an explicit rate
/// must be finite and positive.
pub fn resolve_fps(fps: Option<f64>, config: &IngestConfig) -> Result<f64, ProcessingError> {
    match fps {
        None => Ok(config.default_fps),
        Some(f) if f.is_finite() && f > 0.0 => Ok(f),
        Some(f) => Err(ProcessingError::InvalidSamplingRate(f)),
    }
}

/// Filter samples and apply the minimum-length and green-range gates.
pub fn gate(signals: &[RawSample], config: &IngestConfig) -> Result<GateOutcome, ProcessingError> {
    let valid: Vec<&RawSample> = signals.iter().filter(|s| s.is_valid()).collect();
    let dropped = signals.len() - valid.len();

    if valid.len() < config.min_samples {
        return Err(ProcessingError::InsufficientSamples {
            needed: config.min_samples,
            available: valid.len(),
        });
    }

    let series = SampleSeries {
        r: valid.iter().map(|s| s.r).collect(),
        g: valid.iter().map(|s| s.g).collect(),
        b: valid.iter().map(|s| s.b).collect(),
    };

    let g_range = series.green_range();
    debug!(
        total = signals.len(),
        valid = series.len(),
        dropped,
        g_range,
        "Ingested capture"
    );

    if g_range < config.min_green_range {
        debug!(g_range, threshold = config.min_green_range, "No green-channel variation");
        return Ok(GateOutcome::NoVariation(series.len()));
    }

    Ok(GateOutcome::Ready(series))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(n: usize, g: f64) -> Vec<RawSample> {
        (0..n).map(|i| RawSample::new(100.0, g, 80.0, i as i64 * 100)).collect()
    }

    #[test]
    fn test_too_few_samples_is_error() {
        let err = gate(&flat(29, 120.0), &IngestConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::InsufficientSamples { needed: 30, available: 29 }
        ));
    }

    #[test]
    fn test_invalid_samples_do_not_count() {
        let mut samples = flat(30, 120.0);
        samples[3].r = -1.0;
        let err = gate(&samples, &IngestConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::InsufficientSamples { available: 29, .. }
        ));
    }

    #[test]
    fn test_flat_green_short_circuits() {
        let outcome = gate(&flat(50, 120.0), &IngestConfig::default()).unwrap();
        assert_eq!(outcome, GateOutcome::NoVariation(50));
    }

    #[test]
    fn test_green_range_below_threshold() {
        let samples: Vec<RawSample> = (0..40)
            .map(|i| RawSample::new(100.0, 120.0 + 0.1 * (i % 3) as f64, 80.0, 0))
            .collect();
        let outcome = gate(&samples, &IngestConfig::default()).unwrap();
        assert_eq!(outcome, GateOutcome::NoVariation(40));
    }

    #[test]
    fn test_ready_series_keeps_order() {
        let samples: Vec<RawSample> = (0..30)
            .map(|i| RawSample::new(1.0, i as f64, 2.0, 0))
            .collect();
        match gate(&samples, &IngestConfig::default()).unwrap() {
            GateOutcome::Ready(series) => {
                assert_eq!(series.len(), 30);
                assert!((series.green_range() - 29.0).abs() < 1e-12);
                assert!((series.g[5] - 5.0).abs() < 1e-12);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_fps() {
        let config = IngestConfig::default();
        assert!((resolve_fps(None, &config).unwrap() - 10.0).abs() < f64::EPSILON);
        assert!((resolve_fps(Some(30.0), &config).unwrap() - 30.0).abs() < f64::EPSILON);
        assert!(resolve_fps(Some(0.0), &config).is_err());
        assert!(resolve_fps(Some(f64::NAN), &config).is_err());
    }
}
