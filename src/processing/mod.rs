//! Pulse pipeline - colour traces to a confidence-scored heart rate
//!
//! Stages run strictly in order:
//!
//! 1. `ingest`    - drop failed captures, minimum-length and green-range gates
//! 2. `normalize` - per-channel detrend + normalize
//! 3. `pos`       - POS projection (plus the plain green candidate)
//! 4. `filter`    - heart-rate bandpass on both candidates
//! 5. `spectral`  - windowed, zero-padded FFT peak + SNR per candidate
//! 6. `fusion`    - candidate selection, validity, confidence, waveform
//!
//! Only stage 1 can fail. Every later stage reports a poor signal through
//! the normal `ProcessingResult`.

pub mod filter;
pub mod fusion;
pub mod ingest;
pub mod normalize;
pub mod pos;
pub mod spectral;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::types::{CandidateKind, ProcessingResult, RawSample, SpectralEstimate};

use filter::BandpassFilter;
use fusion::ScoredCandidate;
use ingest::GateOutcome;
use spectral::SpectralAnalyzer;

/// Errors in pulse processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Not enough samples: need {needed} valid samples, have {available}")]
    InsufficientSamples { needed: usize, available: usize },

    #[error("Invalid sampling rate: {0}")]
    InvalidSamplingRate(f64),

    #[error("Pulse worker failed: {0}")]
    WorkerFailed(String),
}

/// Per-candidate diagnostics alongside the final result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseReport {
    pub result: ProcessingResult,
    /// Effective sampling rate (Hz)
    pub fps: f64,
    /// None when the capture was short-circuited as uninformative
    pub pos: Option<SpectralEstimate>,
    pub green: Option<SpectralEstimate>,
    pub selected: Option<CandidateKind>,
}

/// Stateless pipeline runner bound to one configuration.
///
/// Holds no per-call state, so a single instance can be shared across
/// threads and called concurrently.
#[derive(Debug, Clone, Default)]
pub struct PulseProcessor {
    config: PipelineConfig,
}

impl PulseProcessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Estimate heart rate from a capture. `fps` defaults to the configured
    /// rate when `None`.
    pub fn process(
        &self,
        signals: &[RawSample],
        fps: Option<f64>,
    ) -> Result<ProcessingResult, ProcessingError> {
        self.process_detailed(signals, fps).map(|report| report.result)
    }

    /// Like [`process`](Self::process), also returning both candidates'
    /// spectral estimates and which one was selected.
    pub fn process_detailed(
        &self,
        signals: &[RawSample],
        fps: Option<f64>,
    ) -> Result<PulseReport, ProcessingError> {
        let cfg = &self.config;
        let fps = ingest::resolve_fps(fps, &cfg.ingest)?;

        let series = match ingest::gate(signals, &cfg.ingest)? {
            GateOutcome::Ready(series) => series,
            GateOutcome::NoVariation(n) => {
                return Ok(PulseReport {
                    result: ProcessingResult::no_variation(n),
                    fps,
                    pos: None,
                    green: None,
                    selected: None,
                });
            }
        };
        let n = series.len();

        let window = cfg.pos.window_len(fps);
        let candidates = pos::extract_candidates(&series, window);

        let bandpass = BandpassFilter::new(&cfg.band, fps);
        let analyzer = SpectralAnalyzer::new(n, fps, &cfg.band, &cfg.spectral);
        debug!(
            n,
            fps,
            window,
            fft_size = analyzer.fft_size(),
            "Running pulse pipeline"
        );

        let score = |kind: CandidateKind, signal: &[f64]| {
            let filtered = bandpass.apply(signal);
            let estimate = analyzer.estimate(&filtered);
            ScoredCandidate {
                kind,
                filtered,
                estimate,
            }
        };
        let pos = score(CandidateKind::Pos, &candidates.pos);
        let green = score(CandidateKind::Green, &candidates.green);

        let (selected, result) = fusion::fuse(&pos, &green, n, &cfg.fusion);

        Ok(PulseReport {
            result,
            fps,
            pos: Some(pos.estimate),
            green: Some(green.estimate),
            selected: Some(selected),
        })
    }
}

/// Run the pipeline with the built-in default configuration.
pub fn process(signals: &[RawSample], fps: Option<f64>) -> Result<ProcessingResult, ProcessingError> {
    PulseProcessor::default().process(signals, fps)
}

/// Run the pipeline with an explicit configuration.
pub fn process_with_config(
    signals: &[RawSample],
    fps: Option<f64>,
    config: &PipelineConfig,
) -> Result<ProcessingResult, ProcessingError> {
    PulseProcessor::new(config.clone()).process(signals, fps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Confidence;
    use std::f64::consts::PI;

    fn pulse_capture(n: usize, fps: f64, bpm: f64) -> Vec<RawSample> {
        let f = bpm / 60.0;
        (0..n)
            .map(|i| {
                let t = i as f64 / fps;
                let pulse = (2.0 * PI * f * t).sin();
                RawSample::new(
                    150.0 + 0.6 * pulse,
                    110.0 + 2.0 * pulse,
                    90.0 + 0.4 * pulse,
                    (t * 1000.0) as i64,
                )
            })
            .collect()
    }

    #[test]
    fn test_clean_pulse_is_recovered() {
        let report = PulseProcessor::default()
            .process_detailed(&pulse_capture(300, 10.0, 84.0), Some(10.0))
            .unwrap();
        let result = &report.result;
        assert!(result.valid_reading, "{result:?}");
        assert!((i64::from(result.heart_rate) - 84).abs() <= 3);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.waveform.len(), 100);
        assert!(report.selected.is_some());
    }

    #[test]
    fn test_default_fps_applies() {
        let report = PulseProcessor::default()
            .process_detailed(&pulse_capture(200, 10.0, 72.0), None)
            .unwrap();
        assert!((report.fps - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_fps_rejected() {
        let err = process(&pulse_capture(100, 10.0, 72.0), Some(-5.0)).unwrap_err();
        assert_eq!(err, ProcessingError::InvalidSamplingRate(-5.0));
    }

    #[test]
    fn test_no_variation_report_has_no_candidates() {
        let flat: Vec<RawSample> = (0..60).map(|_| RawSample::new(100.0, 100.0, 100.0, 0)).collect();
        let report = PulseProcessor::default().process_detailed(&flat, None).unwrap();
        assert!(report.pos.is_none());
        assert!(report.selected.is_none());
        assert!(!report.result.valid_reading);
    }

    #[test]
    fn test_error_message() {
        let err = ProcessingError::InsufficientSamples {
            needed: 30,
            available: 12,
        };
        assert_eq!(
            err.to_string(),
            "Not enough samples: need 30 valid samples, have 12"
        );
    }
}
