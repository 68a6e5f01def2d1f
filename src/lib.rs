//! rPPG Engine: camera-based heart rate estimation
//!
//! Turns a sequence of per-frame mean RGB samples of a face into a heart
//! rate, a confidence tier, a display waveform and a signal-quality score.
//!
//! ## Pipeline
//!
//! - **Ingestion**: drop failed captures, gate on length and green variation
//! - **POS**: Plane-Orthogonal-to-Skin projection, with the raw green channel
//!   carried as a fallback candidate
//! - **Bandpass**: 0.75-3.0 Hz RC cascade
//! - **Spectral**: Hann-windowed zero-padded FFT, parabolic peak, SNR
//! - **Fusion**: SNR-based candidate choice, validity and confidence
//!
//! ```ignore
//! let result = rppg_engine::process(&samples, Some(10.0))?;
//! println!("{} BPM ({})", result.heart_rate, result.confidence);
//! ```

pub mod config;
pub mod processing;
pub mod synthetic;
pub mod types;
pub mod worker;

pub use config::{ConfigError, PipelineConfig};

pub use types::{CandidateKind, Confidence, ProcessingResult, RawSample, SpectralEstimate};

pub use processing::{
    process, process_with_config, ProcessingError, PulseProcessor, PulseReport,
};

pub use synthetic::SyntheticCapture;
pub use worker::{analyze, process_batch, CaptureJob};
