//! Shared data structures for the rPPG pulse pipeline
//!
//! - Input: `RawSample` (one captured frame's mean colour)
//! - Intermediate: `CandidateKind`, `SpectralEstimate`
//! - Output: `ProcessingResult` with its `Confidence` tier
//!
//! Field names serialize in camelCase to match the result consumer's wire
//! shape (`heartRate`, `signalQuality`, ...).

use serde::{Deserialize, Serialize};

// ============================================================================
// Input
// ============================================================================

/// Mean red/green/blue intensity (0-255) of one frame's region of interest.
///
/// A negative channel marks a failed capture; such samples are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    /// Capture time in milliseconds. Informational only; array order is
    /// temporal order.
    #[serde(default)]
    pub timestamp: i64,
}

impl RawSample {
    pub fn new(r: f64, g: f64, b: f64, timestamp: i64) -> Self {
        Self { r, g, b, timestamp }
    }

    /// True when every channel is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| c.is_finite() && *c >= 0.0)
    }
}

// ============================================================================
// Intermediate
// ============================================================================

/// Which pulse-carrying signal a spectral estimate was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    /// Plane-Orthogonal-to-Skin projection of all three channels
    Pos,
    /// Detrended, normalized green channel
    Green,
}

impl std::fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateKind::Pos => write!(f, "POS"),
            CandidateKind::Green => write!(f, "green"),
        }
    }
}

/// Dominant in-band frequency of one candidate signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectralEstimate {
    /// Peak frequency after sub-bin refinement, in beats per minute
    pub bpm: f64,
    /// Fraction of in-band spectral energy near the peak, in [0, 1]
    pub snr: f64,
    /// Magnitude of the peak bin
    pub peak_magnitude: f64,
}

impl SpectralEstimate {
    /// Estimate reported for a candidate with no usable spectrum.
    pub const EMPTY: Self = Self {
        bpm: 0.0,
        snr: 0.0,
        peak_magnitude: 0.0,
    };
}

// ============================================================================
// Output
// ============================================================================

/// Confidence tier of a reading. Ordered `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Final heart-rate reading handed to the result consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// 0 when the reading is not valid, otherwise within the BPM bounds
    pub heart_rate: u32,
    pub confidence: Confidence,
    /// Display waveform in [-1, 1]; empty for uninformative captures
    pub waveform: Vec<f64>,
    /// round(snr * 100)
    pub signal_quality: u32,
    pub samples_processed: usize,
    pub valid_reading: bool,
    pub message: String,
}

impl ProcessingResult {
    /// Result for a well-formed capture whose green channel never moved.
    pub fn no_variation(samples_processed: usize) -> Self {
        Self {
            heart_rate: 0,
            confidence: Confidence::Low,
            waveform: Vec::new(),
            signal_quality: 0,
            samples_processed,
            valid_reading: false,
            message: crate::config::defaults::MSG_NO_VARIATION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_channel_is_invalid() {
        assert!(RawSample::new(120.0, 80.0, 60.0, 0).is_valid());
        assert!(RawSample::new(0.0, 0.0, 0.0, 0).is_valid());
        assert!(!RawSample::new(-1.0, 80.0, 60.0, 0).is_valid());
        assert!(!RawSample::new(120.0, 80.0, -0.5, 0).is_valid());
        assert!(!RawSample::new(120.0, f64::NAN, 60.0, 0).is_valid());
        assert!(!RawSample::new(f64::INFINITY, 80.0, 60.0, 0).is_valid());
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(ProcessingResult::no_variation(42)).unwrap();
        assert_eq!(json["heartRate"], 0);
        assert_eq!(json["confidence"], "low");
        assert_eq!(json["samplesProcessed"], 42);
        assert_eq!(json["validReading"], false);
        assert_eq!(json["signalQuality"], 0);
        assert_eq!(json["message"], "No color variation detected");
    }

    #[test]
    fn test_sample_timestamp_optional() {
        let s: RawSample = serde_json::from_str(r#"{"r": 1.0, "g": 2.0, "b": 3.0}"#).unwrap();
        assert_eq!(s.timestamp, 0);
    }
}
