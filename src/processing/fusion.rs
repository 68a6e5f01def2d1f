//! Candidate fusion and confidence scoring
//!
//! Picks the better of the POS and green candidates by SNR, checks the
//! result against physiological bounds and grades it.

use tracing::debug;

use super::normalize::variance;
use crate::config::defaults::{MSG_MODERATE, MSG_STRONG, MSG_UNRELIABLE};
use crate::config::FusionConfig;
use crate::types::{CandidateKind, Confidence, ProcessingResult, SpectralEstimate};

/// A filtered candidate signal together with its spectral estimate.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub kind: CandidateKind,
    pub filtered: Vec<f64>,
    pub estimate: SpectralEstimate,
}

/// Choose between the POS and green candidates.
///
/// POS wins when its SNR is at least the green SNR and above the floor;
/// otherwise green wins if it clears the floor; otherwise the higher SNR
/// wins (ties go to POS).
pub fn select<'a>(
    pos: &'a ScoredCandidate,
    green: &'a ScoredCandidate,
    config: &FusionConfig,
) -> &'a ScoredCandidate {
    let floor = config.selection_snr_floor;
    let (p, g) = (pos.estimate.snr, green.estimate.snr);

    if p >= g && p > floor {
        pos
    } else if g > floor || g > p {
        green
    } else {
        pos
    }
}

/// In-bounds BPM, SNR above the validity threshold, and a filtered signal
/// with non-negligible variance.
pub fn is_valid_reading(candidate: &ScoredCandidate, config: &FusionConfig) -> bool {
    let est = &candidate.estimate;
    let in_bounds =
        est.bpm >= f64::from(config.min_bpm) && est.bpm <= f64::from(config.max_bpm);
    in_bounds
        && est.snr > config.valid_snr
        && variance(&candidate.filtered) > config.min_signal_variance
}

/// Confidence tier. Invalid readings are always `Low`.
pub fn confidence_tier(
    snr: f64,
    sample_count: usize,
    valid: bool,
    config: &FusionConfig,
) -> Confidence {
    if !valid {
        Confidence::Low
    } else if snr > config.high_snr && sample_count >= config.high_min_samples {
        Confidence::High
    } else if snr > config.medium_snr && sample_count >= config.medium_min_samples {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Nearest-index resample to `points` values, scaled by the peak absolute
/// value into [-1, 1].
pub fn display_waveform(signal: &[f64], points: usize) -> Vec<f64> {
    if signal.is_empty() {
        return vec![0.0; points];
    }

    let n = signal.len();
    let resampled: Vec<f64> = (0..points).map(|i| signal[i * n / points]).collect();

    let peak = resampled.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let scale = if peak > 0.0 && peak.is_finite() { peak } else { 1.0 };

    resampled
        .into_iter()
        .map(|v| (v / scale).clamp(-1.0, 1.0))
        .collect()
}

/// User-facing message for a reading.
pub fn message_for(valid: bool, confidence: Confidence) -> &'static str {
    match (valid, confidence) {
        (false, _) => MSG_UNRELIABLE,
        (true, Confidence::High) => MSG_STRONG,
        (true, _) => MSG_MODERATE,
    }
}

/// Fuse both candidates into the final result.
pub fn fuse(
    pos: &ScoredCandidate,
    green: &ScoredCandidate,
    sample_count: usize,
    config: &FusionConfig,
) -> (CandidateKind, ProcessingResult) {
    let winner = select(pos, green, config);
    let est = winner.estimate;

    let valid = is_valid_reading(winner, config);
    let heart_rate = if valid {
        // Saturating cast; bpm is already within bounds here.
        (est.bpm.round() as u32).clamp(config.min_bpm, config.max_bpm)
    } else {
        0
    };
    let confidence = confidence_tier(est.snr, sample_count, valid, config);

    debug!(
        selected = %winner.kind,
        pos_bpm = pos.estimate.bpm,
        pos_snr = pos.estimate.snr,
        green_bpm = green.estimate.bpm,
        green_snr = green.estimate.snr,
        valid,
        %confidence,
        "Fused candidates"
    );

    let result = ProcessingResult {
        heart_rate,
        confidence,
        waveform: display_waveform(&winner.filtered, config.waveform_points),
        signal_quality: (est.snr * 100.0).round() as u32,
        samples_processed: sample_count,
        valid_reading: valid,
        message: message_for(valid, confidence).to_string(),
    };

    (winner.kind, result)
}
