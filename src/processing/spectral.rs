//! Spectral heart-rate estimation using rustfft
//!
//! Hann window, zero-padding to a power of two, in-band peak search with
//! parabolic sub-bin refinement, and a peak-concentration SNR.
//!
//! # Example
//!
//! ```ignore
//! let analyzer = SpectralAnalyzer::new(signal.len(), 10.0, &band, &spectral);
//! let estimate = analyzer.estimate(&signal);
//! println!("{:.1} BPM (snr {:.2})", estimate.bpm, estimate.snr);
//! ```

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::trace;

use crate::config::defaults::NUMERIC_EPSILON;
use crate::config::{BandConfig, SpectralConfig};
use crate::types::SpectralEstimate;

/// Hann window coefficients `0.5 - 0.5 cos(2 pi i / (n - 1))`.
pub fn hann_window(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n)
                .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos())
                .collect()
        }
    }
}

/// Sub-bin offset of a peak from the magnitudes of the bin before it, the
/// peak bin and the bin after it.
///
/// Returns 0 when the three points are (nearly) collinear.
pub fn parabolic_offset(before: f64, peak: f64, after: f64) -> f64 {
    let denom = before - 2.0 * peak + after;
    if denom.abs() < NUMERIC_EPSILON {
        return 0.0;
    }
    let delta = 0.5 * (before - after) / denom;
    if delta.is_finite() {
        delta
    } else {
        0.0
    }
}

// ============================================================================
// Spectral Analyzer (pre-planned for both candidates)
// ============================================================================

/// FFT analyzer planned once per capture and shared by both candidates.
pub struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    fft_size: usize,
    fps: f64,
    min_bin: usize,
    max_bin: usize,
    snr_half_width: usize,
}

impl SpectralAnalyzer {
    /// Plan an analyzer for signals of length `n` sampled at `fps`.
    ///
    /// FFT size is `next_power_of_two(n * zero_pad_factor)`. Band edges map
    /// to bins `round(freq * fft_size / fps)`, clamped into the positive half
    /// of the spectrum.
    pub fn new(n: usize, fps: f64, band: &BandConfig, spectral: &SpectralConfig) -> Self {
        let fft_size = (n.max(1) * spectral.zero_pad_factor.max(1)).next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let last_bin = (fft_size / 2).saturating_sub(1);
        let to_bin = |freq: f64| ((freq * fft_size as f64 / fps).round() as usize).min(last_bin);
        let max_bin = to_bin(band.high_hz);
        let min_bin = to_bin(band.low_hz).min(max_bin);

        Self {
            fft,
            window: hann_window(n),
            fft_size,
            fps,
            min_bin,
            max_bin,
            snr_half_width: spectral.snr_half_width,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Inclusive in-band bin range.
    pub fn band_bins(&self) -> (usize, usize) {
        (self.min_bin, self.max_bin)
    }

    /// Frequency (Hz) of a possibly fractional bin index.
    pub fn bin_to_hz(&self, bin: f64) -> f64 {
        bin * self.fps / self.fft_size as f64
    }

    /// Magnitudes of the first half of the windowed, zero-padded spectrum.
    pub fn magnitude_spectrum(&self, signal: &[f64]) -> Vec<f64> {
        let mut buffer = vec![Complex::new(0.0, 0.0); self.fft_size];
        for ((slot, &s), &w) in buffer.iter_mut().zip(signal).zip(&self.window) {
            *slot = Complex::new(s * w, 0.0);
        }

        self.fft.process(&mut buffer);

        buffer
            .iter()
            .take(self.fft_size / 2)
            .map(|c| c.norm())
            .collect()
    }

    /// Dominant in-band frequency of `signal`.
    pub fn estimate(&self, signal: &[f64]) -> SpectralEstimate {
        if signal.is_empty() {
            return SpectralEstimate::EMPTY;
        }

        let mags = self.magnitude_spectrum(signal);
        let (lo, hi) = (self.min_bin, self.max_bin);

        let (peak_bin, peak_magnitude) = (lo..=hi).fold((lo, mags[lo]), |best, k| {
            if mags[k] > best.1 {
                (k, mags[k])
            } else {
                best
            }
        });

        let refined_bin = if peak_bin > lo && peak_bin < hi {
            peak_bin as f64
                + parabolic_offset(mags[peak_bin - 1], mags[peak_bin], mags[peak_bin + 1])
        } else {
            peak_bin as f64
        };
        let bpm = self.bin_to_hz(refined_bin) * 60.0;

        let near_lo = peak_bin.saturating_sub(self.snr_half_width).max(lo);
        let near_hi = (peak_bin + self.snr_half_width).min(hi);
        let peak_energy: f64 = mags[near_lo..=near_hi].iter().map(|m| m * m).sum();
        let band_energy: f64 = mags[lo..=hi].iter().map(|m| m * m).sum();
        let snr = if band_energy > 0.0 {
            peak_energy / band_energy
        } else {
            0.0
        };

        trace!(
            fft_size = self.fft_size,
            peak_bin,
            refined_bin,
            bpm,
            snr,
            "Spectral peak"
        );

        SpectralEstimate {
            bpm,
            snr,
            peak_magnitude,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn analyzer(n: usize, fps: f64) -> SpectralAnalyzer {
        SpectralAnalyzer::new(n, fps, &BandConfig::default(), &SpectralConfig::default())
    }

    fn tone(freq: f64, fps: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / fps).sin())
            .collect()
    }

    #[test]
    fn test_hann_window() {
        let w = hann_window(11);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[10], 0.0, epsilon = 1e-12);
        assert_relative_eq!(w[5], 1.0, epsilon = 1e-12);
        assert_eq!(hann_window(1), vec![1.0]);
        assert!(hann_window(0).is_empty());
    }

    #[test]
    fn test_fft_size_is_padded_power_of_two() {
        assert_eq!(analyzer(300, 10.0).fft_size(), 2048);
        assert_eq!(analyzer(30, 10.0).fft_size(), 128);
        assert_eq!(analyzer(256, 30.0).fft_size(), 1024);
    }

    #[test]
    fn test_band_bins() {
        let a = analyzer(300, 10.0);
        // round(0.75 * 2048 / 10) = 154, round(3.0 * 2048 / 10) = 614
        assert_eq!(a.band_bins(), (154, 614));
    }

    #[test]
    fn test_band_clamped_below_nyquist() {
        // 3 Hz is above Nyquist at 4 fps
        let a = analyzer(100, 4.0);
        let (lo, hi) = a.band_bins();
        assert!(lo <= hi);
        assert_eq!(hi, a.fft_size() / 2 - 1);
    }

    #[test]
    fn test_parabolic_offset() {
        assert_relative_eq!(parabolic_offset(1.0, 2.0, 1.0), 0.0);
        assert!(parabolic_offset(1.5, 2.0, 1.0) < 0.0);
        assert!(parabolic_offset(1.0, 2.0, 1.5) > 0.0);
        assert_relative_eq!(parabolic_offset(1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_recovers_tone_frequency() {
        for &bpm in &[54.0, 72.0, 96.0, 150.0] {
            let fps = 10.0;
            let signal = tone(bpm / 60.0, fps, 300);
            let est = analyzer(300, fps).estimate(&signal);
            assert!(
                (est.bpm - bpm).abs() < 1.0,
                "expected ~{bpm} BPM, got {:.2}",
                est.bpm
            );
            assert!(est.snr > 0.3, "pure tone should concentrate energy, snr {}", est.snr);
        }
    }

    #[test]
    fn test_snr_is_energy_fraction() {
        let est = analyzer(300, 10.0).estimate(&tone(1.2, 10.0, 300));
        assert!(est.snr > 0.0 && est.snr <= 1.0);
        assert!(est.peak_magnitude > 0.0);
    }

    #[test]
    fn test_zero_signal_is_guarded() {
        let est = analyzer(64, 10.0).estimate(&[0.0; 64]);
        assert_eq!(est.snr, 0.0);
        assert!(est.bpm.is_finite());
        assert_eq!(est.peak_magnitude, 0.0);
    }

    #[test]
    fn test_empty_signal() {
        assert_eq!(analyzer(0, 10.0).estimate(&[]), SpectralEstimate::EMPTY);
    }
}
