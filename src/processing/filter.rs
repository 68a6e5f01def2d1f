//! Heart-rate bandpass filter
//!
//! A cascade of single-pole RC sections: a high-pass stage at the lower band
//! edge followed by a low-pass stage at the upper edge, each applied
//! `passes` times. An approximation of a Butterworth band-pass.

use std::f64::consts::PI;

use crate::config::BandConfig;

/// Pre-computed RC coefficients for one sampling rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandpassFilter {
    hp_alpha: f64,
    lp_alpha: f64,
    passes: usize,
}

impl BandpassFilter {
    /// Coefficients for `band` at `fps` samples per second.
    ///
    /// High-pass: alpha = RC / (RC + dt); low-pass: alpha = dt / (RC + dt),
    /// with RC = 1 / (2 pi fc).
    pub fn new(band: &BandConfig, fps: f64) -> Self {
        let dt = 1.0 / fps;

        let hp_rc = 1.0 / (2.0 * PI * band.low_hz);
        let lp_rc = 1.0 / (2.0 * PI * band.high_hz);

        Self {
            hp_alpha: hp_rc / (hp_rc + dt),
            lp_alpha: dt / (lp_rc + dt),
            passes: band.passes,
        }
    }

    pub fn hp_alpha(&self) -> f64 {
        self.hp_alpha
    }

    pub fn lp_alpha(&self) -> f64 {
        self.lp_alpha
    }

    /// Filter a signal, returning a new buffer of the same length.
    pub fn apply(&self, signal: &[f64]) -> Vec<f64> {
        let mut out = signal.to_vec();
        for _ in 0..self.passes {
            high_pass_in_place(&mut out, self.hp_alpha);
        }
        for _ in 0..self.passes {
            low_pass_in_place(&mut out, self.lp_alpha);
        }
        out
    }
}

/// y[i] = a * (y[i-1] + x[i] - x[i-1]), starting from y[0] = 0.
fn high_pass_in_place(x: &mut [f64], alpha: f64) {
    let Some(&first) = x.first() else {
        return;
    };
    let mut prev_in = first;
    let mut prev_out = 0.0;
    x[0] = 0.0;
    for v in x.iter_mut().skip(1) {
        let input = *v;
        let out = alpha * (prev_out + input - prev_in);
        prev_in = input;
        prev_out = out;
        *v = out;
    }
}

/// y[i] = y[i-1] + a * (x[i] - y[i-1]), starting from y[0] = x[0].
fn low_pass_in_place(x: &mut [f64], alpha: f64) {
    let Some(&first) = x.first() else {
        return;
    };
    let mut prev = first;
    for v in x.iter_mut().skip(1) {
        prev += alpha * (*v - prev);
        *v = prev;
    }
}
