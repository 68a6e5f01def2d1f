//! Synthetic face captures
//!
//! Generates `RawSample` sequences with a sinusoidal pulse on the green
//! channel and independent Gaussian noise per channel. Seeded, so the same
//! builder always yields the same capture.
//!
//! # Example
//!
//! ```ignore
//! let signals = SyntheticCapture::new().bpm(72.0).samples(300).fps(10.0).generate();
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

use crate::types::RawSample;

/// Builder for a synthetic capture.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticCapture {
    samples: usize,
    fps: f64,
    bpm: f64,
    amplitude: f64,
    base: [f64; 3],
    noise: [f64; 3],
    seed: u64,
    start_timestamp_ms: i64,
}

impl Default for SyntheticCapture {
    fn default() -> Self {
        Self {
            samples: 300,
            fps: 10.0,
            bpm: 72.0,
            amplitude: 5.0,
            base: [150.0, 128.0, 100.0],
            noise: [0.1, 0.0, 0.1],
            seed: 42,
            start_timestamp_ms: 0,
        }
    }
}

impl SyntheticCapture {
    /// 300 samples at 10 Hz of a 72 BPM pulse, amplitude 5 on green.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Peak green deviation on the 0-255 scale.
    pub fn amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Mean R, G, B levels.
    pub fn base(mut self, r: f64, g: f64, b: f64) -> Self {
        self.base = [r, g, b];
        self
    }

    /// Gaussian noise standard deviation per channel (R, G, B).
    pub fn noise(mut self, r: f64, g: f64, b: f64) -> Self {
        self.noise = [r, g, b];
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn start_timestamp_ms(mut self, start: i64) -> Self {
        self.start_timestamp_ms = start;
        self
    }

    /// Produce the capture. Channel values are clamped into [0, 255].
    pub fn generate(&self) -> Vec<RawSample> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        // Non-positive or non-finite std-devs disable noise on that channel.
        let dists: Vec<Option<Normal<f64>>> = self
            .noise
            .iter()
            .map(|&sd| if sd > 0.0 { Normal::new(0.0, sd).ok() } else { None })
            .collect();

        let freq = self.bpm / 60.0;
        (0..self.samples)
            .map(|i| {
                let t = i as f64 / self.fps;
                let pulse = self.amplitude * (2.0 * PI * freq * t).sin();

                let mut channel = |c: usize, signal: f64| {
                    let noise = dists[c].map_or(0.0, |d| d.sample(&mut rng));
                    (self.base[c] + signal + noise).clamp(0.0, 255.0)
                };
                let r = channel(0, 0.0);
                let g = channel(1, pulse);
                let b = channel(2, 0.0);

                let timestamp = self.start_timestamp_ms + (t * 1000.0).round() as i64;
                RawSample::new(r, g, b, timestamp)
            })
            .collect()
    }
}
