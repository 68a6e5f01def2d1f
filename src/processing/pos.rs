//! POS (Plane-Orthogonal-to-Skin) projector
//!
//! Wang et al. (2017), "Algorithmic Principles of Remote PPG". Projects the
//! three colour traces onto a plane orthogonal to the skin tone so that the
//! blood-volume pulse survives while illumination and motion changes shared
//! by all channels cancel.
//!
//! The projection is computed over short overlapping windows, each locally
//! renormalized, and stitched back together by overlap-add.

use tracing::{debug, trace};

use super::ingest::SampleSeries;
use super::normalize::{detrend, detrend_normalize, safe_std};

/// The two candidate pulse signals carried through the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct Candidates {
    /// POS projection, detrended and normalized
    pub pos: Vec<f64>,
    /// Green channel, detrended and normalized
    pub green: Vec<f64>,
}

/// Build both candidate signals from a gated series.
pub fn extract_candidates(series: &SampleSeries, window: usize) -> Candidates {
    let r = detrend_normalize(&series.r);
    let g = detrend_normalize(&series.g);
    let b = detrend_normalize(&series.b);

    let projected = project(&r, &g, &b, window);

    Candidates {
        pos: detrend_normalize(&projected),
        green: g,
    }
}

/// Overlap-add POS projection of already normalized R, G, B traces.
///
/// Windows of length `window` start every `window / 2` samples while
/// `start + window < n`. A capture shorter than one window yields zeros.
/// The accumulated signal is detrended to remove drift reintroduced at
/// window boundaries.
pub fn project(r: &[f64], g: &[f64], b: &[f64], window: usize) -> Vec<f64> {
    let n = r.len().min(g.len()).min(b.len());
    let mut pos = vec![0.0; n];

    if window == 0 || window >= n {
        debug!(n, window, "Capture shorter than one POS window");
        return pos;
    }

    let hop = (window / 2).max(1);
    let mut windows = 0usize;
    let mut start = 0usize;

    while start + window < n {
        let end = start + window;
        let wr = detrend_normalize(&r[start..end]);
        let wg = detrend_normalize(&g[start..end]);
        let wb = detrend_normalize(&b[start..end]);

        // Chrominance: Xs = 3R - 2G, Ys = 1.5R + G - 1.5B
        let xs: Vec<f64> = wr.iter().zip(&wg).map(|(&r, &g)| 3.0 * r - 2.0 * g).collect();
        let ys: Vec<f64> = wr
            .iter()
            .zip(&wg)
            .zip(&wb)
            .map(|((&r, &g), &b)| 1.5 * r + g - 1.5 * b)
            .collect();

        let alpha = safe_std(&xs) / safe_std(&ys);
        trace!(start, alpha, "POS window");

        for (k, (x, y)) in xs.iter().zip(&ys).enumerate() {
            pos[start + k] += x + alpha * y;
        }

        windows += 1;
        start += hop;
    }

    debug!(n, window, hop, windows, "POS projection complete");
    detrend(&pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::normalize::{mean, std_dev};
    use std::f64::consts::PI;

    fn series(n: usize, fps: f64) -> SampleSeries {
        // Pulse in all channels with skin-like relative strengths
        let pulse = |i: usize| (2.0 * PI * 1.2 * i as f64 / fps).sin();
        SampleSeries {
            r: (0..n).map(|i| 150.0 + 0.3 * pulse(i) + 0.01 * i as f64).collect(),
            g: (0..n).map(|i| 110.0 + 1.0 * pulse(i) + 0.01 * i as f64).collect(),
            b: (0..n).map(|i| 90.0 + 0.2 * pulse(i)).collect(),
        }
    }

    #[test]
    fn test_short_capture_yields_zeros() {
        let v = vec![0.5; 12];
        let out = project(&v, &v, &v, 16);
        assert_eq!(out.len(), 12);
        assert!(out.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_projection_length_matches_input() {
        let s = series(150, 10.0);
        let c = extract_candidates(&s, 16);
        assert_eq!(c.pos.len(), 150);
        assert_eq!(c.green.len(), 150);
    }

    #[test]
    fn test_candidates_are_normalized() {
        let s = series(300, 10.0);
        let c = extract_candidates(&s, 16);
        assert!(mean(&c.pos).abs() < 1e-9);
        assert!((std_dev(&c.pos) - 1.0).abs() < 1e-9);
        assert!((std_dev(&c.green) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_channels_stay_finite() {
        let v: Vec<f64> = (0..100).map(|i| (i as f64 * 0.3).sin()).collect();
        let out = project(&v, &v, &v, 16);
        assert!(out.iter().all(|x| x.is_finite()));
    }
}
