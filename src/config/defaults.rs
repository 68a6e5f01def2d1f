//! Pipeline default constants.
//!
//! Every tunable number the pulse pipeline uses lives here once, so the POS
//! and green candidates can never drift apart. Grouped by pipeline stage.

// ============================================================================
// Ingestion
// ============================================================================

/// Minimum number of valid samples after dropping failed captures.
///
/// 30 samples = 3 seconds at the default 10 Hz capture rate.
pub const MIN_SAMPLES: usize = 30;

/// Sampling rate assumed when the caller does not provide one (Hz).
pub const DEFAULT_FPS: f64 = 10.0;

/// Minimum green-channel range (0-255 scale) for a capture to be informative.
pub const MIN_GREEN_RANGE: f64 = 0.3;

// ============================================================================
// POS Projector
// ============================================================================

/// POS window length in seconds (window = round(fps * this)).
pub const POS_WINDOW_SECONDS: f64 = 1.6;

/// Lower bound on the POS window length (samples).
pub const POS_MIN_WINDOW: usize = 10;

// ============================================================================
// Heart-rate Band
// ============================================================================

/// Lower edge of the heart-rate band (Hz). 0.75 Hz = 45 BPM.
pub const BAND_LOW_HZ: f64 = 0.75;

/// Upper edge of the heart-rate band (Hz). 3.0 Hz = 180 BPM.
pub const BAND_HIGH_HZ: f64 = 3.0;

/// Number of times each single-pole stage is applied.
pub const FILTER_PASSES: usize = 2;

// ============================================================================
// Spectral Estimator
// ============================================================================

/// Zero-padding factor applied before rounding up to a power of two.
pub const ZERO_PAD_FACTOR: usize = 4;

/// Half-width (bins) of the neighbourhood counted as "peak energy" for SNR.
pub const SNR_HALF_WIDTH_BINS: usize = 2;

/// Denominators smaller than this are treated as zero.
pub const NUMERIC_EPSILON: f64 = 1e-12;

// ============================================================================
// Fusion & Confidence
// ============================================================================

/// A candidate needs more than this SNR to be preferred outright.
pub const SELECTION_SNR_FLOOR: f64 = 0.05;

/// Minimum SNR for a reading to be reported as valid.
pub const VALID_SNR: f64 = 0.08;

/// Minimum variance of the filtered winning candidate.
pub const MIN_SIGNAL_VARIANCE: f64 = 1e-10;

/// Physiological heart-rate bounds (BPM).
pub const MIN_BPM: u32 = 45;
pub const MAX_BPM: u32 = 180;

/// "high" confidence: SNR above this with at least `HIGH_MIN_SAMPLES`.
pub const HIGH_SNR: f64 = 0.18;
pub const HIGH_MIN_SAMPLES: usize = 60;

/// "medium" confidence: SNR above this with at least `MEDIUM_MIN_SAMPLES`.
pub const MEDIUM_SNR: f64 = 0.10;
pub const MEDIUM_MIN_SAMPLES: usize = 40;

/// Number of points in the display waveform.
pub const WAVEFORM_POINTS: usize = 100;

// ============================================================================
// Result Messages
// ============================================================================

pub const MSG_NO_VARIATION: &str = "No color variation detected";
pub const MSG_UNRELIABLE: &str = "Could not detect a reliable heart rate";
pub const MSG_STRONG: &str = "Strong signal detected";
pub const MSG_MODERATE: &str = "Moderate signal quality - try holding still in good lighting";

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable holding an explicit config file path.
pub const CONFIG_ENV_VAR: &str = "RPPG_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "rppg_config.toml";
