//! Pipeline Configuration - every rPPG threshold as a tunable TOML value
//!
//! Each section implements `Default` with the values from [`super::defaults`],
//! so a missing or partial config file behaves exactly like the built-in
//! constants.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the pulse pipeline.
///
/// Load with `PipelineConfig::load()` which searches:
/// 1. `$RPPG_CONFIG` env var
/// 2. `./rppg_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sample filtering and the validity gate
    #[serde(default)]
    pub ingest: IngestConfig,

    /// POS projector windowing
    #[serde(default)]
    pub pos: PosConfig,

    /// Heart-rate band and bandpass filter
    #[serde(default)]
    pub band: BandConfig,

    /// FFT sizing and SNR neighbourhood
    #[serde(default)]
    pub spectral: SpectralConfig,

    /// Candidate selection, validity and confidence tiers
    #[serde(default)]
    pub fusion: FusionConfig,
}

impl PipelineConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded pipeline config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded pipeline config from ./{}", defaults::CONFIG_FILE_NAME);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::CONFIG_FILE_NAME);
                }
            }
        }

        info!("No pipeline config found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings and otherwise ignored.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Pipeline config saved");
        Ok(())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - All floating point values must be finite
    /// - Band edges must be positive and ordered
    /// - Sizes used as divisors or lengths must be non-zero
    /// - The medium tier must not be stricter than the high tier
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = super::validation::validate_ranges(self);

        let floats = [
            ("ingest.default_fps", self.ingest.default_fps),
            ("ingest.min_green_range", self.ingest.min_green_range),
            ("pos.window_seconds", self.pos.window_seconds),
            ("band.low_hz", self.band.low_hz),
            ("band.high_hz", self.band.high_hz),
            ("fusion.selection_snr_floor", self.fusion.selection_snr_floor),
            ("fusion.valid_snr", self.fusion.valid_snr),
            ("fusion.min_signal_variance", self.fusion.min_signal_variance),
            ("fusion.high_snr", self.fusion.high_snr),
            ("fusion.medium_snr", self.fusion.medium_snr),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                errors.push(format!("{name}: value must be finite (got {value})"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Ingestion
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Minimum valid samples required; fewer is a hard error
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Sampling rate used when the caller omits one (Hz)
    #[serde(default = "default_fps")]
    pub default_fps: f64,

    /// Green range (0-255) below which the capture is uninformative
    #[serde(default = "default_min_green_range")]
    pub min_green_range: f64,
}

fn default_min_samples() -> usize { defaults::MIN_SAMPLES }
fn default_fps() -> f64 { defaults::DEFAULT_FPS }
fn default_min_green_range() -> f64 { defaults::MIN_GREEN_RANGE }

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            default_fps: default_fps(),
            min_green_range: default_min_green_range(),
        }
    }
}

// ============================================================================
// POS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosConfig {
    /// Window duration in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: f64,

    /// Smallest allowed window (samples)
    #[serde(default = "default_min_window")]
    pub min_window: usize,
}

fn default_window_seconds() -> f64 { defaults::POS_WINDOW_SECONDS }
fn default_min_window() -> usize { defaults::POS_MIN_WINDOW }

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            min_window: default_min_window(),
        }
    }
}

impl PosConfig {
    /// Window length in samples for a given capture rate.
    pub fn window_len(&self, fps: f64) -> usize {
        let w = (fps * self.window_seconds).round();
        // Negative or NaN rounds collapse to zero through the saturating cast.
        (w as usize).max(self.min_window)
    }
}

// ============================================================================
// Band
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    /// High-pass edge (Hz)
    #[serde(default = "default_band_low")]
    pub low_hz: f64,

    /// Low-pass edge (Hz)
    #[serde(default = "default_band_high")]
    pub high_hz: f64,

    /// Passes of each single-pole stage
    #[serde(default = "default_filter_passes")]
    pub passes: usize,
}

fn default_band_low() -> f64 { defaults::BAND_LOW_HZ }
fn default_band_high() -> f64 { defaults::BAND_HIGH_HZ }
fn default_filter_passes() -> usize { defaults::FILTER_PASSES }

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            low_hz: default_band_low(),
            high_hz: default_band_high(),
            passes: default_filter_passes(),
        }
    }
}

// ============================================================================
// Spectral
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// FFT length = next_power_of_two(n * zero_pad_factor)
    #[serde(default = "default_zero_pad_factor")]
    pub zero_pad_factor: usize,

    /// Bins on each side of the peak counted as peak energy
    #[serde(default = "default_snr_half_width")]
    pub snr_half_width: usize,
}

fn default_zero_pad_factor() -> usize { defaults::ZERO_PAD_FACTOR }
fn default_snr_half_width() -> usize { defaults::SNR_HALF_WIDTH_BINS }

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            zero_pad_factor: default_zero_pad_factor(),
            snr_half_width: default_snr_half_width(),
        }
    }
}

// ============================================================================
// Fusion
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default = "default_selection_snr_floor")]
    pub selection_snr_floor: f64,

    #[serde(default = "default_valid_snr")]
    pub valid_snr: f64,

    #[serde(default = "default_min_signal_variance")]
    pub min_signal_variance: f64,

    #[serde(default = "default_min_bpm")]
    pub min_bpm: u32,

    #[serde(default = "default_max_bpm")]
    pub max_bpm: u32,

    #[serde(default = "default_high_snr")]
    pub high_snr: f64,

    #[serde(default = "default_high_min_samples")]
    pub high_min_samples: usize,

    #[serde(default = "default_medium_snr")]
    pub medium_snr: f64,

    #[serde(default = "default_medium_min_samples")]
    pub medium_min_samples: usize,

    /// Display waveform length
    #[serde(default = "default_waveform_points")]
    pub waveform_points: usize,
}

fn default_selection_snr_floor() -> f64 { defaults::SELECTION_SNR_FLOOR }
fn default_valid_snr() -> f64 { defaults::VALID_SNR }
fn default_min_signal_variance() -> f64 { defaults::MIN_SIGNAL_VARIANCE }
fn default_min_bpm() -> u32 { defaults::MIN_BPM }
fn default_max_bpm() -> u32 { defaults::MAX_BPM }
fn default_high_snr() -> f64 { defaults::HIGH_SNR }
fn default_high_min_samples() -> usize { defaults::HIGH_MIN_SAMPLES }
fn default_medium_snr() -> f64 { defaults::MEDIUM_SNR }
fn default_medium_min_samples() -> usize { defaults::MEDIUM_MIN_SAMPLES }
fn default_waveform_points() -> usize { defaults::WAVEFORM_POINTS }

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            selection_snr_floor: default_selection_snr_floor(),
            valid_snr: default_valid_snr(),
            min_signal_variance: default_min_signal_variance(),
            min_bpm: default_min_bpm(),
            max_bpm: default_max_bpm(),
            high_snr: default_high_snr(),
            high_min_samples: default_high_min_samples(),
            medium_snr: default_medium_snr(),
            medium_min_samples: default_medium_min_samples(),
            waveform_points: default_waveform_points(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.ingest.min_samples, 30);
        assert!((config.ingest.default_fps - 10.0).abs() < f64::EPSILON);
        assert!((config.band.low_hz - 0.75).abs() < f64::EPSILON);
        assert!((config.band.high_hz - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.fusion.waveform_points, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
[band]
high_hz = 3.5
"#,
        )
        .expect("partial config should parse");
        assert!((config.band.high_hz - 3.5).abs() < f64::EPSILON);
        assert!((config.band.low_hz - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.fusion, FusionConfig::default());
    }

    #[test]
    fn test_window_len() {
        let pos = PosConfig::default();
        assert_eq!(pos.window_len(10.0), 16);
        assert_eq!(pos.window_len(30.0), 48);
        // 1.6 samples rounds to 2, floored to the minimum window
        assert_eq!(pos.window_len(1.0), 10);
    }

    #[test]
    fn test_toml_round_trip_preserves_config() {
        let mut config = PipelineConfig::default();
        config.fusion.high_snr = 0.25;
        let text = config.to_toml().expect("serialize");
        let parsed = PipelineConfig::from_toml_str(&text).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut config = PipelineConfig::default();
        config.band.low_hz = 3.0;
        config.band.high_hz = 0.75;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_nan_rejected() {
        let mut config = PipelineConfig::default();
        config.fusion.valid_snr = f64::NAN;
        let err = config.validate().expect_err("NaN must be rejected");
        assert!(err.to_string().contains("fusion.valid_snr"));
    }
}
