//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks on pipeline parameters.
//!
//! Unknown keys are found by walking the raw `toml::Value` tree before serde
//! deserialization. They only ever produce warnings.

use std::collections::HashSet;

use super::PipelineConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `PipelineConfig`.
///
/// Must be kept in step with the structs in `pipeline_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        "ingest",
        "ingest.min_samples",
        "ingest.default_fps",
        "ingest.min_green_range",
        "pos",
        "pos.window_seconds",
        "pos.min_window",
        "band",
        "band.low_hz",
        "band.high_hz",
        "band.passes",
        "spectral",
        "spectral.zero_pad_factor",
        "spectral.snr_half_width",
        "fusion",
        "fusion.selection_snr_floor",
        "fusion.valid_snr",
        "fusion.min_signal_variance",
        "fusion.min_bpm",
        "fusion.max_bpm",
        "fusion.high_snr",
        "fusion.high_min_samples",
        "fusion.medium_snr",
        "fusion.medium_min_samples",
        "fusion.waveform_points",
    ];
    keys.iter().copied().collect()
}

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// `{ a = { b = 1 } }` yields `["a", "a.b"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

/// Levenshtein edit distance over chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3, if any.
///
/// Ties resolve to the lexicographically smallest key so the suggestion is
/// stable across runs.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

/// Parse a raw TOML string and return warnings for any unknown config keys.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are reported by serde
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Range and ordering checks. Returns one message per violated rule.
pub fn validate_ranges(config: &PipelineConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let i = &config.ingest;
    if i.min_samples < 2 {
        errors.push(format!(
            "ingest.min_samples = {} must be >= 2 (window and trend fits need two points)",
            i.min_samples
        ));
    }
    if i.default_fps <= 0.0 {
        errors.push(format!("ingest.default_fps = {} must be > 0", i.default_fps));
    }
    if i.min_green_range < 0.0 {
        errors.push(format!(
            "ingest.min_green_range = {} cannot be negative",
            i.min_green_range
        ));
    }

    if config.pos.window_seconds <= 0.0 {
        errors.push(format!(
            "pos.window_seconds = {} must be > 0",
            config.pos.window_seconds
        ));
    }
    if config.pos.min_window < 2 {
        errors.push(format!("pos.min_window = {} must be >= 2", config.pos.min_window));
    }

    let b = &config.band;
    if b.low_hz <= 0.0 {
        errors.push(format!("band.low_hz = {} must be > 0", b.low_hz));
    }
    if b.low_hz >= b.high_hz {
        errors.push(format!(
            "band.low_hz ({}) must be less than band.high_hz ({})",
            b.low_hz, b.high_hz
        ));
    }
    if b.passes == 0 {
        errors.push("band.passes must be > 0".to_string());
    }

    if config.spectral.zero_pad_factor == 0 {
        errors.push("spectral.zero_pad_factor must be > 0".to_string());
    }

    let f = &config.fusion;
    if f.min_bpm >= f.max_bpm {
        errors.push(format!(
            "fusion.min_bpm ({}) must be less than fusion.max_bpm ({})",
            f.min_bpm, f.max_bpm
        ));
    }
    if f.high_snr < f.medium_snr {
        errors.push(format!(
            "fusion.high_snr ({}) must be >= fusion.medium_snr ({})",
            f.high_snr, f.medium_snr
        ));
    }
    if f.high_min_samples < f.medium_min_samples {
        errors.push(format!(
            "fusion.high_min_samples ({}) must be >= fusion.medium_min_samples ({})",
            f.high_min_samples, f.medium_min_samples
        ));
    }
    if f.min_signal_variance < 0.0 {
        errors.push("fusion.min_signal_variance cannot be negative".to_string());
    }
    if f.waveform_points == 0 {
        errors.push("fusion.waveform_points must be > 0".to_string());
    }

    errors
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("hello", "hello"), 0);
        assert_eq!(levenshtein("hi_snr", "high_snr"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [band]
            low_hz = 0.7
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"band".to_string()));
        assert!(keys.contains(&"band.low_hz".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys(
            r#"
[fusion]
hgh_snr = 0.2
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "fusion.hgh_snr");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("fusion.high_snr"));
    }

    #[test]
    fn test_unknown_section_has_no_close_match() {
        let warnings = validate_unknown_keys(
            r#"
[camera_capture]
resolution = "720p"
"#,
        );
        assert!(warnings.iter().any(|w| w.field == "camera_capture"));
        assert!(warnings.iter().all(|w| w.suggestion.is_none()));
    }

    #[test]
    fn test_default_ranges_clean() {
        assert!(validate_ranges(&PipelineConfig::default()).is_empty());
    }

    #[test]
    fn test_tier_ordering_enforced() {
        let mut config = PipelineConfig::default();
        config.fusion.medium_snr = 0.3;
        let errors = validate_ranges(&config);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("high_snr"));
    }
}
