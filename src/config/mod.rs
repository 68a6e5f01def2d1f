//! Pipeline Configuration Module
//!
//! Every threshold the pulse pipeline uses is a field of [`PipelineConfig`],
//! loaded from TOML with built-in defaults for anything left unset.
//!
//! ## Loading Order
//!
//! 1. `RPPG_CONFIG` environment variable (path to TOML file)
//! 2. `rppg_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The library entry points always take the config explicitly. Binaries may
//! install a process-wide copy with `config::init()` and read it back with
//! `config::get()`.

mod pipeline_config;
pub mod defaults;
pub mod validation;

pub use pipeline_config::*;

use std::sync::OnceLock;

/// Process-wide pipeline configuration, initialized once at startup.
static PIPELINE_CONFIG: OnceLock<PipelineConfig> = OnceLock::new();

/// Initialize the process-wide configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: PipelineConfig) {
    if PIPELINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Process-wide configuration, or the built-in defaults when `init()` was
/// never called.
pub fn get() -> &'static PipelineConfig {
    PIPELINE_CONFIG.get_or_init(PipelineConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    PIPELINE_CONFIG.get().is_some()
}
