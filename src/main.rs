//! rPPG Engine - heart rate from face colour traces
//!
//! Command-line front end for the pulse pipeline. Reads captures as JSON
//! and writes `ProcessingResult` JSON to stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Analyze one capture (array of {r, g, b, timestamp})
//! rppg-engine analyze --input capture.json --fps 10
//!
//! # Pipe straight from the simulator
//! synth-capture --bpm 72 | rppg-engine analyze --input - --details
//!
//! # Many captures in parallel
//! rppg-engine batch a.json b.json c.json
//!
//! # Print the effective configuration
//! rppg-engine show-config
//! ```
//!
//! # Environment Variables
//!
//! - `RPPG_CONFIG`: Path to a pipeline config TOML file
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use rppg_engine::config::{self, PipelineConfig};
use rppg_engine::worker::{self, CaptureJob};
use rppg_engine::{ProcessingError, ProcessingResult, PulseProcessor, RawSample};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "rppg-engine")]
#[command(about = "Heart rate estimation from per-frame face colour samples")]
#[command(version)]
struct CliArgs {
    /// Pipeline config TOML (overrides RPPG_CONFIG and ./rppg_config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Estimate heart rate for one capture
    Analyze {
        /// Capture JSON file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Sampling rate in Hz (overrides any fps in the file)
        #[arg(long)]
        fps: Option<f64>,

        /// Include per-candidate spectral estimates
        #[arg(long)]
        details: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Estimate heart rate for several captures in parallel
    Batch {
        /// Capture JSON files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Sampling rate in Hz applied to files that do not carry one
        #[arg(long)]
        fps: Option<f64>,
    },

    /// Print the effective pipeline configuration as TOML
    ShowConfig,
}

// ============================================================================
// Capture Files
// ============================================================================

/// Accepted capture file shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaptureFile {
    Samples(Vec<RawSample>),
    Request {
        signals: Vec<RawSample>,
        #[serde(default)]
        fps: Option<f64>,
    },
}

impl CaptureFile {
    fn into_parts(self) -> (Vec<RawSample>, Option<f64>) {
        match self {
            CaptureFile::Request { signals, fps } => (signals, fps),
            CaptureFile::Samples(signals) => (signals, None),
        }
    }
}

fn read_capture(input: &str) -> Result<(Vec<RawSample>, Option<f64>)> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read capture from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))?
    };

    let capture: CaptureFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse capture JSON from {input}"))?;
    Ok(capture.into_parts())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(PipelineConfig::load()),
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

// ============================================================================
// Commands
// ============================================================================

async fn run_analyze(input: &str, fps: Option<f64>, details: bool, pretty: bool) -> Result<()> {
    let (signals, file_fps) = read_capture(input)?;
    let fps = fps.or(file_fps);
    info!(samples = signals.len(), ?fps, "Analyzing capture");

    let processor = Arc::new(PulseProcessor::new(config::get().clone()));

    if details {
        let report = tokio::task::spawn_blocking(move || processor.process_detailed(&signals, fps))
            .await
            .context("Pulse worker task failed")??;
        println!("{}", to_json(&report, pretty)?);
        return Ok(());
    }

    let result = worker::analyze(processor, signals, fps).await?;
    info!(
        heart_rate = result.heart_rate,
        confidence = %result.confidence,
        valid = result.valid_reading,
        "Analysis complete"
    );
    println!("{}", to_json(&result, pretty)?);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntry {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ProcessingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn run_batch(inputs: &[PathBuf], fps: Option<f64>) -> Result<()> {
    let mut jobs = Vec::with_capacity(inputs.len());
    for path in inputs {
        let (signals, file_fps) = read_capture(&path.to_string_lossy())?;
        jobs.push(CaptureJob::new(signals, file_fps.or(fps)));
    }

    let processor = PulseProcessor::new(config::get().clone());
    let results = worker::process_batch(&processor, &jobs);

    for (path, outcome) in inputs.iter().zip(results) {
        let entry = match outcome {
            Ok(result) => BatchEntry {
                input: path.display().to_string(),
                result: Some(result),
                error: None,
            },
            Err(e) => {
                if let ProcessingError::InsufficientSamples { .. } = e {
                    warn!(input = %path.display(), "Capture too short, re-capture needed");
                }
                BatchEntry {
                    input: path.display().to_string(),
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        };
        println!("{}", to_json(&entry, false)?);
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    config::init(load_config(args.config.as_deref())?);

    match args.command {
        SubCommand::Analyze {
            input,
            fps,
            details,
            pretty,
        } => run_analyze(&input, fps, details, pretty).await,
        SubCommand::Batch { inputs, fps } => run_batch(&inputs, fps),
        SubCommand::ShowConfig => {
            print!("{}", config::get().to_toml()?);
            Ok(())
        }
    }
}
