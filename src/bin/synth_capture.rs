//! Synthetic Capture Generator
//!
//! Emits a face-colour capture with a known pulse rate, for exercising
//! `rppg-engine` without a camera.
//!
//! # Usage
//! ```bash
//! ./synth-capture --bpm 90 --seconds 30 | ./rppg-engine analyze --input -
//! ```

use anyhow::{bail, Result};
use clap::Parser;

use rppg_engine::SyntheticCapture;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "synth-capture")]
#[command(about = "Synthetic rPPG capture generator for rppg-engine testing")]
#[command(version)]
struct Args {
    /// Pulse rate to embed (beats per minute)
    #[arg(long, default_value = "72")]
    bpm: f64,

    /// Capture length in seconds
    #[arg(short, long, default_value = "30")]
    seconds: f64,

    /// Sampling rate in Hz
    #[arg(long, default_value = "10")]
    fps: f64,

    /// Pulse amplitude on the green channel (0-255 scale)
    #[arg(short, long, default_value = "5")]
    amplitude: f64,

    /// Gaussian noise std-dev applied to every channel
    #[arg(short, long, default_value = "0.1")]
    noise: f64,

    /// Random seed for reproducibility (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Wrap samples as {"signals": [...], "fps": N} instead of a bare array
    #[arg(long)]
    with_fps: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }
    if !(args.seconds.is_finite() && args.seconds > 0.0) {
        bail!("--seconds must be positive, got {}", args.seconds);
    }

    let samples = (args.seconds * args.fps).round() as usize;
    let seed = args.seed.unwrap_or_else(rand::random);
    let start = chrono::Utc::now().timestamp_millis();

    eprintln!(
        "Generating {} samples at {} Hz, {} BPM (seed {})",
        samples, args.fps, args.bpm, seed
    );

    let signals = SyntheticCapture::new()
        .samples(samples)
        .fps(args.fps)
        .bpm(args.bpm)
        .amplitude(args.amplitude)
        .noise(args.noise, args.noise, args.noise)
        .seed(seed)
        .start_timestamp_ms(start)
        .generate();

    let output = if args.with_fps {
        serde_json::to_string(&serde_json::json!({ "signals": signals, "fps": args.fps }))?
    } else {
        serde_json::to_string(&signals)?
    };
    println!("{output}");
    Ok(())
}
