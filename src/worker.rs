//! Caller-side concurrency for the pulse pipeline
//!
//! The pipeline itself is synchronous and CPU-bound. These helpers keep it
//! off the async executor and fan independent captures out across cores.
//! Neither adds a timeout: callers that need bounded latency wrap
//! [`analyze`] in `tokio::time::timeout`.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, error};

use crate::processing::{ProcessingError, PulseProcessor};
use crate::types::{ProcessingResult, RawSample};

/// One capture submitted for batch processing.
#[derive(Debug, Clone)]
pub struct CaptureJob {
    pub signals: Vec<RawSample>,
    pub fps: Option<f64>,
}

impl CaptureJob {
    pub fn new(signals: Vec<RawSample>, fps: Option<f64>) -> Self {
        Self { signals, fps }
    }
}

/// Run one capture on tokio's blocking pool.
///
/// A panic inside the pipeline surfaces as `ProcessingError::WorkerFailed`.
pub async fn analyze(
    processor: Arc<PulseProcessor>,
    signals: Vec<RawSample>,
    fps: Option<f64>,
) -> Result<ProcessingResult, ProcessingError> {
    tokio::task::spawn_blocking(move || processor.process(&signals, fps))
        .await
        .map_err(|e| {
            error!(error = %e, "Pulse worker task failed");
            ProcessingError::WorkerFailed(e.to_string())
        })?
}

/// Process independent captures in parallel with rayon.
///
/// Results are returned in input order.
pub fn process_batch(
    processor: &PulseProcessor,
    jobs: &[CaptureJob],
) -> Vec<Result<ProcessingResult, ProcessingError>> {
    debug!(jobs = jobs.len(), "Processing capture batch");
    jobs.par_iter()
        .map(|job| processor.process(&job.signals, job.fps))
        .collect()
}
