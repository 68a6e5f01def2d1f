//! Worker Tests
//!
//! The blocking-pool offload and rayon batch helpers must return exactly
//! what a direct pipeline call would.

use std::sync::Arc;

use rppg_engine::{
    analyze, process_batch, CaptureJob, Confidence, ProcessingError, PulseProcessor, RawSample,
    SyntheticCapture,
};

#[tokio::test]
async fn concurrent_analyses_match_sequential_results() {
    let processor = Arc::new(PulseProcessor::default());
    let captures: Vec<Vec<RawSample>> = (0..8_u64)
        .map(|seed| {
            SyntheticCapture::new()
                .bpm(60.0 + 10.0 * seed as f64)
                .noise(0.5, 0.5, 0.5)
                .seed(seed)
                .generate()
        })
        .collect();

    let expected: Vec<_> = captures
        .iter()
        .map(|signals| processor.process(signals, Some(10.0)))
        .collect();

    let handles: Vec<_> = captures
        .into_iter()
        .map(|signals| tokio::spawn(analyze(Arc::clone(&processor), signals, Some(10.0))))
        .collect();

    for (handle, want) in handles.into_iter().zip(expected) {
        let got = handle.await.expect("task join");
        assert_eq!(got, want);
    }
}

#[tokio::test]
async fn offloaded_call_reports_invalid_sampling_rate() {
    let processor = Arc::new(PulseProcessor::default());
    let signals = SyntheticCapture::new().generate();
    let err = analyze(processor, signals, Some(f64::NAN)).await.unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidSamplingRate(f) if f.is_nan()));
}

#[test]
fn batch_matches_individual_calls() {
    let processor = PulseProcessor::default();
    let jobs: Vec<CaptureJob> = [(72.0, 10.0), (95.0, 15.0), (130.0, 30.0)]
        .iter()
        .enumerate()
        .map(|(i, &(bpm, fps))| {
            let signals = SyntheticCapture::new()
                .bpm(bpm)
                .fps(fps)
                .samples((20.0 * fps) as usize)
                .seed(i as u64)
                .generate();
            CaptureJob::new(signals, Some(fps))
        })
        .collect();

    let batch = process_batch(&processor, &jobs);
    assert_eq!(batch.len(), jobs.len());
    for (job, outcome) in jobs.iter().zip(&batch) {
        assert_eq!(outcome, &processor.process(&job.signals, job.fps));
    }
}

#[test]
fn batch_mixes_errors_and_readings() {
    let processor = PulseProcessor::default();
    let flat: Vec<RawSample> = (0..50).map(|i| RawSample::new(120.0, 100.0, 80.0, i)).collect();
    let jobs = vec![
        CaptureJob::new(SyntheticCapture::new().samples(12).generate(), None),
        CaptureJob::new(flat, None),
        CaptureJob::new(SyntheticCapture::new().generate(), None),
    ];

    let batch = process_batch(&processor, &jobs);
    assert!(matches!(
        batch[0],
        Err(ProcessingError::InsufficientSamples {
            needed: 30,
            available: 12
        })
    ));

    let flat_result = batch[1].as_ref().expect("flat capture is a result");
    assert!(!flat_result.valid_reading);
    assert_eq!(flat_result.confidence, Confidence::Low);

    let pulse = batch[2].as_ref().expect("pulse capture");
    assert!(pulse.valid_reading);
}

#[test]
fn empty_batch_is_empty() {
    assert!(process_batch(&PulseProcessor::default(), &[]).is_empty());
}
