//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Jobs (outcomes, failing stage, duration, concurrency)
//! - Renditions (encode time, produced tiers, uploaded objects)
//! - Rollback of partially uploaded output

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Jobs
// =============================================================================

/// Transcode jobs total by result.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ladder_jobs_total", "Total transcode jobs"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Failed jobs by the stage they stopped at.
pub static JOB_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ladder_job_failures_total", "Failed transcode jobs by stage"),
        &["stage"], // "download", "probe", "encode", "upload", "no-output"
    )
    .unwrap()
});

/// Job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("ladder_job_duration_seconds", "Duration of transcode jobs").buckets(
            vec![5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0, 3600.0],
        ),
        &["result"],
    )
    .unwrap()
});

/// Jobs currently running.
pub static JOBS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("ladder_jobs_active", "Transcode jobs currently running").unwrap()
});

// =============================================================================
// Renditions
// =============================================================================

/// Renditions produced and uploaded, by tier.
pub static RENDITIONS_PRODUCED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ladder_renditions_produced_total", "Renditions produced"),
        &["rendition"],
    )
    .unwrap()
});

/// Encode duration in seconds, by tier.
pub static ENCODE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("ladder_encode_duration_seconds", "Duration of rendition encodes")
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 900.0, 1800.0]),
        &["rendition"],
    )
    .unwrap()
});

/// Objects written to the destination store.
pub static OBJECTS_UPLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("ladder_objects_uploaded_total", "Objects uploaded to destination").unwrap()
});

/// Source download duration in seconds.
pub static DOWNLOAD_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("ladder_download_duration_seconds", "Duration of source downloads")
            .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0]),
    )
    .unwrap()
});

// =============================================================================
// Rollback
// =============================================================================

/// Uploaded objects removed after a failed or cancelled job, by result.
pub static ROLLBACK_OBJECTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ladder_rollback_objects_total",
            "Objects deleted while rolling back failed jobs",
        ),
        &["result"], // "deleted", "failed"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Jobs
        Box::new(JOBS_TOTAL.clone()),
        Box::new(JOB_FAILURES.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(JOBS_ACTIVE.clone()),
        // Renditions
        Box::new(RENDITIONS_PRODUCED.clone()),
        Box::new(ENCODE_DURATION.clone()),
        Box::new(OBJECTS_UPLOADED.clone()),
        Box::new(DOWNLOAD_DURATION.clone()),
        // Rollback
        Box::new(ROLLBACK_OBJECTS.clone()),
    ]
}
