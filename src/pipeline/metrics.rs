// src/pipeline/metrics.rs
//
// Counters and stage timings for the guidance pipeline, shared across
// tasks. Export via logs at session end.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct GuidanceMetrics {
    pub frames_submitted: Arc<AtomicU64>,
    pub frames_processed: Arc<AtomicU64>,
    pub frames_with_detections: Arc<AtomicU64>,
    pub frames_with_boundary: Arc<AtomicU64>,
    pub analyses_dropped: Arc<AtomicU64>,
    pub detect_time_us: Arc<AtomicU64>,
    pub boundary_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl GuidanceMetrics {
    pub fn new() -> Self {
        Self {
            frames_submitted: Arc::new(AtomicU64::new(0)),
            frames_processed: Arc::new(AtomicU64::new(0)),
            frames_with_detections: Arc::new(AtomicU64::new(0)),
            frames_with_boundary: Arc::new(AtomicU64::new(0)),
            analyses_dropped: Arc::new(AtomicU64::new(0)),
            detect_time_us: Arc::new(AtomicU64::new(0)),
            boundary_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_timing(&self, counter: &AtomicU64, duration_us: u64) {
        counter.store(duration_us, Ordering::Relaxed);
    }

    /// Frames superseded before the worker picked them up.
    pub fn frames_superseded(&self) -> u64 {
        let submitted = self.frames_submitted.load(Ordering::Relaxed);
        let processed = self.frames_processed.load(Ordering::Relaxed);
        submitted.saturating_sub(processed)
    }

    pub fn fps(&self) -> f64 {
        let frames = self.frames_processed.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frames_submitted: self.frames_submitted.load(Ordering::Relaxed),
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_superseded: self.frames_superseded(),
            frames_with_detections: self.frames_with_detections.load(Ordering::Relaxed),
            frames_with_boundary: self.frames_with_boundary.load(Ordering::Relaxed),
            analyses_dropped: self.analyses_dropped.load(Ordering::Relaxed),
            last_detect_time_us: self.detect_time_us.load(Ordering::Relaxed),
            last_boundary_time_us: self.boundary_time_us.load(Ordering::Relaxed),
            fps: self.fps(),
        }
    }
}

impl Default for GuidanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub frames_submitted: u64,
    pub frames_processed: u64,
    pub frames_superseded: u64,
    pub frames_with_detections: u64,
    pub frames_with_boundary: u64,
    pub analyses_dropped: u64,
    pub last_detect_time_us: u64,
    pub last_boundary_time_us: u64,
    pub fps: f64,
}
