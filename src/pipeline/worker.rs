// src/pipeline/worker.rs
//
// Frame pipeline wiring. Acquisition pushes frames through a keep-latest
// feed (a stale frame is superseded, never queued); one worker runs the
// detector and the boundary extractor with a single frame in flight; the
// arbiter lives on its own task as the single owner of all channel
// state, fed through a bounded channel with non-blocking dispatch so the
// frame path can never stall on cue work.

use crate::arbiter::{CueArbiter, CueUpdate, FrameAnalysis};
use crate::boundary;
use crate::classifier;
use crate::detector::Detector;
use crate::direction;
use crate::pipeline::metrics::GuidanceMetrics;
use crate::types::{Config, Frame};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Producer half of the keep-latest frame feed. Dropping it shuts the
/// pipeline down and force-stops every cue channel.
pub struct FrameFeed {
    tx: watch::Sender<Option<Arc<Frame>>>,
    metrics: GuidanceMetrics,
}

impl FrameFeed {
    /// Hand the latest frame to the pipeline, superseding any frame the
    /// worker has not picked up yet.
    pub fn submit(&self, frame: Frame) {
        self.metrics.inc(&self.metrics.frames_submitted);
        self.tx.send_replace(Some(Arc::new(frame)));
    }
}

/// Consumer half, created together with a `FrameFeed`.
pub struct FrameStream {
    rx: watch::Receiver<Option<Arc<Frame>>>,
}

pub fn frame_feed(metrics: GuidanceMetrics) -> (FrameFeed, FrameStream) {
    let (tx, rx) = watch::channel(None);
    (FrameFeed { tx, metrics }, FrameStream { rx })
}

/// Running pipeline tasks plus the stream of per-frame cue decisions.
pub struct PipelineHandle {
    pub updates: mpsc::UnboundedReceiver<CueUpdate>,
    worker: JoinHandle<()>,
    arbiter_task: JoinHandle<CueArbiter>,
}

impl PipelineHandle {
    /// Wait for both tasks to wind down; returns the arbiter after its
    /// shutdown has force-stopped all four channels.
    pub async fn join(self) -> anyhow::Result<CueArbiter> {
        self.worker.await?;
        let arbiter = self.arbiter_task.await?;
        Ok(arbiter)
    }
}

/// Spawn the analysis worker and the arbiter owner task.
pub fn spawn(
    mut stream: FrameStream,
    mut detector: Box<dyn Detector>,
    mut arbiter: CueArbiter,
    config: Config,
    metrics: GuidanceMetrics,
) -> PipelineHandle {
    let (analysis_tx, mut analysis_rx) = mpsc::channel::<FrameAnalysis>(1);
    let (update_tx, update_rx) = mpsc::unbounded_channel::<CueUpdate>();

    let worker_metrics = metrics.clone();
    let worker = tokio::spawn(async move {
        let mut frame_id: u64 = 0;

        while stream.rx.changed().await.is_ok() {
            let frame = match stream.rx.borrow_and_update().clone() {
                Some(frame) => frame,
                None => continue,
            };
            frame_id += 1;
            worker_metrics.inc(&worker_metrics.frames_processed);

            let t_detect = Instant::now();
            let output = match detector.detect(&frame) {
                Ok(output) => output,
                Err(e) => {
                    error!("detector failed on frame {}: {}", frame_id, e);
                    continue;
                }
            };
            worker_metrics.set_timing(
                &worker_metrics.detect_time_us,
                t_detect.elapsed().as_micros() as u64,
            );

            let t_boundary = Instant::now();
            let extent = boundary::extract(&frame, &config.boundary);
            worker_metrics.set_timing(
                &worker_metrics.boundary_time_us,
                t_boundary.elapsed().as_micros() as u64,
            );

            if !output.detections.is_empty() {
                worker_metrics.inc(&worker_metrics.frames_with_detections);
            }
            if extent.valid {
                worker_metrics.inc(&worker_metrics.frames_with_boundary);
            }

            let flags = classifier::classify(&output.detections);
            let resolution = direction::resolve(
                &output.detections,
                &extent,
                output.frame_width as f32,
                config.guidance.view_width,
                config.guidance.detector_to_view_scale,
            );

            let analysis = FrameAnalysis {
                frame_id,
                timestamp_ms: frame.timestamp_ms,
                flags,
                signal: flags.state(),
                resolution,
                extent,
            };

            // Fire-and-forget dispatch: the frame path never waits on
            // cue work, a busy arbiter just sees the next analysis.
            if analysis_tx.try_send(analysis).is_err() {
                worker_metrics.inc(&worker_metrics.analyses_dropped);
                debug!("arbiter busy, analysis for frame {} dropped", frame_id);
            }
        }

        info!("frame feed closed, analysis worker exiting");
    });

    let arbiter_task = tokio::spawn(async move {
        while let Some(analysis) = analysis_rx.recv().await {
            let update = arbiter.evaluate(&analysis, Instant::now());
            let _ = update_tx.send(update);
        }
        // Session teardown is synchronous with task exit: no timers or
        // utterances survive the pipeline.
        arbiter.shutdown();
        arbiter
    });

    PipelineHandle {
        updates: update_rx,
        worker,
        arbiter_task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::ScriptedDetector;
    use crate::drivers::{NullAudio, NullHaptic, NullSpeech, NullVisual, StaticSettings};
    use crate::strings::MessageCatalog;
    use crate::types::{BoundingBox, Detection, GuidanceDirection, SignalState};
    use std::sync::atomic::Ordering;

    fn null_arbiter() -> CueArbiter {
        CueArbiter::new(
            Default::default(),
            MessageCatalog::english(),
            Box::new(NullVisual),
            Box::new(NullAudio),
            Box::new(NullHaptic),
            Box::new(NullSpeech),
            Box::new(StaticSettings::all_enabled()),
        )
    }

    fn dark_frame() -> Frame {
        Frame {
            data: vec![30u8; 64 * 48 * 3],
            width: 64,
            height: 48,
            timestamp_ms: 0.0,
        }
    }

    #[tokio::test]
    async fn test_keep_latest_supersedes_stale_frames() {
        let metrics = GuidanceMetrics::new();
        let (feed, stream) = frame_feed(metrics.clone());

        // Three frames land before the worker starts: only the latest
        // may be processed.
        feed.submit(dark_frame());
        feed.submit(dark_frame());
        feed.submit(dark_frame());

        let detector = Box::new(ScriptedDetector::new(vec![]));
        let handle = spawn(
            stream,
            detector,
            null_arbiter(),
            Config::default(),
            metrics.clone(),
        );
        drop(feed);
        handle.join().await.unwrap();

        assert_eq!(metrics.frames_submitted.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.frames_processed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.frames_superseded(), 2);
    }

    #[tokio::test]
    async fn test_pipeline_emits_cue_updates() {
        let metrics = GuidanceMetrics::new();
        let (feed, stream) = frame_feed(metrics.clone());

        let script = vec![vec![
            Detection::new("crossing", 0.9, BoundingBox::new(10.0, 10.0, 60.0, 60.0)),
            Detection::new("go", 0.9, BoundingBox::new(10.0, 10.0, 60.0, 60.0)),
        ]];
        let detector = Box::new(ScriptedDetector::new(script));

        feed.submit(dark_frame());
        let mut handle = spawn(
            stream,
            detector,
            null_arbiter(),
            Config::default(),
            metrics,
        );
        drop(feed);

        let update = handle.updates.recv().await.expect("one update");
        assert_eq!(update.signal, SignalState::Go);
        assert_eq!(update.direction, GuidanceDirection::Straight);

        handle.join().await.unwrap();
    }
}
