// src/main.rs

use anyhow::Result;
use crossight::arbiter::CueArbiter;
use crossight::detector::ScriptedDetector;
use crossight::drivers::{LogAudio, LogHaptic, LogSpeech, LogVisual, StaticSettings};
use crossight::pipeline::{frame_feed, spawn, GuidanceMetrics};
use crossight::strings::MessageCatalog;
use crossight::types::{BoundingBox, Config, Detection, Frame};
use std::time::Duration;
use tracing::{info, warn};

/// Paint a synthetic street frame: dark asphalt with one white crosswalk
/// stripe in the bottom half, offset so the direction resolver has
/// something to chew on.
fn synthetic_frame(width: usize, height: usize, stripe_left: usize, timestamp_ms: f64) -> Frame {
    let mut data = vec![40u8; width * height * 3];
    let stripe_top = height * 3 / 4;
    let stripe_bottom = (stripe_top + height / 10).min(height);
    let stripe_right = (stripe_left + width / 3).min(width);
    for y in stripe_top..stripe_bottom {
        for x in stripe_left..stripe_right {
            let i = (y * width + x) * 3;
            data[i] = 250;
            data[i + 1] = 250;
            data[i + 2] = 250;
        }
    }
    Frame {
        data,
        width,
        height,
        timestamp_ms,
    }
}

/// A short scripted crossing: approach with a walk signal, the signal
/// turns to stop, then the crossing leaves the field of view.
fn demo_script() -> Vec<Vec<Detection>> {
    let signal_box = BoundingBox::new(40.0, 20.0, 90.0, 80.0);
    let walk = vec![
        Detection::new("crossing", 0.94, BoundingBox::new(20.0, 120.0, 300.0, 230.0)),
        Detection::new("go", 0.88, signal_box),
    ];
    let countdown = vec![
        Detection::new("crossing", 0.92, BoundingBox::new(20.0, 120.0, 300.0, 230.0)),
        Detection::new("count-blank", 0.81, signal_box),
    ];
    let halt = vec![
        Detection::new("crossing", 0.93, BoundingBox::new(20.0, 120.0, 300.0, 230.0)),
        Detection::new("stop", 0.90, signal_box),
    ];
    let mut script = Vec::new();
    for _ in 0..8 {
        script.push(walk.clone());
    }
    for _ in 0..4 {
        script.push(countdown.clone());
    }
    for _ in 0..8 {
        script.push(halt.clone());
    }
    for _ in 0..4 {
        script.push(Vec::new());
    }
    script
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("crossight=info")
        .init();

    info!("🚦 Crosswalk Guidance System Starting");

    let config = match Config::load("config.yaml") {
        Ok(config) => {
            info!("✓ Configuration loaded");
            config
        }
        Err(e) => {
            warn!("config.yaml not usable ({}), falling back to defaults", e);
            Config::default()
        }
    };
    info!(
        "Boundary thresholds: min_area={}, max_angle={:.1}°, gray={}",
        config.boundary.min_stripe_area,
        config.boundary.max_stripe_angle_deg,
        config.boundary.gray_threshold
    );

    let catalog = MessageCatalog::for_language(&config.language);
    let arbiter = CueArbiter::new(
        config.cues.clone(),
        catalog,
        Box::new(LogVisual),
        Box::new(LogAudio::new()),
        Box::new(LogHaptic),
        Box::new(LogSpeech),
        Box::new(StaticSettings::all_enabled()),
    );
    info!("✓ Cue arbiter ready");

    let metrics = GuidanceMetrics::new();
    let (feed, stream) = frame_feed(metrics.clone());
    let detector = Box::new(ScriptedDetector::new(demo_script()));
    let mut handle = spawn(stream, detector, arbiter, config, metrics.clone());

    let feeder = tokio::spawn(async move {
        let width = 640;
        let height = 480;
        for i in 0..24u64 {
            // Drift the stripe rightward so the guidance flips from
            // "adjust left" territory toward straight ahead.
            let stripe_left = 40 + (i as usize * 8);
            feed.submit(synthetic_frame(width, height, stripe_left, i as f64 * 33.0));
            tokio::time::sleep(Duration::from_millis(33)).await;
        }
        drop(feed);
    });

    while let Some(update) = handle.updates.recv().await {
        info!(
            "frame cue: signal={} direction={} label={:?}",
            update.signal.as_str(),
            update.direction.as_str(),
            update.label
        );
    }

    feeder.await?;
    handle.join().await?;

    let summary = metrics.summary();
    info!(
        "Session summary: {}",
        serde_json::to_string_pretty(&summary)?
    );
    info!("✓ Shutdown complete");

    Ok(())
}
