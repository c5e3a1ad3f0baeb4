// src/pipeline/mod.rs

pub mod metrics;
pub mod worker;

pub use metrics::{GuidanceMetrics, MetricsSummary};
pub use worker::{frame_feed, spawn, FrameFeed, FrameStream, PipelineHandle};
