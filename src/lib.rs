// src/lib.rs
//
// Crosswalk guidance engine. Fuses pedestrian-signal detections with
// classical crosswalk-stripe geometry and arbitrates four alert
// channels (visual, audio, haptic, speech) under a per-frame budget.

pub mod arbiter;
pub mod boundary;
pub mod classifier;
pub mod config;
pub mod contours;
pub mod detector;
pub mod direction;
pub mod drivers;
pub mod pipeline;
pub mod strings;
pub mod types;

pub use arbiter::{AlertSession, CueArbiter, CueUpdate, FrameAnalysis, Notice};
pub use classifier::SignalFlags;
pub use detector::{Detector, DetectorOutput, ScriptedDetector};
pub use direction::Resolution;
pub use pipeline::{GuidanceMetrics, PipelineHandle};
pub use types::{
    BoundaryExtent, BoundingBox, Config, Detection, Frame, GuidanceDirection, SignalState,
};
