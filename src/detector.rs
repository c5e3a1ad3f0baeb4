// src/detector.rs
//
// Output contract of the external object detector. The trained model
// itself lives outside this crate; the pipeline only depends on this
// trait, and a detector that cannot be constructed at startup is a
// fatal initialization error for the caller, not a per-frame one.

use crate::types::{Detection, Frame};
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct DetectorOutput {
    pub detections: Vec<Detection>,
    pub frame_width: u32,
    pub frame_height: u32,
}

pub trait Detector: Send {
    /// Run inference on one frame. An empty detection list is the normal
    /// "nothing found" signal; errors are logged and the frame skipped.
    fn detect(&mut self, frame: &Frame) -> Result<DetectorOutput>;
}

/// Replays a fixed per-frame script; the demo binary and pipeline tests
/// stand in for the real model with this.
pub struct ScriptedDetector {
    script: Vec<Vec<Detection>>,
    cursor: usize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Vec<Detection>>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, frame: &Frame) -> Result<DetectorOutput> {
        let detections = self
            .script
            .get(self.cursor)
            .cloned()
            .unwrap_or_default();
        self.cursor += 1;
        Ok(DetectorOutput {
            detections,
            frame_width: frame.width as u32,
            frame_height: frame.height as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    #[test]
    fn test_scripted_detector_replays_then_runs_dry() {
        let det = Detection::new("crossing", 0.9, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        let mut detector = ScriptedDetector::new(vec![vec![det], vec![]]);
        let frame = Frame {
            data: vec![0; 12],
            width: 2,
            height: 2,
            timestamp_ms: 0.0,
        };

        assert_eq!(detector.detect(&frame).unwrap().detections.len(), 1);
        assert!(detector.detect(&frame).unwrap().detections.is_empty());
        // Past the end of the script: empty forever.
        assert!(detector.detect(&frame).unwrap().detections.is_empty());
    }
}
