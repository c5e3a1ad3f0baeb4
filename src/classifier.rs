// src/classifier.rs
//
// Maps raw detector output for a frame into a semantic signal state.
//
// The `crossing` flag OR-accumulates across the frame, while
// `go`/`countdown`/`stop` are overwritten by the last detection in
// iteration order. That asymmetry matches the field-observed behaviour
// this classifier was tuned against and is kept deliberately; see
// DESIGN.md before "fixing" it.

use crate::types::{Detection, SignalState};

const TOKEN_CROSSING: &str = "crossing";
const TOKEN_GO: &str = "go";
const TOKEN_COUNTDOWN: &str = "count-blank";
const TOKEN_STOP: &str = "stop";

/// Raw per-label flags for one frame, consumed by the cue arbiter and
/// the direction resolver alongside the derived `SignalState`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalFlags {
    pub crossing: bool,
    pub go: bool,
    pub countdown: bool,
    pub stop: bool,
}

impl SignalFlags {
    /// "Walk now" condition shared by the audio and haptic channels.
    pub fn walk(&self) -> bool {
        self.go || self.countdown
    }

    pub fn state(&self) -> SignalState {
        if self.stop {
            SignalState::Stop
        } else if self.go {
            SignalState::Go
        } else if self.countdown {
            SignalState::Countdown
        } else if self.crossing {
            SignalState::CrosswalkOnly
        } else {
            SignalState::None
        }
    }
}

/// Classify one frame's detections. Pure function; an empty list is the
/// normal "nothing found" outcome and yields all-false flags.
pub fn classify(detections: &[Detection]) -> SignalFlags {
    let mut flags = SignalFlags::default();

    for detection in detections {
        let label = detection.label.as_str();
        if label.contains(TOKEN_CROSSING) {
            flags.crossing = true;
        }
        flags.go = label.contains(TOKEN_GO);
        flags.countdown = label.contains(TOKEN_COUNTDOWN);
        flags.stop = label.contains(TOKEN_STOP);
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn det(label: &str) -> Detection {
        Detection::new(label, 0.9, BoundingBox::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn test_empty_detections_are_none() {
        let flags = classify(&[]);
        assert_eq!(flags, SignalFlags::default());
        assert_eq!(flags.state(), SignalState::None);
    }

    #[test]
    fn test_later_detection_overwrites_light_flags() {
        let flags = classify(&[det("go"), det("crossing")]);
        // "go" flag was overwritten by the later "crossing" detection.
        assert!(!flags.go);
        assert!(flags.crossing);
        assert_eq!(flags.state(), SignalState::CrosswalkOnly);

        let flags = classify(&[det("crossing"), det("stop")]);
        assert!(flags.stop);
        assert_eq!(flags.state(), SignalState::Stop);
    }

    #[test]
    fn test_crossing_accumulates_but_lights_overwrite() {
        // crossing seen first survives; go set by the last detection.
        let flags = classify(&[det("crossing"), det("go")]);
        assert!(flags.crossing);
        assert!(flags.go);
        assert_eq!(flags.state(), SignalState::Go);

        // Reversed order: crossing still sticks, go does not.
        let flags = classify(&[det("go"), det("crossing")]);
        assert!(flags.crossing);
        assert!(!flags.go);
    }

    #[test]
    fn test_countdown_label_sets_both_walk_paths() {
        // "go-count-blank" contains both tokens; go takes precedence.
        let flags = classify(&[det("go-count-blank")]);
        assert!(flags.go);
        assert!(flags.countdown);
        assert!(flags.walk());
        assert_eq!(flags.state(), SignalState::Go);
    }

    #[test]
    fn test_countdown_alone() {
        let flags = classify(&[det("count-blank")]);
        assert!(!flags.go);
        assert!(flags.countdown);
        assert_eq!(flags.state(), SignalState::Countdown);
    }

    #[test]
    fn test_stop_has_priority_in_state_derivation() {
        // A single label carrying both tokens resolves to STOP.
        let flags = SignalFlags {
            crossing: true,
            go: true,
            countdown: false,
            stop: true,
        };
        assert_eq!(flags.state(), SignalState::Stop);
    }
}
