// src/direction.rs
//
// Resolves the directional guidance decision from detector boxes, frame
// geometry, and the crosswalk boundary extents. Stateless: one value per
// frame, last-detection-wins across the iteration (the same overwrite
// policy the signal classifier applies to its light flags).

use crate::types::{BoundaryExtent, Detection, GuidanceDirection};

/// Per-frame resolution. `NoCrossing` is a distinguished notice for the
/// empty-detections case, not a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Direction(GuidanceDirection),
    NoCrossing,
}

/// Resolve one frame.
///
/// `box_center_x` is the detector-space box center scaled into view
/// space; it is compared against the view center, while the frame center
/// is compared against the boundary extents. Invalid extents keep the
/// ±∞ sentinel, so both directional clauses collapse to false and the
/// decision falls through to STRAIGHT.
pub fn resolve(
    detections: &[Detection],
    extent: &BoundaryExtent,
    frame_width: f32,
    view_width: f32,
    detector_to_view_scale: f32,
) -> Resolution {
    if detections.is_empty() {
        return Resolution::NoCrossing;
    }

    let view_center_x = view_width / 2.0;
    let frame_center_x = frame_width / 2.0;

    let mut direction = GuidanceDirection::Straight;
    for detection in detections {
        let box_center_x = detection.bbox.center_x() * detector_to_view_scale;

        direction = if box_center_x < view_center_x && frame_center_x > extent.max_right {
            GuidanceDirection::Left
        } else if box_center_x > view_center_x && frame_center_x < extent.min_left {
            GuidanceDirection::Right
        } else {
            GuidanceDirection::Straight
        };
    }

    Resolution::Direction(direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn det_at(left: f32, right: f32) -> Detection {
        Detection::new("crossing", 0.9, BoundingBox::new(left, 10.0, right, 60.0))
    }

    fn valid_extent(min_left: f32, max_right: f32) -> BoundaryExtent {
        BoundaryExtent {
            min_left,
            max_right,
            valid: true,
        }
    }

    #[test]
    fn test_empty_detections_is_no_crossing() {
        let extent = valid_extent(5.0, 90.0);
        assert_eq!(
            resolve(&[], &extent, 100.0, 100.0, 1.0),
            Resolution::NoCrossing
        );
    }

    #[test]
    fn test_box_left_of_view_with_boundary_left_of_center() {
        // Box center 20 < view center 50; frame center 50 > max_right 40.
        let extent = valid_extent(5.0, 40.0);
        let r = resolve(&[det_at(10.0, 30.0)], &extent, 100.0, 100.0, 1.0);
        assert_eq!(r, Resolution::Direction(GuidanceDirection::Left));
    }

    #[test]
    fn test_box_right_of_view_with_boundary_right_of_center() {
        // Box center 80 > view center 50; frame center 50 < min_left 60.
        let extent = valid_extent(60.0, 95.0);
        let r = resolve(&[det_at(70.0, 90.0)], &extent, 100.0, 100.0, 1.0);
        assert_eq!(r, Resolution::Direction(GuidanceDirection::Right));
    }

    #[test]
    fn test_centered_box_is_straight() {
        let extent = valid_extent(5.0, 90.0);
        let r = resolve(&[det_at(40.0, 60.0)], &extent, 100.0, 100.0, 1.0);
        assert_eq!(r, Resolution::Direction(GuidanceDirection::Straight));
    }

    #[test]
    fn test_invalid_extent_collapses_to_straight() {
        // Same geometry as the LEFT case, but no boundary this frame.
        let extent = BoundaryExtent::invalid();
        let r = resolve(&[det_at(10.0, 30.0)], &extent, 100.0, 100.0, 1.0);
        assert_eq!(r, Resolution::Direction(GuidanceDirection::Straight));
    }

    #[test]
    fn test_last_detection_wins() {
        let extent = valid_extent(5.0, 40.0);
        // First box would say LEFT, the centered one iterated last wins.
        let r = resolve(
            &[det_at(10.0, 30.0), det_at(40.0, 60.0)],
            &extent,
            100.0,
            100.0,
            1.0,
        );
        assert_eq!(r, Resolution::Direction(GuidanceDirection::Straight));
    }

    #[test]
    fn test_detector_scale_moves_box_into_view_space() {
        // Detector center 20 scaled by 2 = 40 < view center 50 → LEFT.
        let extent = valid_extent(5.0, 40.0);
        let r = resolve(&[det_at(10.0, 30.0)], &extent, 100.0, 100.0, 2.0);
        assert_eq!(r, Resolution::Direction(GuidanceDirection::Left));

        // Scaled by 4 = 80 > 50, and frame center 50 is not < min_left 5.
        let r = resolve(&[det_at(10.0, 30.0)], &extent, 100.0, 100.0, 4.0);
        assert_eq!(r, Resolution::Direction(GuidanceDirection::Straight));
    }
}
