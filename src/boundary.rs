// src/boundary.rs
//
// Crosswalk boundary extraction. Classical thresholding only: an HSV
// white-band mask ANDed with a plain brightness mask suppresses bright
// non-paint artifacts (sky, headlights), then stripe-shaped blobs in
// the bottom half of the frame vote on the left/right extents.

use crate::contours::{find_blobs, Rect};
use crate::types::{BoundaryConfig, BoundaryExtent, Frame};
use tracing::debug;

/// Convert one RGB pixel to OpenCV-style (S, V) with S,V in 0..=255.
/// Hue is left out on purpose: the white paint band does not constrain it.
#[inline]
fn rgb_to_sat_val(r: u8, g: u8, b: u8) -> (u8, u8) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    let s = if max == 0 {
        0
    } else {
        ((max - min) as u32 * 255 / max as u32) as u8
    };
    (s, v)
}

/// ITU-R BT.601 luma, the same weighting the RGBA→GRAY conversion uses.
#[inline]
fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f64> {
    let half = (size / 2) as i64;
    let mut kernel: Vec<f64> = (-half..=half)
        .map(|i| (-(i * i) as f64 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur of one u8 plane, clamping at the borders.
fn blur_plane(plane: &[u8], width: usize, height: usize, kernel: &[f64]) -> Vec<u8> {
    let half = (kernel.len() / 2) as i64;
    let mut horizontal = vec![0f64; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x as i64 + k as i64 - half).clamp(0, width as i64 - 1) as usize;
                acc += plane[y * width + sx] as f64 * weight;
            }
            horizontal[y * width + x] = acc;
        }
    }

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y as i64 + k as i64 - half).clamp(0, height as i64 - 1) as usize;
                acc += horizontal[sy * width + x] * weight;
            }
            out[y * width + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// A blob qualifies as crosswalk paint iff its vertical center sits in
/// the bottom half of the frame, its area clears the minimum, and its
/// aspect angle atan2(h, w) stays under the stripe limit.
pub(crate) fn stripe_qualifies(
    rect: Rect,
    area: u32,
    frame_height: usize,
    cfg: &BoundaryConfig,
) -> bool {
    let center_y = rect.y + rect.height / 2;
    if (center_y as usize) < frame_height / 2 {
        return false;
    }
    if area < cfg.min_stripe_area {
        return false;
    }
    let angle = (rect.height as f32).atan2(rect.width as f32).to_degrees();
    angle.abs() < cfg.max_stripe_angle_deg
}

/// Derive the crosswalk boundary extents for one frame.
///
/// Pure function of the frame; a frame with no qualifying stripe blobs
/// is the normal "no boundary" outcome, not an error.
pub fn extract(frame: &Frame, cfg: &BoundaryConfig) -> BoundaryExtent {
    let width = frame.width;
    let height = frame.height;
    debug_assert_eq!(frame.data.len(), width * height * 3);

    let mut sat = vec![0u8; width * height];
    let mut val = vec![0u8; width * height];
    let mut gray = vec![0u8; width * height];

    for i in 0..width * height {
        let r = frame.data[i * 3];
        let g = frame.data[i * 3 + 1];
        let b = frame.data[i * 3 + 2];
        let (s, v) = rgb_to_sat_val(r, g, b);
        sat[i] = s;
        val[i] = v;
        gray[i] = rgb_to_gray(r, g, b);
    }

    let kernel = gaussian_kernel(cfg.blur_kernel, cfg.blur_sigma);
    let sat = blur_plane(&sat, width, height, &kernel);
    let val = blur_plane(&val, width, height, &kernel);

    // White paint band AND raw brightness, so a washed-out but unsaturated
    // region must also be plainly bright to survive.
    let mut mask = vec![0u8; width * height];
    for i in 0..width * height {
        if sat[i] <= cfg.white_sat_max
            && val[i] >= cfg.white_val_min
            && gray[i] >= cfg.gray_threshold
        {
            mask[i] = 255;
        }
    }

    let blobs = find_blobs(&mask, width, height);

    let mut min_left = f32::INFINITY;
    let mut max_right = f32::NEG_INFINITY;
    let mut found = false;
    for blob in &blobs {
        if !stripe_qualifies(blob.rect, blob.area, height, cfg) {
            continue;
        }
        found = true;
        min_left = min_left.min(blob.rect.x as f32);
        max_right = max_right.max((blob.rect.x + blob.rect.width) as f32);
    }

    let extent = if found {
        BoundaryExtent {
            min_left,
            max_right,
            valid: true,
        }
    } else {
        BoundaryExtent::invalid()
    };

    debug!(
        "boundary: {} blob(s), extent valid={} min_left={:.0} max_right={:.0}",
        blobs.len(),
        extent.valid,
        extent.min_left,
        extent.max_right
    );

    extent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_stripe(
        width: usize,
        height: usize,
        x0: usize,
        y0: usize,
        w: usize,
        h: usize,
    ) -> Frame {
        // Dark asphalt background with a single white painted stripe.
        let mut data = vec![40u8; width * height * 3];
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                let i = (y * width + x) * 3;
                data[i] = 245;
                data[i + 1] = 245;
                data[i + 2] = 245;
            }
        }
        Frame {
            data,
            width,
            height,
            timestamp_ms: 0.0,
        }
    }

    #[test]
    fn test_wide_stripe_in_bottom_half_yields_extents() {
        let cfg = BoundaryConfig::default();
        // 300x60 stripe: 18000 px², angle atan2(60,300) ≈ 11.3°.
        let frame = frame_with_stripe(400, 240, 40, 160, 300, 60);
        let extent = extract(&frame, &cfg);
        assert!(extent.valid);
        // The blur erodes the thresholded edges a little, so allow slack.
        assert!(extent.min_left >= 30.0 && extent.min_left <= 60.0);
        assert!(extent.max_right >= 320.0 && extent.max_right <= 350.0);
    }

    #[test]
    fn test_stripe_in_top_half_is_rejected() {
        let cfg = BoundaryConfig::default();
        let frame = frame_with_stripe(400, 240, 40, 20, 300, 60);
        let extent = extract(&frame, &cfg);
        assert!(!extent.valid);
        assert_eq!(extent, BoundaryExtent::invalid());
    }

    #[test]
    fn test_dark_frame_has_invalid_extent() {
        let cfg = BoundaryConfig::default();
        let frame = Frame {
            data: vec![30u8; 400 * 240 * 3],
            width: 400,
            height: 240,
            timestamp_ms: 0.0,
        };
        assert!(!extract(&frame, &cfg).valid);
    }

    #[test]
    fn test_area_threshold_flips_at_2000() {
        let cfg = BoundaryConfig::default();
        let rect = Rect {
            x: 10,
            y: 200,
            width: 200,
            height: 10,
        };
        assert!(!stripe_qualifies(rect, 1999, 240, &cfg));
        assert!(stripe_qualifies(rect, 2000, 240, &cfg));
    }

    #[test]
    fn test_angle_threshold_flips_at_15_degrees() {
        let cfg = BoundaryConfig::default();
        // atan2(80, 300) ≈ 14.93° — qualifies.
        let shallow = Rect {
            x: 0,
            y: 180,
            width: 300,
            height: 80,
        };
        assert!(stripe_qualifies(shallow, 10_000, 240, &cfg));

        // atan2(81, 300) ≈ 15.1° — rejected.
        let steep = Rect {
            x: 0,
            y: 180,
            width: 300,
            height: 81,
        };
        assert!(!stripe_qualifies(steep, 10_000, 240, &cfg));
    }

    #[test]
    fn test_bottom_half_rule_uses_blob_center() {
        let cfg = BoundaryConfig::default();
        // Top edge above the midline but center at y=125 ≥ 120: qualifies.
        let straddling = Rect {
            x: 0,
            y: 100,
            width: 300,
            height: 50,
        };
        assert!(stripe_qualifies(straddling, 10_000, 240, &cfg));

        let above = Rect {
            x: 0,
            y: 60,
            width: 300,
            height: 50,
        };
        assert!(!stripe_qualifies(above, 10_000, 240, &cfg));
    }

    #[test]
    fn test_two_stripes_vote_on_joint_extents() {
        let cfg = BoundaryConfig::default();
        let mut frame = frame_with_stripe(600, 240, 30, 150, 200, 50);
        // Second stripe further right.
        for y in 150..200 {
            for x in 350..560 {
                let i = (y * 600 + x) * 3;
                frame.data[i] = 245;
                frame.data[i + 1] = 245;
                frame.data[i + 2] = 245;
            }
        }
        let extent = extract(&frame, &cfg);
        assert!(extent.valid);
        assert!(extent.min_left < 70.0);
        assert!(extent.max_right > 520.0);
    }
}
