// src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub boundary: BoundaryConfig,
    pub guidance: GuidanceConfig,
    pub cues: CueConfig,
    pub language: String,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Gaussian kernel size applied to the HSV planes (odd).
    pub blur_kernel: usize,
    pub blur_sigma: f64,
    /// White paint band in OpenCV-style HSV (S,V in 0..=255).
    pub white_sat_max: u8,
    pub white_val_min: u8,
    /// Plain brightness cutoff on the grayscale plane.
    pub gray_threshold: u8,
    /// Minimum stripe blob area in px².
    pub min_stripe_area: u32,
    /// Stripes steeper than this are not crosswalk paint.
    pub max_stripe_angle_deg: f32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 15,
            blur_sigma: 6.0,
            white_sat_max: 80,
            white_val_min: 180,
            gray_threshold: 180,
            min_stripe_area: 2000,
            max_stripe_angle_deg: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceConfig {
    /// Detector coordinates are scaled by this factor into view space.
    pub detector_to_view_scale: f32,
    /// Width of the view the guidance is rendered into, in pixels.
    pub view_width: f32,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            detector_to_view_scale: 2.0,
            view_width: 640.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueConfig {
    pub flash_window_ms: u64,
    pub audio_stop_delay_ms: u64,
    pub audio_silence_timeout_ms: u64,
    pub slow_tempo: f32,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            flash_window_ms: 1000,
            audio_stop_delay_ms: 1000,
            audio_silence_timeout_ms: 3000,
            slow_tempo: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            boundary: BoundaryConfig::default(),
            guidance: GuidanceConfig::default(),
            cues: CueConfig::default(),
            language: "en".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

/// One already-rectified RGB frame (3 bytes per pixel, row-major).
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub timestamp_ms: f64,
}

/// Axis-aligned box in detector pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }
}

/// One labeled, confidence-scored box from the external object detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: &str, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            bbox,
        }
    }
}

/// Leftmost/rightmost x-extents of qualifying crosswalk-stripe contours.
///
/// The invalid sentinel keeps min at −∞ and max at +∞ so a missed
/// `valid` check can never satisfy either directional comparison
/// (nothing is left of −∞ or right of +∞).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryExtent {
    pub min_left: f32,
    pub max_right: f32,
    pub valid: bool,
}

impl BoundaryExtent {
    pub fn invalid() -> Self {
        Self {
            min_left: f32::NEG_INFINITY,
            max_right: f32::INFINITY,
            valid: false,
        }
    }
}

/// Semantic pedestrian-signal classification for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalState {
    None,
    CrosswalkOnly,
    Go,
    Stop,
    Countdown,
}

impl SignalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalState::None => "NONE",
            SignalState::CrosswalkOnly => "CROSSWALK_ONLY",
            SignalState::Go => "GO",
            SignalState::Stop => "STOP",
            SignalState::Countdown => "COUNTDOWN",
        }
    }

    /// GO and COUNTDOWN drive the same "walk now" cues.
    pub fn is_walk(&self) -> bool {
        matches!(self, SignalState::Go | SignalState::Countdown)
    }
}

/// Directional correction relative to the detected crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GuidanceDirection {
    Left,
    Right,
    Straight,
    None,
}

impl GuidanceDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuidanceDirection::Left => "LEFT",
            GuidanceDirection::Right => "RIGHT",
            GuidanceDirection::Straight => "STRAIGHT",
            GuidanceDirection::None => "NONE",
        }
    }
}
