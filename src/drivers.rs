// src/drivers.rs
//
// Channel driver contracts. The arbiter only ever talks to these traits;
// real hardware backends (overlay view, tone generator, actuator, TTS)
// live outside this crate. Every call is fire-and-forget from the
// arbiter's perspective and must not block the frame path.
//
// A missing backend is non-fatal: plug in the matching Null driver and
// that channel becomes a no-op while the others keep running.

use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashColor {
    Green,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelColor {
    Green,
    Red,
    Neutral,
}

pub trait VisualDriver: Send {
    fn flash(&mut self, color: FlashColor, duration_ms: u64);
    fn set_label(&mut self, text: &str, color: LabelColor);
}

pub trait AudioDriver: Send {
    fn start_loop(&mut self, tempo_factor: f32);
    /// Schedule a deferred stop; a repeated call cancels the previously
    /// pending one and reschedules (only the most recent timer fires).
    fn schedule_stop(&mut self, delay_ms: u64);
    fn stop_now(&mut self);
    fn is_playing(&self) -> bool;
}

pub trait HapticDriver: Send {
    fn vibrate(&mut self, pattern: &[u64], repeat: bool);
    fn cancel(&mut self);
}

pub trait SpeechDriver: Send {
    /// `interrupt` flushes any in-flight utterance. Completion is
    /// signalled asynchronously back to `CueArbiter::on_speech_complete`.
    fn speak(&mut self, text: &str, interrupt: bool);
    fn is_speaking(&self) -> bool;
    fn stop(&mut self);
}

/// Settings contract: four boolean cue toggles read each frame.
pub trait CueSettings: Send {
    fn get_bool(&self, key: &str, default: bool) -> bool;
}

pub const KEY_VISUAL_CUE: &str = "visualCue";
pub const KEY_SOUND_CUE: &str = "soundCue";
pub const KEY_VOICE_CUE: &str = "voiceCue";
pub const KEY_VIBRATION_CUE: &str = "vibrationCue";

/// Fixed in-memory settings; also the test double.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    values: HashMap<String, bool>,
}

impl StaticSettings {
    pub fn all_enabled() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: bool) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

impl CueSettings for StaticSettings {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).copied().unwrap_or(default)
    }
}

// ============================================================================
// NULL DRIVERS (absent hardware)
// ============================================================================

pub struct NullVisual;
pub struct NullAudio;
pub struct NullHaptic;
pub struct NullSpeech;

impl VisualDriver for NullVisual {
    fn flash(&mut self, _color: FlashColor, _duration_ms: u64) {}
    fn set_label(&mut self, _text: &str, _color: LabelColor) {}
}

impl AudioDriver for NullAudio {
    fn start_loop(&mut self, _tempo_factor: f32) {}
    fn schedule_stop(&mut self, _delay_ms: u64) {}
    fn stop_now(&mut self) {}
    fn is_playing(&self) -> bool {
        false
    }
}

impl HapticDriver for NullHaptic {
    fn vibrate(&mut self, _pattern: &[u64], _repeat: bool) {}
    fn cancel(&mut self) {}
}

impl SpeechDriver for NullSpeech {
    fn speak(&mut self, _text: &str, _interrupt: bool) {}
    fn is_speaking(&self) -> bool {
        false
    }
    fn stop(&mut self) {}
}

// ============================================================================
// LOG DRIVERS (demo binary)
// ============================================================================

pub struct LogVisual;
pub struct LogAudio {
    playing: bool,
}
pub struct LogHaptic;
pub struct LogSpeech;

impl LogAudio {
    pub fn new() -> Self {
        Self { playing: false }
    }
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualDriver for LogVisual {
    fn flash(&mut self, color: FlashColor, duration_ms: u64) {
        info!("🖥️  visual: flash {:?} for {}ms", color, duration_ms);
    }
    fn set_label(&mut self, text: &str, color: LabelColor) {
        if text.is_empty() {
            info!("🖥️  visual: label cleared");
        } else {
            info!("🖥️  visual: label \"{}\" ({:?})", text, color);
        }
    }
}

impl AudioDriver for LogAudio {
    fn start_loop(&mut self, tempo_factor: f32) {
        self.playing = true;
        info!("🔊 audio: loop at tempo {:.1}", tempo_factor);
    }
    fn schedule_stop(&mut self, delay_ms: u64) {
        info!("🔊 audio: stop rescheduled in {}ms", delay_ms);
    }
    fn stop_now(&mut self) {
        self.playing = false;
        info!("🔊 audio: stopped");
    }
    fn is_playing(&self) -> bool {
        self.playing
    }
}

impl HapticDriver for LogHaptic {
    fn vibrate(&mut self, pattern: &[u64], repeat: bool) {
        info!("📳 haptic: vibrate {:?} repeat={}", pattern, repeat);
    }
    fn cancel(&mut self) {
        info!("📳 haptic: cancelled");
    }
}

impl SpeechDriver for LogSpeech {
    fn speak(&mut self, text: &str, interrupt: bool) {
        info!("🗣️  speech: \"{}\" (interrupt={})", text, interrupt);
    }
    fn is_speaking(&self) -> bool {
        false
    }
    fn stop(&mut self) {
        info!("🗣️  speech: stopped");
    }
}
