// src/arbiter.rs
//
// CUE ARBITRATION STATE MACHINE
//
// Consumes one fused frame analysis per tick and drives the four alert
// channels through their driver contracts. All hysteresis lives in the
// AlertSession owned here: flash expiry, deferred audio stop, haptic
// pattern edge-triggering, speech dedup. The arbiter must be mutated by
// a single owner (see pipeline::worker) because the channel states wrap
// non-reentrant resources.

use crate::classifier::SignalFlags;
use crate::direction::Resolution;
use crate::drivers::{
    AudioDriver, CueSettings, FlashColor, HapticDriver, LabelColor, SpeechDriver, VisualDriver,
    KEY_SOUND_CUE, KEY_VIBRATION_CUE, KEY_VISUAL_CUE, KEY_VOICE_CUE,
};
use crate::strings::MessageCatalog;
use crate::types::{BoundaryExtent, CueConfig, GuidanceDirection, SignalState};
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ============================================================================
// HAPTIC PATTERNS (milliseconds, repeating)
// ============================================================================
pub const GO_PATTERN: [u64; 5] = [0, 150, 150, 150, 150];
pub const STOP_PATTERN: [u64; 5] = [0, 1200, 300, 1200, 300];

pub const NORMAL_TEMPO: f32 = 1.0;

/// Everything the frame worker hands the arbiter for one frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub frame_id: u64,
    pub timestamp_ms: f64,
    pub flags: SignalFlags,
    pub signal: SignalState,
    pub resolution: Resolution,
    pub extent: BoundaryExtent,
}

/// Distinguished non-directional outcomes surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NoCrossing,
}

/// What the arbiter decided this frame, for logging and overlays.
#[derive(Debug, Clone)]
pub struct CueUpdate {
    pub signal: SignalState,
    pub direction: GuidanceDirection,
    pub label: String,
    pub notice: Option<Notice>,
}

// ============================================================================
// CHANNEL STATES
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct VisualState {
    pub active_color: Option<FlashColor>,
    pub expiry: Option<Instant>,
}

#[derive(Debug, Clone, Copy)]
pub struct AudioState {
    pub is_playing: bool,
    pub tempo_factor: f32,
    pub pending_stop_at: Option<Instant>,
    pub last_qualifying_at: Option<Instant>,
}

impl Default for AudioState {
    fn default() -> Self {
        Self {
            is_playing: false,
            tempo_factor: NORMAL_TEMPO,
            pending_stop_at: None,
            last_qualifying_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPattern {
    None,
    Go,
    Stop,
}

#[derive(Debug, Clone, Copy)]
pub struct HapticState {
    pub current_pattern: HapticPattern,
    pub cancelled: bool,
}

impl Default for HapticState {
    fn default() -> Self {
        Self {
            current_pattern: HapticPattern::None,
            cancelled: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpeechState {
    pub last_spoken: Option<String>,
    /// One-slot mailbox drained on utterance completion.
    pub pending: Option<String>,
}

/// The only mutable long-lived entity in the core. Created with the
/// arbiter when guidance activates, force-stopped on shutdown.
#[derive(Debug, Clone, Default)]
pub struct AlertSession {
    pub visual: VisualState,
    pub audio: AudioState,
    pub haptic: HapticState,
    pub speech: SpeechState,
}

// ============================================================================
// ARBITER
// ============================================================================

pub struct CueArbiter {
    session: AlertSession,
    cfg: CueConfig,
    catalog: MessageCatalog,
    visual: Box<dyn VisualDriver>,
    audio: Box<dyn AudioDriver>,
    haptic: Box<dyn HapticDriver>,
    speech: Box<dyn SpeechDriver>,
    settings: Box<dyn CueSettings>,
}

impl CueArbiter {
    pub fn new(
        cfg: CueConfig,
        catalog: MessageCatalog,
        visual: Box<dyn VisualDriver>,
        audio: Box<dyn AudioDriver>,
        haptic: Box<dyn HapticDriver>,
        speech: Box<dyn SpeechDriver>,
        settings: Box<dyn CueSettings>,
    ) -> Self {
        Self {
            session: AlertSession::default(),
            cfg,
            catalog,
            visual,
            audio,
            haptic,
            speech,
            settings,
        }
    }

    pub fn session(&self) -> &AlertSession {
        &self.session
    }

    /// Evaluate one frame. Single entry point for all channel mutation;
    /// `now` is injected so timing behaviour stays deterministic in tests.
    pub fn evaluate(&mut self, analysis: &FrameAnalysis, now: Instant) -> CueUpdate {
        let flags = analysis.flags;
        let signal = analysis.signal;

        let visual_on = self.settings.get_bool(KEY_VISUAL_CUE, true);
        let sound_on = self.settings.get_bool(KEY_SOUND_CUE, true);
        let voice_on = self.settings.get_bool(KEY_VOICE_CUE, true);
        let vibration_on = self.settings.get_bool(KEY_VIBRATION_CUE, true);

        // Crossing evidence fuses both analyses: a crosswalk-sign
        // detection or visible stripe paint counts as being at a crossing.
        let at_crossing = flags.crossing || analysis.extent.valid;
        let walk_qualifies = at_crossing && flags.walk();
        let stop_qualifies = at_crossing && flags.stop;

        let (direction, no_detections) = match analysis.resolution {
            Resolution::Direction(d) => (d, false),
            Resolution::NoCrossing => (GuidanceDirection::None, true),
        };

        let message = self.guidance_message(signal, direction, no_detections);

        let notice = if no_detections && visual_on {
            Some(Notice::NoCrossing)
        } else {
            None
        };

        self.update_visual(signal, &message, no_detections, visual_on, now);
        self.update_audio(walk_qualifies, stop_qualifies, flags, sound_on, now);
        self.update_haptic(walk_qualifies, stop_qualifies, no_detections, vibration_on);
        self.update_speech(&message, voice_on);

        if let Some(notice) = notice {
            debug!("frame {}: {}", analysis.frame_id, self.notice_text(notice));
        }

        debug!(
            "frame {}: signal={} direction={} walk_q={} stop_q={}",
            analysis.frame_id,
            signal.as_str(),
            direction.as_str(),
            walk_qualifies,
            stop_qualifies
        );

        CueUpdate {
            signal,
            direction,
            label: message,
            notice,
        }
    }

    /// Localized text for a non-directional notice.
    pub fn notice_text(&self, notice: Notice) -> &'static str {
        match notice {
            Notice::NoCrossing => self.catalog.no_crossing,
        }
    }

    fn guidance_message(
        &self,
        signal: SignalState,
        direction: GuidanceDirection,
        no_detections: bool,
    ) -> String {
        if no_detections {
            return String::new();
        }
        let direction_msg = self.catalog.direction(direction);
        match signal {
            SignalState::Stop => self.catalog.stop.to_string(),
            SignalState::Go | SignalState::Countdown => {
                if direction_msg.is_empty() {
                    self.catalog.go.to_string()
                } else {
                    format!("{}. {}", self.catalog.go, direction_msg)
                }
            }
            _ => direction_msg.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Visual: retriggerable flash window + guidance label.
    // ------------------------------------------------------------------
    fn update_visual(
        &mut self,
        signal: SignalState,
        message: &str,
        no_detections: bool,
        enabled: bool,
        now: Instant,
    ) {
        if !enabled {
            return;
        }

        let flash_color = if signal.is_walk() {
            Some(FlashColor::Green)
        } else if signal == SignalState::Stop {
            Some(FlashColor::Red)
        } else {
            None
        };

        if let Some(color) = flash_color {
            // Re-flashing resets the expiry rather than stacking windows.
            self.visual.flash(color, self.cfg.flash_window_ms);
            self.session.visual.active_color = Some(color);
            self.session.visual.expiry =
                Some(now + Duration::from_millis(self.cfg.flash_window_ms));
        } else if let Some(expiry) = self.session.visual.expiry {
            if now >= expiry {
                self.session.visual.active_color = None;
                self.session.visual.expiry = None;
            }
        }

        if no_detections {
            self.visual.set_label("", LabelColor::Neutral);
        } else if !message.is_empty() {
            let label_color = match signal {
                SignalState::Go | SignalState::Countdown => LabelColor::Green,
                SignalState::Stop => LabelColor::Red,
                _ => LabelColor::Neutral,
            };
            self.visual.set_label(message, label_color);
        }
    }

    // ------------------------------------------------------------------
    // Audio: tempo selection, deferred-stop debounce, silence timeout.
    // ------------------------------------------------------------------
    fn update_audio(
        &mut self,
        walk_qualifies: bool,
        stop_qualifies: bool,
        flags: SignalFlags,
        enabled: bool,
        now: Instant,
    ) {
        if enabled {
            if walk_qualifies && !self.audio.is_playing() {
                self.audio.start_loop(NORMAL_TEMPO);
                self.session.audio.is_playing = true;
                self.session.audio.tempo_factor = NORMAL_TEMPO;
            } else if stop_qualifies
                && (!self.audio.is_playing()
                    || self.session.audio.tempo_factor != self.cfg.slow_tempo)
            {
                self.audio.start_loop(self.cfg.slow_tempo);
                self.session.audio.is_playing = true;
                self.session.audio.tempo_factor = self.cfg.slow_tempo;
            }

            if walk_qualifies || stop_qualifies {
                // Cancel-and-repost: only the most recent timer fires.
                self.audio.schedule_stop(self.cfg.audio_stop_delay_ms);
                self.session.audio.pending_stop_at =
                    Some(now + Duration::from_millis(self.cfg.audio_stop_delay_ms));
                self.session.audio.last_qualifying_at = Some(now);
            }
        }

        // Track the last frame any walk/stop light was seen, independent
        // of the crossing conjunct or the sound toggle.
        if flags.walk() || flags.stop {
            self.session.audio.last_qualifying_at = Some(now);
        }

        // Continuous-silence force stop runs even with the toggle off so
        // a tone can never outlive its signal.
        if self.audio.is_playing() {
            if let Some(last) = self.session.audio.last_qualifying_at {
                if now.duration_since(last)
                    >= Duration::from_millis(self.cfg.audio_silence_timeout_ms)
                {
                    info!(
                        "🔇 no walk/stop signal for {}ms, stopping tone",
                        self.cfg.audio_silence_timeout_ms
                    );
                    self.audio.stop_now();
                    self.session.audio.is_playing = false;
                    self.session.audio.pending_stop_at = None;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Haptic: edge-triggered pattern switches, force-cancel otherwise.
    // ------------------------------------------------------------------
    fn update_haptic(
        &mut self,
        walk_qualifies: bool,
        stop_qualifies: bool,
        no_detections: bool,
        enabled: bool,
    ) {
        if !enabled || no_detections {
            self.force_cancel_haptic();
            return;
        }

        let state = &mut self.session.haptic;
        if walk_qualifies
            && (state.current_pattern != HapticPattern::Go || state.cancelled)
        {
            self.haptic.vibrate(&GO_PATTERN, true);
            state.current_pattern = HapticPattern::Go;
            state.cancelled = false;
        } else if stop_qualifies
            && (state.current_pattern != HapticPattern::Stop || state.cancelled)
        {
            self.haptic.vibrate(&STOP_PATTERN, true);
            state.current_pattern = HapticPattern::Stop;
            state.cancelled = false;
        }
    }

    fn force_cancel_haptic(&mut self) {
        let state = &mut self.session.haptic;
        if state.current_pattern != HapticPattern::None || !state.cancelled {
            self.haptic.cancel();
        }
        state.current_pattern = HapticPattern::None;
        state.cancelled = true;
    }

    // ------------------------------------------------------------------
    // Speech: dedup against the last utterance while one is in flight.
    // ------------------------------------------------------------------
    fn update_speech(&mut self, message: &str, enabled: bool) {
        if !enabled || message.is_empty() {
            return;
        }

        let differs = self.session.speech.last_spoken.as_deref() != Some(message);
        if differs || !self.speech.is_speaking() {
            self.speech.speak(message, true);
            self.session.speech.last_spoken = Some(message.to_string());
        }
    }

    /// Completion signal from the speech backend; drains the one-slot
    /// mailbox if an announcement was parked behind the utterance.
    pub fn on_speech_complete(&mut self) {
        if let Some(pending) = self.session.speech.pending.take() {
            if self.settings.get_bool(KEY_VOICE_CUE, true) && !self.speech.is_speaking() {
                self.speech.speak(&pending, true);
                self.session.speech.last_spoken = Some(pending);
            }
        }
    }

    /// Park an out-of-band announcement ("guidance started", battery
    /// warnings, ...) behind any in-flight utterance instead of
    /// interrupting guidance speech.
    pub fn queue_announcement(&mut self, text: &str) {
        if self.speech.is_speaking() {
            self.session.speech.pending = Some(text.to_string());
        } else if self.settings.get_bool(KEY_VOICE_CUE, true) {
            self.speech.speak(text, false);
            self.session.speech.last_spoken = Some(text.to_string());
        }
    }

    /// Synchronously force-stop every channel. Called when the guidance
    /// session deactivates; leaves no timers or in-flight utterances.
    pub fn shutdown(&mut self) {
        self.audio.stop_now();
        self.session.audio = AudioState::default();

        self.haptic.cancel();
        self.session.haptic = HapticState::default();

        self.speech.stop();
        self.session.speech = SpeechState::default();

        self.visual.set_label("", LabelColor::Neutral);
        self.session.visual = VisualState::default();

        info!("alert session shut down, all channels stopped");
    }
}

// ============================================================================
// TESTS
// ============================================================================
