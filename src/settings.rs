//! Game settings and preferences
//!
//! Persisted in LocalStorage on the web; defaults everywhere else.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::gesture::GestureConfig;
use crate::platform::DeviceHold;
use crate::round::{Outcome, RoundConfig};

/// Round length presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoundLength {
    Short,
    #[default]
    Standard,
    Long,
}

impl RoundLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundLength::Short => "Short",
            RoundLength::Standard => "Standard",
            RoundLength::Long => "Long",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "short" => Some(RoundLength::Short),
            "standard" | "std" => Some(RoundLength::Standard),
            "long" => Some(RoundLength::Long),
            _ => None,
        }
    }

    /// Round duration (seconds)
    pub fn seconds(&self) -> i64 {
        match self {
            RoundLength::Short => 30,
            RoundLength::Standard => DEFAULT_ROUND_SECS,
            RoundLength::Long => 90,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Round length preset
    pub round_length: RoundLength,
    /// Pre-round countdown (seconds)
    pub countdown_secs: u32,
    /// Feedback flash after each word (ms)
    pub feedback_ms: u32,

    // === Sensors ===
    /// How the phone sits on the forehead
    pub hold: DeviceHold,
    /// Tilting forward (toward the floor) means "correct"
    pub tilt_down_is_correct: bool,
    /// Neutral band half-width (degrees)
    pub neutral_half_width: f32,
    /// Trigger threshold (degrees from neutral)
    pub trigger_threshold: f32,
    /// Minimum time between tilt triggers (ms)
    pub gesture_cooldown_ms: u64,

    // === Feedback ===
    /// Vibrate on correct/skip
    pub haptics: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Mute all sounds
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            round_length: RoundLength::Standard,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            feedback_ms: DEFAULT_FEEDBACK_MS,

            hold: DeviceHold::Landscape,
            tilt_down_is_correct: true,
            neutral_half_width: DEFAULT_NEUTRAL_HALF_WIDTH,
            trigger_threshold: DEFAULT_TRIGGER_THRESHOLD,
            gesture_cooldown_ms: DEFAULT_GESTURE_COOLDOWN_MS,

            haptics: true,
            master_volume: 0.8,
            muted: false,
        }
    }
}

impl Settings {
    /// Round duration (seconds)
    pub fn round_secs(&self) -> i64 {
        self.round_length.seconds()
    }

    /// Gesture bands for the current hold.
    ///
    /// Upright against the forehead, portrait reads beta near 90°, landscape
    /// reads gamma near 0°. Tilting down increases the reading in both.
    pub fn gesture_config(&self) -> GestureConfig {
        let neutral_angle = match self.hold {
            DeviceHold::Portrait => 90.0,
            DeviceHold::Landscape => 0.0,
        };
        let positive_outcome = if self.tilt_down_is_correct {
            Outcome::Correct
        } else {
            Outcome::Skip
        };
        GestureConfig {
            neutral_angle,
            neutral_half_width: self.neutral_half_width,
            trigger_threshold: self.trigger_threshold,
            cooldown_ms: self.gesture_cooldown_ms,
            positive_outcome,
        }
    }

    pub fn round_config(&self) -> RoundConfig {
        RoundConfig {
            countdown_secs: self.countdown_secs,
            feedback_ms: self.feedback_ms,
            gesture: self.gesture_config(),
            hold: self.hold,
        }
    }

    /// Effective volume (respects mute)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "frente_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
