//! Frente - a heads-up style party word-guessing game
//!
//! Core modules:
//! - `round`: Deterministic round engine (countdown, play, feedback, end)
//! - `gesture`: Tilt debouncing into discrete Correct/Skip triggers
//! - `platform`: Orientation sensor access and browser glue
//! - `deck`: Word list helpers (seeded shuffling)
//! - `settings`: Player preferences and engine tuning

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod deck;
pub mod error;
pub mod gesture;
pub mod platform;
pub mod round;
pub mod settings;

pub use error::{GestureConfigError, RoundError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default round length (seconds)
    pub const DEFAULT_ROUND_SECS: i64 = 60;
    /// Pre-round countdown ("put it on your forehead!")
    pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;
    /// Feedback flash after each trigger (ms). Round time is frozen meanwhile.
    pub const DEFAULT_FEEDBACK_MS: u32 = 800;

    /// Gesture defaults (degrees, relative to the neutral resting angle)
    pub const DEFAULT_NEUTRAL_HALF_WIDTH: f32 = 30.0;
    pub const DEFAULT_TRIGGER_THRESHOLD: f32 = 45.0;
    /// Minimum spacing between two gesture triggers (ms)
    pub const DEFAULT_GESTURE_COOLDOWN_MS: u64 = 1000;

    /// Milliseconds per round clock tick
    pub const MS_PER_SECOND: u32 = 1000;
}

/// Normalize an angle in degrees to [-180, 180)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can land exactly on 360 for tiny negative inputs
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Signed shortest rotation from `from` to `to`, in degrees [-180, 180)
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_degrees(to - from)
}

/// Format seconds as `m:ss` for the round timer
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
