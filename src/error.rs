//! Error types
//!
//! Only round start can fail. Sensor problems are not errors: the round
//! falls back to manual triggers.

use thiserror::Error;

/// Invalid input rejected when starting a round
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundError {
    #[error("cannot start a round with an empty word list")]
    EmptyWordList,
    #[error("round duration must be positive, got {0}s")]
    NonPositiveDuration(i64),
    #[error("countdown must be at least one second")]
    ZeroCountdown,
    #[error("feedback pause must be positive")]
    ZeroFeedback,
    #[error("invalid gesture config: {0}")]
    Gesture(#[from] GestureConfigError),
}

/// Gesture thresholds that cannot form neutral/trigger bands
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureConfigError {
    #[error("neutral half-width must be positive, got {0}")]
    NeutralWidth(f32),
    #[error("trigger threshold {trigger} must exceed neutral half-width {neutral}")]
    Overlap { neutral: f32, trigger: f32 },
    #[error("trigger threshold must be below 180, got {0}")]
    TriggerOutOfRange(f32),
}
