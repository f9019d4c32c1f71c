//! Tilt gesture debouncing
//!
//! Turns a noisy stream of tilt angles into at most one trigger per physical
//! gesture. The angle space is split into bands around the device's resting
//! angle:
//!
//! ```text
//!   -180 .. -trigger | dead | -neutral .. +neutral | dead | +trigger .. 180
//!      negative          neutral (re-arms)              positive
//! ```
//!
//! A trigger fires only while armed and only after the cooldown since the
//! previous trigger has elapsed. Firing disarms; re-arming requires a sample
//! inside the neutral band.

use serde::{Deserialize, Serialize};

use crate::angle_delta;
use crate::consts::*;
use crate::error::GestureConfigError;
use crate::platform::TiltSample;
use crate::round::{Outcome, TriggerEvent};

/// Band thresholds. Values are empirical and device-dependent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Resting angle when the device is upright against the forehead (degrees)
    pub neutral_angle: f32,
    /// Half-width of the neutral band (degrees)
    pub neutral_half_width: f32,
    /// Distance from neutral at which a trigger band starts (degrees)
    pub trigger_threshold: f32,
    /// Minimum time between two gesture triggers (ms)
    pub cooldown_ms: u64,
    /// Outcome for tilting toward positive angles
    pub positive_outcome: Outcome,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            neutral_angle: 0.0,
            neutral_half_width: DEFAULT_NEUTRAL_HALF_WIDTH,
            trigger_threshold: DEFAULT_TRIGGER_THRESHOLD,
            cooldown_ms: DEFAULT_GESTURE_COOLDOWN_MS,
            positive_outcome: Outcome::Correct,
        }
    }
}

impl GestureConfig {
    /// Bands must be disjoint and fit inside a half turn
    pub fn validate(&self) -> Result<(), GestureConfigError> {
        if !(self.neutral_half_width > 0.0) {
            return Err(GestureConfigError::NeutralWidth(self.neutral_half_width));
        }
        if !(self.trigger_threshold > self.neutral_half_width) {
            return Err(GestureConfigError::Overlap {
                neutral: self.neutral_half_width,
                trigger: self.trigger_threshold,
            });
        }
        if !(self.trigger_threshold < 180.0) {
            return Err(GestureConfigError::TriggerOutOfRange(self.trigger_threshold));
        }
        Ok(())
    }

    /// Which band an absolute angle falls into
    pub fn classify(&self, angle: f32) -> Zone {
        let delta = angle_delta(self.neutral_angle, angle);
        if delta.abs() <= self.neutral_half_width {
            Zone::Neutral
        } else if delta >= self.trigger_threshold {
            Zone::Trigger(self.positive_outcome)
        } else if delta <= -self.trigger_threshold {
            Zone::Trigger(self.positive_outcome.opposite())
        } else {
            Zone::Dead
        }
    }
}

/// Angle band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Upright; re-arms detection
    Neutral,
    /// Between neutral and a trigger band; changes nothing
    Dead,
    Trigger(Outcome),
}

/// Debouncer memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureState {
    pub armed: bool,
    /// Timestamp (ms) of the last gesture trigger
    pub last_trigger_at: Option<u64>,
}

/// Armed/Disarmed hysteresis over tilt samples
#[derive(Debug, Clone)]
pub struct GestureDebouncer {
    config: GestureConfig,
    state: GestureState,
}

impl GestureDebouncer {
    /// Starts disarmed: a device already tilted must pass neutral first
    pub fn new(config: GestureConfig) -> Result<Self, GestureConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: GestureState::default(),
        })
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state.armed
    }

    /// Feed one sample; returns a trigger at most once per gesture
    pub fn observe(&mut self, sample: &TiltSample) -> Option<TriggerEvent> {
        match self.config.classify(sample.angle) {
            Zone::Neutral => {
                if !self.state.armed {
                    log::trace!("gesture re-armed at {:.1}°", sample.angle);
                }
                self.state.armed = true;
                None
            }
            Zone::Dead => None,
            Zone::Trigger(outcome) => {
                if !self.state.armed || !self.cooled_down(sample.timestamp_ms) {
                    return None;
                }
                self.state.armed = false;
                self.state.last_trigger_at = Some(sample.timestamp_ms);
                log::debug!("gesture trigger {} at {:.1}°", outcome.as_str(), sample.angle);
                Some(TriggerEvent { outcome })
            }
        }
    }

    /// Tap fallback; bypasses the angle state machine entirely
    pub fn force_trigger(&self, outcome: Outcome) -> TriggerEvent {
        TriggerEvent { outcome }
    }

    fn cooled_down(&self, now_ms: u64) -> bool {
        self.state
            .last_trigger_at
            .is_none_or(|at| now_ms.saturating_sub(at) >= self.config.cooldown_ms)
    }
}
