//! Display projection
//!
//! Rendering data only; nothing here feeds back into control flow.

use super::state::{Outcome, Round, RoundState};
use crate::format_clock;
use crate::platform::SensorStatus;

/// Snapshot sent to the presentation layer on every change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundView {
    pub state: RoundState,
    /// Word to show (Active, or the word being flashed during Feedback)
    pub current_word: Option<String>,
    /// Seconds left on the round clock
    pub remaining: u32,
    pub correct_count: usize,
    pub skipped_count: usize,
    pub sensor: SensorStatus,
}

impl RoundView {
    pub fn project(round: &Round, sensor: SensorStatus) -> Self {
        let current_word = match &round.state {
            RoundState::Active => round.current_word().map(str::to_owned),
            RoundState::Feedback { word, .. } => Some(word.clone()),
            RoundState::Countdown(_) | RoundState::Ended => None,
        };
        Self {
            state: round.state.clone(),
            current_word,
            remaining: round.remaining,
            correct_count: round.correct().len(),
            skipped_count: round.skipped().len(),
            sensor,
        }
    }

    /// Seconds left in the pre-round countdown
    pub fn countdown(&self) -> Option<u32> {
        match self.state {
            RoundState::Countdown(n) => Some(n),
            _ => None,
        }
    }

    /// Outcome being flashed, if any
    pub fn feedback(&self) -> Option<Outcome> {
        match self.state {
            RoundState::Feedback { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Timer text, `m:ss`
    pub fn clock_text(&self) -> String {
        format_clock(self.remaining)
    }

    /// Show the "enable sensors" button: countdown only, and only if unasked
    pub fn offer_sensor_prompt(&self) -> bool {
        self.countdown().is_some() && self.sensor == SensorStatus::Unknown
    }
}
