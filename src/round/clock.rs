//! Round clock
//!
//! Counts the round down one second at a time. The controller starts it on
//! entering Active and pauses it during Feedback; the clock itself knows
//! nothing about round phases.

use crate::consts::MS_PER_SECOND;

/// Emitted by the clock as time passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One second elapsed, seconds remaining
    Tick(u32),
    /// Remaining hit zero. Emitted exactly once.
    TimeExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundClock {
    remaining: u32,
    /// Milliseconds accumulated toward the next tick
    partial_ms: u32,
    running: bool,
    expired: bool,
}

impl RoundClock {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            remaining: duration_secs,
            partial_ms: 0,
            running: false,
            expired: duration_secs == 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn start(&mut self) {
        if !self.expired {
            self.running = true;
        }
    }

    /// Freeze time; the partial second is kept
    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.start();
    }

    /// Stop for good (round ended or exited)
    pub fn stop(&mut self) {
        self.running = false;
        self.expired = true;
    }

    /// Advance by `ms` of elapsed time.
    ///
    /// No-op while paused or after expiry. Stops itself after `TimeExpired`.
    pub fn advance(&mut self, ms: u32) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if !self.running || self.expired {
            return events;
        }

        let mut budget = u64::from(self.partial_ms) + u64::from(ms);
        while budget >= u64::from(MS_PER_SECOND) {
            budget -= u64::from(MS_PER_SECOND);
            self.remaining = self.remaining.saturating_sub(1);
            events.push(ClockEvent::Tick(self.remaining));
            if self.remaining == 0 {
                events.push(ClockEvent::TimeExpired);
                self.running = false;
                self.expired = true;
                budget = 0;
                break;
            }
        }
        // budget < MS_PER_SECOND here
        self.partial_ms = budget as u32;
        events
    }
}
