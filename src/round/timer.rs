//! One-shot millisecond delay
//!
//! Owned by the controller as `Option<Timer>`; cancelling is dropping it.

/// A pending delay driven by elapsed time, not wall clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    remaining_ms: u32,
}

impl Timer {
    pub fn new(ms: u32) -> Self {
        Self { remaining_ms: ms }
    }

    pub fn remaining_ms(&self) -> u32 {
        self.remaining_ms
    }

    /// Consume up to `ms` of elapsed time.
    ///
    /// Returns the milliseconds left over after the timer fired, or `None`
    /// if it is still pending.
    pub fn advance(&mut self, ms: u32) -> Option<u32> {
        if ms >= self.remaining_ms {
            let leftover = ms - self.remaining_ms;
            self.remaining_ms = 0;
            Some(leftover)
        } else {
            self.remaining_ms -= ms;
            None
        }
    }
}
