//! Round state and core types
//!
//! The `Round` is owned exclusively by the controller. Everything here is
//! plain data; transitions live in `controller.rs`.

use serde::{Deserialize, Serialize};

/// What a trigger decided about the current word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Skip,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Correct => "correct",
            Outcome::Skip => "skip",
        }
    }

    /// The other outcome
    pub fn opposite(self) -> Self {
        match self {
            Outcome::Correct => Outcome::Skip,
            Outcome::Skip => Outcome::Correct,
        }
    }
}

/// A discrete Correct/Skip decision, from a gesture or a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub outcome: Outcome,
}

/// Current phase of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Pre-round delay, seconds left
    Countdown(u32),
    /// Word on screen, waiting for a trigger
    Active,
    /// Post-trigger flash. Triggers are ignored and round time is frozen.
    Feedback { outcome: Outcome, word: String },
    /// Terminal. The final partition is `Round::result()`, also delivered
    /// once as `RoundNotice::Finished`.
    Ended,
}

impl RoundState {
    pub fn is_ended(&self) -> bool {
        matches!(self, RoundState::Ended)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoundState::Countdown(_) => "countdown",
            RoundState::Active => "active",
            RoundState::Feedback { .. } => "feedback",
            RoundState::Ended => "ended",
        }
    }
}

/// Final partition of the played words
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub correct: Vec<String>,
    pub skipped: Vec<String>,
}

impl RoundResult {
    /// Final score (one point per guessed word)
    pub fn score(&self) -> usize {
        self.correct.len()
    }
}

/// One timed play-through of a word list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    words: Vec<String>,
    cursor: usize,
    /// Round length (seconds)
    pub duration: u32,
    /// Seconds left on the round clock
    pub remaining: u32,
    correct: Vec<String>,
    skipped: Vec<String>,
    pub state: RoundState,
}

impl Round {
    /// Caller guarantees `words` is non-empty and `duration > 0`
    pub(crate) fn new(words: Vec<String>, duration: u32, countdown: u32) -> Self {
        Self {
            words,
            cursor: 0,
            duration,
            remaining: duration,
            correct: Vec::new(),
            skipped: Vec::new(),
            state: RoundState::Countdown(countdown),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn correct(&self) -> &[String] {
        &self.correct
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Word under the cursor, if any are left
    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.cursor).map(String::as_str)
    }

    /// True once every word has been scored
    pub fn exhausted(&self) -> bool {
        self.cursor >= self.words.len()
    }

    /// Score the current word and advance the cursor.
    ///
    /// Keeps `correct.len() + skipped.len() == cursor`. Returns the scored
    /// word, or `None` if the list is already exhausted.
    pub(crate) fn score_current(&mut self, outcome: Outcome) -> Option<String> {
        let word = self.words.get(self.cursor)?.clone();
        match outcome {
            Outcome::Correct => self.correct.push(word.clone()),
            Outcome::Skip => self.skipped.push(word.clone()),
        }
        self.cursor += 1;
        Some(word)
    }

    pub fn result(&self) -> RoundResult {
        RoundResult {
            correct: self.correct.clone(),
            skipped: self.skipped.clone(),
        }
    }

    /// `len(correct) + len(skipped) == cursor <= len(words)`
    pub fn invariant_holds(&self) -> bool {
        self.correct.len() + self.skipped.len() == self.cursor && self.cursor <= self.words.len()
    }
}
