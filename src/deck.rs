//! Word decks
//!
//! A deck is just a titled word list. Rounds play words in the order given,
//! so decks are shuffled here before a round starts.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::RoundError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub title: String,
    pub words: Vec<String>,
}

impl Deck {
    /// Blank entries are dropped; a deck with no words is rejected
    pub fn new(title: impl Into<String>, words: Vec<String>) -> Result<Self, RoundError> {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Err(RoundError::EmptyWordList);
        }
        Ok(Self {
            title: title.into(),
            words,
        })
    }

    /// Words in a seeded random order
    pub fn shuffled(&self, seed: u64) -> Vec<String> {
        shuffle_words(&self.words, seed)
    }
}

/// Shuffle a word list reproducibly
pub fn shuffle_words(words: &[String], seed: u64) -> Vec<String> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut shuffled = words.to_vec();
    shuffled.shuffle(&mut rng);
    shuffled
}
