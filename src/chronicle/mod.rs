//! Life record ("chronicle") and the archive of past lives.

pub mod record;

pub use record::LifeRecord;

use serde::{Deserialize, Serialize};

/// The current life plus every archived one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chronicle {
    pub current: LifeRecord,
    pub past_lives: Vec<LifeRecord>,
}

impl Chronicle {
    pub fn new(now: i64) -> Self {
        Self {
            current: LifeRecord::new(now),
            past_lives: Vec::new(),
        }
    }

    /// Seals the current life and starts a fresh one.
    pub fn reincarnate(&mut self, now: i64) {
        let mut finished = std::mem::replace(&mut self.current, LifeRecord::new(now));
        finished.track_ascension(now);
        self.past_lives.push(finished);
    }

    /// Forgets everything, including past lives.
    pub fn hard_reset(&mut self, now: i64) {
        *self = Self::new(now);
    }

    pub fn lives_lived(&self) -> usize {
        self.past_lives.len() + 1
    }
}
