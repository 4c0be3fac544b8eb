use serde::{Deserialize, Serialize};

use super::question::AtomId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    Learning,
    Reviewing,
    Mastered,
}

/// Size of the trailing window used for `recent_accuracy` and streak
/// detection. Fixed at 10 per §9 ("Grinding window... The specification
/// fixes N=10 for all purposes").
pub const RECENT_WINDOW: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomMastery {
    pub user_id: String,
    pub atom_id: AtomId,
    pub attempts_total: u32,
    pub attempts_correct: u32,
    /// Oldest-first, capped at `RECENT_WINDOW`.
    pub recent_attempts: Vec<bool>,
    pub mastery_level: MasteryLevel,
}

impl AtomMastery {
    pub fn new(user_id: impl Into<String>, atom_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            atom_id: atom_id.into(),
            attempts_total: 0,
            attempts_correct: 0,
            recent_attempts: Vec::new(),
            mastery_level: MasteryLevel::Learning,
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.attempts_total == 0 {
            return 0.0;
        }
        self.attempts_correct as f64 / self.attempts_total as f64
    }

    pub fn recent_accuracy(&self) -> f64 {
        if self.recent_attempts.is_empty() {
            return 0.0;
        }
        let correct = self.recent_attempts.iter().filter(|c| **c).count();
        correct as f64 / self.recent_attempts.len() as f64
    }

    /// Longest trailing run of `true` at the end of `recent_attempts`.
    pub fn current_streak(&self) -> u32 {
        self.recent_attempts
            .iter()
            .rev()
            .take_while(|c| **c)
            .count() as u32
    }

    /// Records one attempt outcome, updating totals, the recent window, and
    /// `mastery_level`. Returns the mastery level transition, if any.
    pub fn record_attempt(&mut self, correct: bool) -> Option<MasteryLevel> {
        let previous = self.mastery_level;

        self.attempts_total += 1;
        if correct {
            self.attempts_correct += 1;
        }
        self.recent_attempts.push(correct);
        if self.recent_attempts.len() > RECENT_WINDOW {
            self.recent_attempts.remove(0);
        }

        self.mastery_level = self.derive_mastery_level();
        if self.mastery_level != previous {
            Some(self.mastery_level)
        } else {
            None
        }
    }

    /// `mastered` requires the same bar as the default mastery gate
    /// (accuracy ≥ 0.80, volume ≥ 5, streak ≥ 3); `reviewing` is any atom
    /// with attempts that hasn't cleared that bar; `learning` is untouched.
    fn derive_mastery_level(&self) -> MasteryLevel {
        if self.attempts_total == 0 {
            return MasteryLevel::Learning;
        }
        let mastered = self.accuracy() >= 0.80
            && self.attempts_total >= 5
            && self.current_streak() >= 3;
        if mastered {
            MasteryLevel::Mastered
        } else {
            MasteryLevel::Reviewing
        }
    }
}
