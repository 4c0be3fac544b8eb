use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::question::{AtomId, QuestionId};

/// An immutable record of one submitted answer. Attempts are append-only;
/// nothing in the core mutates an `Attempt` after creation.
///
/// `atom_ids` is a denormalized copy of the served question's atoms at
/// attempt time, so `AttemptRepo` can answer atom-scoped queries (the
/// Timing gate requirement in particular) without a join back through
/// `QuestionRepo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: String,
    pub question_id: QuestionId,
    pub user_id: String,
    pub answered_choice: String,
    pub is_correct: bool,
    pub time_spent_sec: f64,
    pub time_budget_sec: f64,
    pub was_guessed: bool,
    pub atom_ids: HashSet<AtomId>,
    pub created_at: DateTime<Utc>,
}

impl Attempt {
    pub fn was_overtime(&self) -> bool {
        self.time_spent_sec > self.time_budget_sec
    }

    pub fn time_ratio(&self) -> f64 {
        if self.time_budget_sec <= 0.0 {
            return 0.0;
        }
        self.time_spent_sec / self.time_budget_sec
    }
}
