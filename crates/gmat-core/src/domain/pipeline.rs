use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::mode::Mode;
use super::outcome::OutcomeType;
use super::question::QuestionId;
use super::rating::ScopeKey;

#[derive(Debug, Clone)]
pub struct AttemptInput {
    pub user_id: String,
    pub question_id: QuestionId,
    pub answered_choice: String,
    pub time_spent_sec: f64,
    /// Client-provided hint; defaults to `false` at the API boundary.
    pub was_guessed: bool,
    /// The serving mode the question was presented under — needed for the
    /// XP engine's prove-like multiplier (§4.6). Not part of §3's Attempt
    /// data model (which is persisted); this only travels with the
    /// in-flight submission.
    pub mode: Mode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingDelta {
    pub scope: ScopeKey,
    pub previous_rating: i32,
    pub new_rating: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassedGate {
    pub gate_id: String,
    pub xp_awarded: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    pub is_correct: bool,
    pub correct_answer: String,
    pub outcome_type: OutcomeType,
    pub rating_deltas_by_scope: Vec<RatingDelta>,
    pub xp_awarded: u32,
    pub new_level: Option<u32>,
    pub passed_gates: Vec<PassedGate>,
    pub new_review_dates: HashMap<String, NaiveDate>,
}
