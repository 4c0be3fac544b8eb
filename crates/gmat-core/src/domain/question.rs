use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type AtomId = String;
pub type QuestionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Seeded,
    AiGenerated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub section_code: String,
    pub topic_code: String,
    pub question_type_code: String,
    pub difficulty_rating: i32,
    pub times_served: u32,
    pub quality_score: Option<f64>,
    pub is_verified: bool,
    pub source: QuestionSource,
    pub atoms: HashSet<AtomId>,
    /// Not part of §3's data model proper, but required for the Attempt
    /// Pipeline to grade a submission and report `correct_answer` (§4.7
    /// step 1, §6's `submit_attempt` return shape).
    pub correct_answer: String,
    pub time_budget_sec: f64,
}
