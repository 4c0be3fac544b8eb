use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::mode::Mode;
use super::question::{AtomId, QuestionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    NearRating,
    Stretch,
    Weakness,
    ReviewDue,
    Exploration,
}

#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    pub user_id: String,
    pub mode: Mode,
    pub section_code: Option<String>,
    pub question_type_code: Option<String>,
    pub target_atom_ids: Option<Vec<AtomId>>,
    pub exclude_ids: HashSet<QuestionId>,
    pub count: usize,
    pub weakness_atom_ids: Option<Vec<AtomId>>,
    pub max_same_atom_per_session: usize,
}

impl SelectionCriteria {
    pub fn new(user_id: impl Into<String>, mode: Mode, count: usize) -> Self {
        Self {
            user_id: user_id.into(),
            mode,
            section_code: None,
            question_type_code: None,
            target_atom_ids: None,
            exclude_ids: HashSet::new(),
            count,
            weakness_atom_ids: None,
            max_same_atom_per_session: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedQuestion {
    pub question_id: QuestionId,
    pub score: f64,
    pub reason: SelectionReason,
}
