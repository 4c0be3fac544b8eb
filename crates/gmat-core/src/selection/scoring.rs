//! Pure scoring and planning math for the Question Selector (C3, §4.3).
//! Candidate fetch and the final pick are I/O-bound and live in
//! `selector.rs`; everything here is deterministic given its inputs.

use std::collections::HashSet;

use crate::domain::mode::{MatchCategory, Mode};
use crate::domain::question::{AtomId, Question, QuestionSource};
use crate::matching::{match_category, mode_profile};
use crate::rating::engine::expected_win_rate;

/// The four-bucket distribution a mode targets (§4.3 "Plan"), ceil-rounded
/// per-bucket so the sum may land slightly above `count` — the selector
/// truncates to exactly `count` after filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPlan {
    pub near_rating: usize,
    pub stretch: usize,
    pub weakness: usize,
    pub exploration: usize,
}

impl SelectionPlan {
    pub fn total(&self) -> usize {
        self.near_rating + self.stretch + self.weakness + self.exploration
    }
}

pub fn selection_plan(mode: Mode, count: usize) -> SelectionPlan {
    let (near_rating, stretch, weakness, exploration) = match mode {
        Mode::Build | Mode::Prove => (0.60, 0.20, 0.15, 0.05),
        Mode::Review => (0.70, 0.00, 0.20, 0.10),
        Mode::Diagnostic => (0.40, 0.30, 0.20, 0.10),
    };
    let ceil = |fraction: f64| (fraction * count as f64).ceil() as usize;
    SelectionPlan {
        near_rating: ceil(near_rating),
        stretch: ceil(stretch),
        weakness: ceil(weakness),
        exploration: ceil(exploration),
    }
}

/// Per-candidate score (§4.3 "Per-candidate score"); higher is better.
pub fn score_candidate(
    rating: i32,
    question: &Question,
    mode: Mode,
    weakness_atom_ids: &HashSet<AtomId>,
) -> f64 {
    let e = expected_win_rate(rating, question.difficulty_rating);
    let target = mode_profile(mode).target_win_rate;
    let mut score = (50.0 - (e - target).abs() * 100.0).max(0.0);

    let category = match_category(rating, question.difficulty_rating);
    score += mode_match_bonus(mode, category);

    if !weakness_atom_ids.is_empty()
        && question
            .atoms
            .iter()
            .any(|atom| weakness_atom_ids.contains(atom))
    {
        score += 20.0;
    }

    score += match question.times_served {
        0 => 15.0,
        1 | 2 => 10.0,
        n if n > 10 => -10.0,
        _ => 0.0,
    };

    if question.is_verified {
        score += 10.0;
    }
    score += match question.quality_score {
        Some(q) if q >= 4.5 => 10.0,
        Some(q) if q >= 4.0 => 5.0,
        _ => 0.0,
    };

    if question.source == QuestionSource::Seeded {
        score += 10.0;
    }

    score
}

fn mode_match_bonus(mode: Mode, category: MatchCategory) -> f64 {
    match (mode, category) {
        (Mode::Build, MatchCategory::Easy) => 30.0,
        (Mode::Prove, MatchCategory::Optimal) => 30.0,
        (Mode::Diagnostic, MatchCategory::Optimal) => 30.0,
        (Mode::Review, MatchCategory::Easy) => 25.0,
        (Mode::Prove, MatchCategory::Hard) | (Mode::Prove, MatchCategory::Stretch) => 15.0,
        _ => 0.0,
    }
}
