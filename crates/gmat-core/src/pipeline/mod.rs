//! The Attempt Pipeline (C7, §4.7): the single externally-visible state
//! transition. Composes the Rating Engine (C1), Gate Evaluator (C5), the
//! SR Scheduler (C4), and the XP Engine (C6) around one `submit_attempt`
//! call, following the read-all-then-write-all ordering guarantee of §5.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::gate::Gate;
use crate::domain::mastery::MasteryLevel;
use crate::domain::outcome::classify_outcome;
use crate::domain::pipeline::{AttemptInput, AttemptResult, PassedGate, RatingDelta};
use crate::domain::question::AtomId;
use crate::domain::rating::{ScopeKey, ScopeType};
use crate::domain::review::ItemType;
use crate::domain::Attempt;
use crate::error::{CoreError, CoreResult};
use crate::gating::GateEvaluator;
use crate::matching::{match_category, mode_profile};
use crate::ports::{AttemptRepo, MasteryRepo, QuestionRepo, RatingRepo, ReviewRepo, UserStateRepo};
use crate::rating::RatingEngine;
use crate::scheduling::ReviewScheduler;
use crate::xp::{calculate_xp, XpInputs};

/// Bound on re-snapshot-and-retry attempts when a repository reports
/// `Conflict` during the pipeline's commit steps (§5 "Retry policy").
const MAX_COMMIT_RETRIES: u32 = 3;

pub struct AttemptPipeline {
    question_repo: Arc<dyn QuestionRepo>,
    attempt_repo: Arc<dyn AttemptRepo>,
    mastery_repo: Arc<dyn MasteryRepo>,
    user_state_repo: Arc<dyn UserStateRepo>,
    rating_engine: RatingEngine,
    review_scheduler: ReviewScheduler,
    gate_evaluator: GateEvaluator,
}

impl AttemptPipeline {
    pub fn new(
        question_repo: Arc<dyn QuestionRepo>,
        rating_repo: Arc<dyn RatingRepo>,
        attempt_repo: Arc<dyn AttemptRepo>,
        mastery_repo: Arc<dyn MasteryRepo>,
        review_repo: Arc<dyn ReviewRepo>,
        user_state_repo: Arc<dyn UserStateRepo>,
    ) -> Self {
        Self {
            question_repo,
            attempt_repo: attempt_repo.clone(),
            mastery_repo: mastery_repo.clone(),
            user_state_repo: user_state_repo.clone(),
            rating_engine: RatingEngine::new(rating_repo),
            review_scheduler: ReviewScheduler::new(review_repo),
            gate_evaluator: GateEvaluator::new(mastery_repo, attempt_repo, user_state_repo),
        }
    }

    /// External interface `submit_attempt(AttemptInput)` (§6, §4.7). Retries
    /// the whole transaction, re-reading every snapshot, up to
    /// `MAX_COMMIT_RETRIES` times if a repository reports `Conflict`.
    #[tracing::instrument(skip(self, input), fields(user_id = %input.user_id, question_id = %input.question_id))]
    pub async fn submit_attempt(&self, input: AttemptInput) -> CoreResult<AttemptResult> {
        let mut last_err = None;
        for _ in 0..MAX_COMMIT_RETRIES {
            match self.run_once(&input).await {
                Ok(result) => return Ok(result),
                Err(CoreError::Conflict(msg)) => last_err = Some(CoreError::Conflict(msg)),
                Err(other) => return Err(other),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            CoreError::Conflict("exhausted commit retries".to_string())
        }))
    }

    async fn run_once(&self, input: &AttemptInput) -> CoreResult<AttemptResult> {
        if input.time_spent_sec <= 0.0 {
            return Err(CoreError::InvalidInput(
                "time_spent_sec must be > 0".to_string(),
            ));
        }

        // Step 1: load the question and classify the raw facts.
        let question = self.question_repo.get_question(&input.question_id).await?;
        let is_correct = input.answered_choice == question.correct_answer;
        let was_overtime = input.time_spent_sec > question.time_budget_sec;

        // Steps 2-3: snapshot and update every rating scope from the same
        // pre-attempt generation (RatingEngine::update_scopes already
        // reads-all-then-writes-all per §5).
        let scopes = vec![
            ScopeKey::global(),
            ScopeKey::new(ScopeType::Section, question.section_code.clone()),
            ScopeKey::new(ScopeType::Topic, question.topic_code.clone()),
            ScopeKey::new(ScopeType::QuestionType, question.question_type_code.clone()),
        ];
        let outcomes = self
            .rating_engine
            .update_scopes(
                &input.user_id,
                &scopes,
                question.difficulty_rating,
                is_correct,
                input.time_spent_sec,
                question.time_budget_sec,
            )
            .await?;

        let global_outcome = &outcomes[0];
        let expected_win_rate = global_outcome.update.expected_win_rate;
        let pre_attempt_global_rating = global_outcome.update.previous_rating;

        self.attempt_repo
            .record(&Attempt {
                id: format!(
                    "attempt-{}-{}",
                    question.id,
                    Utc::now().timestamp_nanos_opt().unwrap_or_default()
                ),
                question_id: question.id.clone(),
                user_id: input.user_id.clone(),
                answered_choice: input.answered_choice.clone(),
                is_correct,
                time_spent_sec: input.time_spent_sec,
                time_budget_sec: question.time_budget_sec,
                was_guessed: input.was_guessed,
                atom_ids: question.atoms.clone(),
                created_at: Utc::now(),
            })
            .await?;

        // Step 4: fold the result into every atom's mastery record.
        let mut mastered_this_attempt: Vec<AtomId> = Vec::new();
        for atom_id in &question.atoms {
            let mut mastery = self
                .mastery_repo
                .get_or_create(&input.user_id, atom_id)
                .await?;
            let transition = mastery.record_attempt(is_correct);
            self.mastery_repo.save(&mastery).await?;
            if transition == Some(MasteryLevel::Mastered) {
                mastered_this_attempt.push(atom_id.clone());
            }
        }

        // Step 5: classify the outcome, score the difficulty match, and
        // award XP.
        let outcome_type =
            classify_outcome(is_correct, was_overtime, input.was_guessed, expected_win_rate);
        let difficulty_match =
            match_category(pre_attempt_global_rating, question.difficulty_rating);
        let is_upset_win = is_correct && expected_win_rate < 0.4;
        let current_streak = if is_correct {
            global_outcome.record.current_streak
        } else {
            0
        };
        let target_win_rate = mode_profile(input.mode).target_win_rate;
        let xp_awarded = calculate_xp(XpInputs {
            outcome: outcome_type,
            is_upset_win,
            difficulty_match,
            current_streak,
            is_prove_like_mode: input.mode.is_prove_like(target_win_rate),
        });

        let mut user_state = self.user_state_repo.get_or_create(&input.user_id).await?;
        let mut highest_level_crossed = user_state.award_xp(xp_awarded).last().copied();

        // Step 6: gate re-evaluation for any atom that just crossed into
        // `mastered`. The default gate is a pure function of the atom id,
        // so no repository lookup is needed to construct it.
        let mut passed_gates = Vec::new();
        for atom_id in &mastered_this_attempt {
            let gate = Gate::default_mastery_gate(atom_id);
            if user_state.passed_gate_ids.contains(&gate.id) {
                continue;
            }
            let result = self
                .gate_evaluator
                .evaluate_default_mastery_gate(&input.user_id, atom_id)
                .await?;
            if result.status == crate::domain::GateStatus::Passed {
                user_state.passed_gate_ids.insert(gate.id.clone());
                user_state.mastered_atom_ids.insert(atom_id.clone());
                if let Some(level) = user_state.award_xp(gate.xp_reward).last() {
                    highest_level_crossed = Some(highest_level_crossed.map_or(*level, |l| l.max(*level)));
                }
                passed_gates.push(PassedGate {
                    gate_id: gate.id,
                    xp_awarded: gate.xp_reward,
                });
            }
        }
        self.user_state_repo.save(&user_state).await?;

        // Step 7: map the outcome to an SM-2 quality grade and update every
        // atom's review schedule.
        let quality = outcome_type.to_review_quality();
        let today = Utc::now().date_naive();
        let mut new_review_dates = HashMap::new();
        for atom_id in &question.atoms {
            let item = self
                .review_scheduler
                .ensure_item(&input.user_id, ItemType::Atom, atom_id)
                .await?;
            let updated = self
                .review_scheduler
                .process_review_on(&item.id, quality, today)
                .await?;
            new_review_dates.insert(atom_id.clone(), updated.next_review_date);
        }

        Ok(AttemptResult {
            is_correct,
            correct_answer: question.correct_answer,
            outcome_type,
            rating_deltas_by_scope: outcomes
                .iter()
                .map(|o| RatingDelta {
                    scope: o.record.scope.clone(),
                    previous_rating: o.update.previous_rating,
                    new_rating: o.update.new_rating,
                })
                .collect(),
            xp_awarded,
            new_level: highest_level_crossed,
            passed_gates,
            new_review_dates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mode::Mode;
    use crate::domain::question::{Question, QuestionSource};
    use crate::domain::rating::RatingRecord;
    use crate::domain::review::ReviewItem;
    use crate::domain::mastery::AtomMastery;
    use crate::domain::progression::UserProgressionState;
    use crate::ports::{
        MockAttemptRepo, MockMasteryRepo, MockQuestionRepo, MockRatingRepo, MockReviewRepo,
        MockUserStateRepo,
    };
    use std::collections::HashSet;

    fn question() -> Question {
        let mut atoms = HashSet::new();
        atoms.insert("atom-1".to_string());
        Question {
            id: "q1".into(),
            section_code: "quant".into(),
            topic_code: "algebra".into(),
            question_type_code: "ps".into(),
            difficulty_rating: 500,
            times_served: 0,
            quality_score: None,
            is_verified: true,
            source: QuestionSource::Seeded,
            atoms,
            correct_answer: "B".into(),
            time_budget_sec: 120.0,
        }
    }

    fn build_pipeline() -> AttemptPipeline {
        let mut question_repo = MockQuestionRepo::new();
        question_repo.expect_get_question().returning(|_| Ok(question()));

        let mut rating_repo = MockRatingRepo::new();
        rating_repo
            .expect_get_or_create()
            .returning(|user_id, scope| Ok(RatingRecord::new(user_id, scope.clone())));
        rating_repo.expect_save_all().returning(|_| Ok(()));

        let mut attempt_repo = MockAttemptRepo::new();
        attempt_repo.expect_record().returning(|_| Ok(()));
        attempt_repo
            .expect_get_recent_for_atoms()
            .returning(|_, _, _| Ok(vec![]));

        let mut mastery_repo = MockMasteryRepo::new();
        mastery_repo
            .expect_get_or_create()
            .returning(|user_id, atom_id| Ok(AtomMastery::new(user_id, atom_id.clone())));
        mastery_repo.expect_save().returning(|_| Ok(()));
        mastery_repo
            .expect_get_many()
            .returning(|user_id, ids| {
                Ok(ids
                    .iter()
                    .map(|id| AtomMastery::new(user_id, id.clone()))
                    .collect())
            });

        let mut review_repo = MockReviewRepo::new();
        review_repo.expect_get_or_create().returning(|user_id, item_type, item_id, today| {
            Ok(ReviewItem::new_for_item(user_id, item_type, item_id, today))
        });
        review_repo
            .expect_get_by_id()
            .returning(|id| Ok(ReviewItem::new_for_item("u1", ItemType::Atom, id, chrono::Utc::now().date_naive())));
        review_repo.expect_save().returning(|_| Ok(()));

        let mut user_state_repo = MockUserStateRepo::new();
        user_state_repo
            .expect_get_or_create()
            .returning(|user_id| Ok(UserProgressionState::new(user_id)));
        user_state_repo.expect_save().returning(|_| Ok(()));

        AttemptPipeline::new(
            Arc::new(question_repo),
            Arc::new(rating_repo),
            Arc::new(attempt_repo),
            Arc::new(mastery_repo),
            Arc::new(review_repo),
            Arc::new(user_state_repo),
        )
    }

    #[tokio::test]
    async fn correct_answer_updates_every_scope_and_awards_xp() {
        let pipeline = build_pipeline();
        let input = AttemptInput {
            user_id: "u1".into(),
            question_id: "q1".into(),
            answered_choice: "B".into(),
            time_spent_sec: 60.0,
            was_guessed: false,
            mode: Mode::Build,
        };

        let result = pipeline.submit_attempt(input).await.unwrap();
        assert!(result.is_correct);
        assert_eq!(result.correct_answer, "B");
        assert_eq!(result.rating_deltas_by_scope.len(), 4);
        assert!(result.xp_awarded > 0);
        assert!(result.new_review_dates.contains_key("atom-1"));
    }

    #[tokio::test]
    async fn wrong_answer_awards_zero_xp() {
        let pipeline = build_pipeline();
        let input = AttemptInput {
            user_id: "u1".into(),
            question_id: "q1".into(),
            answered_choice: "A".into(),
            time_spent_sec: 60.0,
            was_guessed: false,
            mode: Mode::Build,
        };

        let result = pipeline.submit_attempt(input).await.unwrap();
        assert!(!result.is_correct);
        assert_eq!(result.xp_awarded, 0);
    }

    #[tokio::test]
    async fn rejects_non_positive_time_spent() {
        let pipeline = build_pipeline();
        let input = AttemptInput {
            user_id: "u1".into(),
            question_id: "q1".into(),
            answered_choice: "B".into(),
            time_spent_sec: 0.0,
            was_guessed: false,
            mode: Mode::Build,
        };

        let result = pipeline.submit_attempt(input).await;
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }
}
