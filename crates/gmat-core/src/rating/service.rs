//! Orchestrates a multi-scope rating update against `RatingRepo` (§4.1
//! "Multi-scope update", §5's read-all-then-write-all ordering guarantee).
//! The arithmetic itself lives in [`super::engine`]; this module is the
//! only place that touches I/O.

use std::sync::Arc;

use crate::domain::mode::MatchCategory;
use crate::domain::rating::{RatingRecord, ScopeKey, StreakType};
use crate::error::{CoreError, CoreResult};
use crate::matching::match_category;
use crate::ports::RatingRepo;
use crate::rating::engine::{next_deviation, update_rating, AttemptFacts, RatingUpdate};

/// One scope's before/after picture, returned so callers (the Attempt
/// Pipeline) can report `rating_deltas_by_scope` without re-deriving it.
#[derive(Debug, Clone)]
pub struct ScopeRatingOutcome {
    pub record: RatingRecord,
    pub update: RatingUpdate,
}

pub struct RatingEngine {
    repo: Arc<dyn RatingRepo>,
}

impl RatingEngine {
    pub fn new(repo: Arc<dyn RatingRepo>) -> Self {
        Self { repo }
    }

    /// Updates every scope in `scopes` from the *same* pre-attempt snapshot
    /// generation: all `get_or_create` reads happen before any
    /// `update_rating` call, and all writes commit in one `save_all` batch.
    #[tracing::instrument(skip(self), fields(user_id, scopes = scopes.len()))]
    pub async fn update_scopes(
        &self,
        user_id: &str,
        scopes: &[ScopeKey],
        question_difficulty: i32,
        is_correct: bool,
        time_spent_sec: f64,
        time_budget_sec: f64,
    ) -> CoreResult<Vec<ScopeRatingOutcome>> {
        if time_budget_sec <= 0.0 {
            return Err(CoreError::InvalidInput(
                "time_budget_sec must be > 0".to_string(),
            ));
        }
        if scopes.is_empty() {
            return Err(CoreError::InvalidScope(
                "at least one scope is required".to_string(),
            ));
        }

        // Read all pre-attempt snapshots before computing anything.
        let mut snapshots = Vec::with_capacity(scopes.len());
        for scope in scopes {
            snapshots.push(self.repo.get_or_create(user_id, scope).await?);
        }

        let mut outcomes = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            let category = match_category(snapshot.rating, question_difficulty);
            let in_grind_band =
                snapshot.recent_correct_count() >= 9 && category == MatchCategory::Easy;

            let facts = AttemptFacts {
                is_correct,
                time_spent_sec,
                time_budget_sec,
                pre_streak_len: snapshot.current_streak,
                pre_streak_is_win: matches!(snapshot.streak_type, StreakType::Win),
                in_grind_band,
            };

            let update = update_rating(
                snapshot.rating,
                snapshot.deviation,
                snapshot.games_played,
                question_difficulty,
                facts,
            );

            let mut record = snapshot;
            record.apply_attempt_result(is_correct, update.new_rating);
            record.deviation = next_deviation(record.deviation, record.games_played);

            outcomes.push(ScopeRatingOutcome { record, update });
        }

        let records: Vec<RatingRecord> = outcomes.iter().map(|o| o.record.clone()).collect();
        self.repo.save_all(&records).await?;

        Ok(outcomes)
    }
}
