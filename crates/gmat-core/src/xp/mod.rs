//! XP calculation (C6, §4.6). `calculate_xp` is kept separate from
//! `classify_outcome` (in `domain::outcome`) per SPEC_FULL §4.6's
//! implementation note: small single-purpose pure functions, not one large
//! branchy one.

use std::sync::Arc;

use crate::domain::mode::MatchCategory;
use crate::domain::outcome::OutcomeType;
use crate::domain::progression::UserProgressionState;
use crate::error::CoreResult;
use crate::ports::UserStateRepo;

/// Thin read-through wrapper exposing the external interface
/// `user_progression()` (§6). The Attempt Pipeline mutates progression
/// state directly through `UserStateRepo`; this is the read-only companion
/// a caller uses to inspect it outside of `submit_attempt`.
pub struct ProgressionService {
    repo: Arc<dyn UserStateRepo>,
}

impl ProgressionService {
    pub fn new(repo: Arc<dyn UserStateRepo>) -> Self {
        Self { repo }
    }

    /// External interface `user_progression()` (§6).
    pub async fn user_progression(&self, user_id: &str) -> CoreResult<UserProgressionState> {
        self.repo.get_or_create(user_id).await
    }
}

/// Inputs `calculate_xp` needs beyond the outcome itself.
#[derive(Debug, Clone, Copy)]
pub struct XpInputs {
    pub outcome: OutcomeType,
    /// `true` when the attempt was correct and the question's expected win
    /// rate was < 0.4 — the "upset win" bonus, distinct from the
    /// `upset_loss` outcome classification (SPEC_FULL §9 open question).
    pub is_upset_win: bool,
    pub difficulty_match: MatchCategory,
    /// The learner's win/loss streak *after* this attempt folds in.
    pub current_streak: u32,
    /// `true` when the serving mode's target win rate is <= 0.55
    /// (`Mode::is_prove_like`).
    pub is_prove_like_mode: bool,
}

/// Computes the non-negative XP award for one attempt (§4.6).
pub fn calculate_xp(inputs: XpInputs) -> u32 {
    if !inputs.outcome.is_correct() {
        return 0;
    }

    let mut total = 10.0_f64;

    total += match inputs.outcome {
        OutcomeType::CleanWin => 10.0, // +5 fast, +5 clean
        OutcomeType::SlowWin => 0.0,
        OutcomeType::LuckyWin => -5.0,
        OutcomeType::UpsetLoss | OutcomeType::ExpectedLoss | OutcomeType::Timeout => 0.0,
    };

    if inputs.is_upset_win {
        total += 10.0;
    }

    total += match inputs.difficulty_match {
        MatchCategory::Easy => 0.0,
        MatchCategory::Optimal => 5.0,
        MatchCategory::Hard => 10.0,
        MatchCategory::Stretch => 20.0,
    };

    total += inputs.current_streak.min(10) as f64;

    if inputs.is_prove_like_mode {
        total = (total * 1.5).round();
    }

    total.max(0.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(outcome: OutcomeType) -> XpInputs {
        XpInputs {
            outcome,
            is_upset_win: false,
            difficulty_match: MatchCategory::Optimal,
            current_streak: 0,
            is_prove_like_mode: false,
        }
    }

    #[test]
    fn incorrect_outcomes_award_zero() {
        for outcome in [
            OutcomeType::ExpectedLoss,
            OutcomeType::UpsetLoss,
            OutcomeType::Timeout,
        ] {
            assert_eq!(calculate_xp(base(outcome)), 0);
        }
    }

    #[test]
    fn clean_win_base_case() {
        // base 10 + clean_win 10 + optimal 5 + streak 0 = 25.
        assert_eq!(calculate_xp(base(OutcomeType::CleanWin)), 25);
    }

    #[test]
    fn lucky_win_is_penalized_but_never_negative() {
        let mut inputs = base(OutcomeType::LuckyWin);
        inputs.difficulty_match = MatchCategory::Easy;
        // base 10 - 5 lucky + 0 easy + 0 streak = 5.
        assert_eq!(calculate_xp(inputs), 5);
    }

    #[test]
    fn floor_is_never_negative_even_under_heavy_penalty() {
        let mut inputs = base(OutcomeType::LuckyWin);
        inputs.difficulty_match = MatchCategory::Easy;
        inputs.current_streak = 0;
        assert!(calculate_xp(inputs) <= 10);
        assert!(calculate_xp(inputs) < u32::MAX);
    }

    #[test]
    fn upset_win_bonus_is_additive() {
        let mut inputs = base(OutcomeType::CleanWin);
        inputs.is_upset_win = true;
        // 25 (clean win baseline) + 10 upset = 35.
        assert_eq!(calculate_xp(inputs), 35);
    }

    #[test]
    fn streak_bonus_caps_at_ten() {
        let mut inputs = base(OutcomeType::CleanWin);
        inputs.current_streak = 25;
        assert_eq!(calculate_xp(inputs), 35); // 25 + min(25,10)
    }

    #[test]
    fn prove_like_mode_multiplies_running_total() {
        let mut inputs = base(OutcomeType::CleanWin);
        inputs.is_prove_like_mode = true;
        // 25 * 1.5 = 37.5 -> rounds to 38.
        assert_eq!(calculate_xp(inputs), 38);
    }

    #[test]
    fn difficulty_match_scales_with_category() {
        let mut inputs = base(OutcomeType::CleanWin);
        inputs.difficulty_match = MatchCategory::Stretch;
        // 10 base + 10 clean + 20 stretch = 40.
        assert_eq!(calculate_xp(inputs), 40);
    }

    #[tokio::test]
    async fn progression_service_creates_state_lazily() {
        use crate::ports::MockUserStateRepo;

        let mut repo = MockUserStateRepo::new();
        repo.expect_get_or_create()
            .returning(|user_id| Ok(UserProgressionState::new(user_id)));

        let service = ProgressionService::new(Arc::new(repo));
        let progression = service.user_progression("u1").await.unwrap();
        assert_eq!(progression.user_id, "u1");
        assert_eq!(progression.total_xp, 0);
    }
}
