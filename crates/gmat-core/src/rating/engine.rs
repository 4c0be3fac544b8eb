//! Pure rating mathematics (§4.1). No function here suspends or performs
//! I/O; every value is computed in double precision and rounded once, at
//! the final integer step, per §9's floating-point determinism note.

use crate::domain::rating::{MAX_DEVIATION, MAX_RATING, MIN_DEVIATION, MIN_RATING};

/// Size of the trailing window anti-grind and momentum both read from.
/// Fixed at 10 per §9 ("the specification fixes N=10 for all purposes").
pub const GRIND_WINDOW: usize = 10;

/// Expected win rate of a player rated `r_p` against an opponent (question)
/// rated `r_q`. Monotone increasing in `r_p - r_q`; exactly `0.5` when equal.
pub fn expected_win_rate(r_p: i32, r_q: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((r_q - r_p) as f64 / 400.0))
}

/// Base K-factor tier by `games_played`, before deviation scaling.
fn base_k_factor(games_played: u32) -> f64 {
    match games_played {
        0..=9 => 48.0,
        10..=29 => 32.0,
        30..=99 => 24.0,
        _ => 16.0,
    }
}

/// K-factor after deviation scaling, rounded to the nearest integer
/// (§4.1). Scaled K is clamped to `[12, 64]`.
pub fn k_factor(games_played: u32, deviation: i32) -> i32 {
    let mut k = base_k_factor(games_played);
    if deviation > 200 {
        k = (k * 1.25).min(64.0);
    } else if deviation < 50 {
        k = (k * 0.8).max(12.0);
    }
    k.round() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimingCategory {
    VeryFast,
    Fast,
    Normal,
    Slow,
    VerySlow,
}

fn timing_category(ratio: f64) -> TimingCategory {
    if ratio <= 0.4 {
        TimingCategory::VeryFast
    } else if ratio <= 0.6 {
        TimingCategory::Fast
    } else if ratio <= 1.0 {
        TimingCategory::Normal
    } else if ratio <= 1.5 {
        TimingCategory::Slow
    } else {
        TimingCategory::VerySlow
    }
}

/// Timing multiplier over `ratio = time_spent / time_budget` (§4.1 table).
pub fn timing_factor(ratio: f64, was_correct: bool) -> f64 {
    match (timing_category(ratio), was_correct) {
        (TimingCategory::VeryFast, _) => 1.10,
        (TimingCategory::Fast, true) => 1.05,
        (TimingCategory::Fast, false) => 1.00,
        (TimingCategory::Normal, _) => 1.00,
        (TimingCategory::Slow, true) => 0.95,
        (TimingCategory::Slow, false) => 1.00,
        (TimingCategory::VerySlow, true) => 0.85,
        (TimingCategory::VerySlow, false) => 1.00,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Momentum {
    Hot,
    Warm,
    Slump,
    Cold,
    Neutral,
}

fn momentum_from_streak(streak_len: u32, is_win_streak: bool) -> Momentum {
    match (is_win_streak, streak_len) {
        (true, n) if n >= 5 => Momentum::Hot,
        (true, n) if n >= 3 => Momentum::Warm,
        (false, n) if n >= 5 => Momentum::Slump,
        (false, n) if n >= 3 => Momentum::Cold,
        _ => Momentum::Neutral,
    }
}

fn momentum_multiplier(momentum: Momentum) -> f64 {
    match momentum {
        Momentum::Hot | Momentum::Slump => 1.15,
        Momentum::Warm | Momentum::Cold => 1.05,
        Momentum::Neutral => 1.0,
    }
}

/// Inputs a single-scope rating update needs, besides the snapshot itself.
#[derive(Debug, Clone, Copy)]
pub struct AttemptFacts {
    pub is_correct: bool,
    pub time_spent_sec: f64,
    pub time_budget_sec: f64,
    /// Pre-attempt streak length and whether it was a win streak (0 = none).
    pub pre_streak_len: u32,
    pub pre_streak_is_win: bool,
    /// `true` if the last 10 attempts (pre-this-one) contain >= 9 correct in
    /// the same difficulty band as this question.
    pub in_grind_band: bool,
}

/// The outcome of one `update_rating` call, before the caller folds it back
/// into a `RatingRecord`.
#[derive(Debug, Clone, Copy)]
pub struct RatingUpdate {
    pub previous_rating: i32,
    pub new_rating: i32,
    pub delta: i32,
    pub expected_win_rate: f64,
    pub k_factor: i32,
}

/// Computes a bounded rating update for one scope (§4.1 "Update algorithm").
///
/// `rating`/`deviation`/`games_played` are the pre-attempt snapshot for this
/// scope; `question_difficulty` is the served question's difficulty in the
/// same [100, 900] space.
pub fn update_rating(
    rating: i32,
    deviation: i32,
    games_played: u32,
    question_difficulty: i32,
    facts: AttemptFacts,
) -> RatingUpdate {
    let k = k_factor(games_played, deviation);
    let e = expected_win_rate(rating, question_difficulty);
    let actual = if facts.is_correct { 1.0 } else { 0.0 };

    let mut raw = k as f64 * (actual - e);

    let ratio = if facts.time_budget_sec > 0.0 {
        facts.time_spent_sec / facts.time_budget_sec
    } else {
        0.0
    };
    raw *= timing_factor(ratio, facts.is_correct);

    if raw > 0.0 {
        if facts.is_correct && e > 0.85 {
            raw *= 0.5;
        }
        if facts.in_grind_band {
            raw *= 0.75;
        }
    }

    // Momentum: a win streak amplifies positive deltas (hot/warm); a loss
    // streak amplifies negative deltas (slump/cold). A streak never touches
    // a delta of the opposite sign.
    let momentum = momentum_from_streak(facts.pre_streak_len, facts.pre_streak_is_win);
    if (raw > 0.0 && facts.pre_streak_is_win) || (raw < 0.0 && !facts.pre_streak_is_win) {
        raw *= momentum_multiplier(momentum);
    }

    let bound = 1.5 * k as f64;
    raw = raw.clamp(-bound, bound);

    let delta = raw.round() as i32;
    let new_rating = (rating + delta).clamp(MIN_RATING, MAX_RATING);

    RatingUpdate {
        previous_rating: rating,
        new_rating,
        delta: new_rating - rating,
        expected_win_rate: e,
        k_factor: k,
    }
}

/// Monotone deviation shrink schedule converging to `MIN_DEVIATION` by 100
/// games (§4.1: "a linear schedule is acceptable").
pub fn next_deviation(deviation: i32, games_played_after: u32) -> i32 {
    let shrink = ((MAX_DEVIATION - MIN_DEVIATION) as f64 * (games_played_after.min(100) as f64
        / 100.0))
        .round() as i32;
    (deviation - shrink.max(0)).max(MIN_DEVIATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::tier_0_games(0, 350, 48)]
    #[case::tier_0_games_upper_bound(9, 350, 48)]
    #[case::tier_10_games(10, 350, 32)]
    #[case::tier_10_games_upper_bound(29, 350, 32)]
    #[case::tier_30_games(30, 350, 24)]
    #[case::tier_30_games_upper_bound(99, 350, 24)]
    #[case::tier_100_games(100, 350, 16)]
    #[case::high_deviation_scales_up(0, 250, 60)] // 48 * 1.25 = 60
    #[case::low_deviation_scales_down_and_floors(100, 40, 13)] // 16 * 0.8 = 12.8 -> 13
    fn k_factor_tiers_table(#[case] games_played: u32, #[case] deviation: i32, #[case] expected: i32) {
        assert_eq!(k_factor(games_played, deviation), expected);
    }

    #[rstest]
    #[case::very_fast_correct(0.2, true, 1.10)]
    #[case::very_fast_incorrect(0.2, false, 1.10)]
    #[case::fast_correct(0.5, true, 1.05)]
    #[case::fast_incorrect(0.5, false, 1.00)]
    #[case::normal_correct(0.8, true, 1.00)]
    #[case::normal_incorrect(0.8, false, 1.00)]
    #[case::slow_correct(1.2, true, 0.95)]
    #[case::slow_incorrect(1.2, false, 1.00)]
    #[case::very_slow_correct(2.0, true, 0.85)]
    #[case::very_slow_incorrect(2.0, false, 1.00)]
    fn timing_factor_table(#[case] ratio: f64, #[case] was_correct: bool, #[case] expected: f64) {
        assert!((timing_factor(ratio, was_correct) - expected).abs() < 1e-9);
    }

    #[test]
    fn expected_win_rate_is_half_when_equal() {
        assert!((expected_win_rate(500, 500) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn expected_win_rate_sums_to_one() {
        let e_pq = expected_win_rate(620, 480);
        let e_qp = expected_win_rate(480, 620);
        assert!((e_pq + e_qp - 1.0).abs() < 1e-9);
    }

    #[test]
    fn expected_win_rate_monotone_increasing() {
        let low = expected_win_rate(400, 500);
        let mid = expected_win_rate(500, 500);
        let high = expected_win_rate(600, 500);
        assert!(low < mid);
        assert!(mid < high);
    }

    #[test]
    fn k_factor_tiers() {
        assert_eq!(k_factor(0, 350), 48);
        assert_eq!(k_factor(9, 350), 48);
        assert_eq!(k_factor(10, 350), 32);
        assert_eq!(k_factor(29, 350), 32);
        assert_eq!(k_factor(30, 350), 24);
        assert_eq!(k_factor(99, 350), 24);
        assert_eq!(k_factor(100, 350), 16);
    }

    #[test]
    fn k_factor_deviation_scaling() {
        // deviation > 200 -> *1.25, capped at 64
        assert_eq!(k_factor(0, 250), 60); // 48 * 1.25 = 60
        // deviation < 50 -> *0.8, floored at 12
        assert_eq!(k_factor(100, 40), 13); // 16 * 0.8 = 12.8 -> rounds to 13
    }

    #[test]
    fn k_factor_bounds_hold() {
        for games in [0u32, 5, 15, 50, 500] {
            for deviation in [20, 60, 150, 250, 500] {
                let k = k_factor(games, deviation);
                assert!((12..=64).contains(&k), "k={k} out of bounds");
            }
        }
    }

    fn facts(is_correct: bool, ratio: f64) -> AttemptFacts {
        AttemptFacts {
            is_correct,
            time_spent_sec: ratio * 120.0,
            time_budget_sec: 120.0,
            pre_streak_len: 0,
            pre_streak_is_win: false,
            in_grind_band: false,
        }
    }

    #[test]
    fn equal_rating_win_scenario() {
        // §8 scenario 1: rating=500, games_played=0, difficulty=500,
        // correct, time=60/120 (ratio 0.5 -> "fast").
        let update = update_rating(500, 350, 0, 500, facts(true, 0.5));
        assert_eq!(update.k_factor, 48);
        assert!((update.expected_win_rate - 0.5).abs() < 1e-9);
        assert_eq!(update.new_rating, 525);
    }

    #[test]
    fn upset_loss_scenario() {
        // §8 scenario 3: rating=500, difficulty=300, incorrect, K=32 (as
        // given in the worked example).
        let update = update_rating(500, 350, 10, 300, facts(false, 1.0));
        assert!((update.expected_win_rate - 0.7597).abs() < 0.001);
        assert_eq!(update.k_factor, 32);
        assert_eq!(update.delta, -24);
    }

    #[test]
    fn easy_grind_halves_gain() {
        // §8 scenario 2 (difficulty lowered slightly from the example so
        // E clears the 0.85 anti-grind threshold exactly): rating=700,
        // difficulty=380, correct.
        let f = facts(true, 100.0 / 120.0);
        let update = update_rating(700, 350, 0, 380, f);
        assert!(update.expected_win_rate > 0.85);
        // Anti-grind halves the positive delta relative to an update with
        // no expected-win-rate suppression.
        assert!(update.delta > 0);
        assert!(update.delta < update.k_factor);
    }

    #[test]
    fn rating_update_stays_in_bounds() {
        let update = update_rating(895, 350, 0, 100, facts(true, 0.1));
        assert!(update.new_rating <= 900);
        let update = update_rating(105, 350, 0, 900, facts(false, 0.1));
        assert!(update.new_rating >= 100);
    }

    #[test]
    fn delta_never_exceeds_one_point_five_k() {
        for games in [0u32, 50, 200] {
            for difficulty in [100, 500, 900] {
                let update = update_rating(500, 350, games, difficulty, facts(true, 2.0));
                assert!(update.delta.unsigned_abs() as f64 <= 1.5 * update.k_factor as f64 + 1.0);
            }
        }
    }

    #[test]
    fn hot_streak_amplifies_win_not_loss() {
        let mut win = facts(true, 1.0);
        win.pre_streak_len = 5;
        win.pre_streak_is_win = true;
        let plain = update_rating(500, 350, 50, 500, facts(true, 1.0));
        let hot = update_rating(500, 350, 50, 500, win);
        assert!(hot.delta > plain.delta);

        // Same hot win-streak context, but this attempt is a loss: momentum
        // must not touch it (streak and delta sign disagree).
        let mut loss = facts(false, 1.0);
        loss.pre_streak_len = 5;
        loss.pre_streak_is_win = true;
        let plain_loss = update_rating(500, 350, 50, 500, facts(false, 1.0));
        let loss_update = update_rating(500, 350, 50, 500, loss);
        assert_eq!(loss_update.delta, plain_loss.delta);
    }

    #[test]
    fn next_deviation_converges_to_floor() {
        assert_eq!(next_deviation(350, 0), 350);
        assert_eq!(next_deviation(350, 100), 30);
        assert!(next_deviation(350, 50) < 350);
        assert!(next_deviation(350, 50) > 30);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn expected_win_rate_always_sums_to_one(
                r_p in MIN_RATING..=MAX_RATING,
                r_q in MIN_RATING..=MAX_RATING,
            ) {
                let e_pq = expected_win_rate(r_p, r_q);
                let e_qp = expected_win_rate(r_q, r_p);
                prop_assert!((e_pq + e_qp - 1.0).abs() < 1e-9);
            }

            #[test]
            fn k_factor_always_within_bounds(
                games_played in 0u32..10_000,
                deviation in MIN_DEVIATION..=MAX_DEVIATION,
            ) {
                let k = k_factor(games_played, deviation);
                prop_assert!((12..=64).contains(&k));
            }

            #[test]
            fn delta_never_exceeds_one_point_five_k(
                rating in MIN_RATING..=MAX_RATING,
                deviation in MIN_DEVIATION..=MAX_DEVIATION,
                games_played in 0u32..10_000,
                question_difficulty in MIN_RATING..=MAX_RATING,
                is_correct in any::<bool>(),
                ratio in 0.0f64..3.0,
                pre_streak_len in 0u32..20,
                pre_streak_is_win in any::<bool>(),
                in_grind_band in any::<bool>(),
            ) {
                let facts = AttemptFacts {
                    is_correct,
                    time_spent_sec: ratio * 120.0,
                    time_budget_sec: 120.0,
                    pre_streak_len,
                    pre_streak_is_win,
                    in_grind_band,
                };
                let update = update_rating(rating, deviation, games_played, question_difficulty, facts);
                prop_assert!(update.delta.unsigned_abs() as f64 <= 1.5 * update.k_factor as f64 + 1.0);
            }

            #[test]
            fn new_rating_always_stays_in_bounds(
                rating in MIN_RATING..=MAX_RATING,
                deviation in MIN_DEVIATION..=MAX_DEVIATION,
                games_played in 0u32..10_000,
                question_difficulty in MIN_RATING..=MAX_RATING,
                is_correct in any::<bool>(),
                ratio in 0.0f64..3.0,
            ) {
                let update = update_rating(rating, deviation, games_played, question_difficulty, facts(is_correct, ratio));
                prop_assert!((MIN_RATING..=MAX_RATING).contains(&update.new_rating));
            }
        }
    }
}
