//! Difficulty matching (§4.2). Pure functions only: given a learner rating
//! and a training `Mode`, compute the target difficulty band and score a
//! candidate question's fit. Mode-indexed constants live in one lookup
//! table (`mode_profile`) rather than scattered `match` arms, per SPEC_FULL
//! §4.2's implementation note.

use crate::domain::mode::{MatchCategory, Mode};
use crate::domain::rating::{MAX_RATING, MIN_RATING};
use crate::rating::engine::expected_win_rate;

/// The per-mode constants §4.2 names: target win rate, rating offset, and
/// half-spread of the admissible difficulty band.
#[derive(Debug, Clone, Copy)]
pub struct ModeProfile {
    pub target_win_rate: f64,
    pub offset: i32,
    pub half_spread: i32,
}

pub fn mode_profile(mode: Mode) -> ModeProfile {
    match mode {
        Mode::Build => ModeProfile {
            target_win_rate: 0.75,
            offset: -75,
            half_spread: 75,
        },
        Mode::Prove => ModeProfile {
            target_win_rate: 0.55,
            offset: 0,
            half_spread: 50,
        },
        Mode::Review => ModeProfile {
            target_win_rate: 0.80,
            offset: -50,
            half_spread: 50,
        },
        Mode::Diagnostic => ModeProfile {
            target_win_rate: 0.50,
            offset: 0,
            half_spread: 150,
        },
    }
}

/// `[band_min, band_max]`, clamped to `[MIN_RATING, MAX_RATING]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyBand {
    pub min: i32,
    pub max: i32,
}

impl DifficultyBand {
    pub fn contains(&self, difficulty: i32) -> bool {
        difficulty >= self.min && difficulty <= self.max
    }
}

/// The target difficulty band for `mode` given the learner's current
/// rating (§4.2 "Center = clamp(rating + offset, MIN, MAX)...").
pub fn difficulty_band(rating: i32, mode: Mode) -> DifficultyBand {
    let profile = mode_profile(mode);
    let center = (rating + profile.offset).clamp(MIN_RATING, MAX_RATING);
    DifficultyBand {
        min: (center - profile.half_spread).clamp(MIN_RATING, MAX_RATING),
        max: (center + profile.half_spread).clamp(MIN_RATING, MAX_RATING),
    }
}

/// `score = round(max(0, 100 - |E(R, difficulty) - target_win_rate| * 200))`.
pub fn match_score(rating: i32, difficulty: i32, mode: Mode) -> i32 {
    let e = expected_win_rate(rating, difficulty);
    let target = mode_profile(mode).target_win_rate;
    (100.0 - (e - target).abs() * 200.0).max(0.0).round() as i32
}

/// Classifies `difficulty - rating` into easy/optimal/hard/stretch (§4.2).
pub fn match_category(rating: i32, difficulty: i32) -> MatchCategory {
    MatchCategory::from_difficulty_delta(difficulty - rating)
}

/// Inverse of `expected_win_rate`: the difficulty a question would need to
/// produce win rate `t` against a learner rated `rating` (§4.2 "Inverse").
/// `t` is expected in `[0.1, 0.9]`; the formula is well-defined outside that
/// range too but §8's round-trip property is only asserted within it.
pub fn find_difficulty_for_win_rate(rating: i32, t: f64) -> i32 {
    let difficulty = rating as f64 + 400.0 * ((1.0 - t) / t).log10();
    (difficulty.round() as i32).clamp(MIN_RATING, MAX_RATING)
}

/// The §4.2 appropriateness filter: `true` if `q` (at expected win rate `e`
/// against `rating`) is an admissible pick for `mode`.
pub fn is_appropriate(mode: Mode, rating: i32, difficulty: i32) -> bool {
    let e = expected_win_rate(rating, difficulty);
    match mode {
        Mode::Build => e >= 0.5,
        Mode::Prove => e <= 0.85,
        Mode::Review => e >= 0.6,
        Mode::Diagnostic => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_band_centers_below_rating() {
        let band = difficulty_band(500, Mode::Build);
        assert_eq!(band, DifficultyBand { min: 350, max: 500 });
    }

    #[test]
    fn prove_band_centers_on_rating() {
        let band = difficulty_band(500, Mode::Prove);
        assert_eq!(band, DifficultyBand { min: 450, max: 550 });
    }

    #[test]
    fn band_clamps_to_rating_bounds() {
        let band = difficulty_band(120, Mode::Review);
        assert_eq!(band.min, MIN_RATING);
    }

    #[test]
    fn match_score_is_perfect_when_e_equals_target() {
        // At rating 500 vs difficulty 500, E=0.5, which is exactly
        // diagnostic's target win rate.
        assert_eq!(match_score(500, 500, Mode::Diagnostic), 100);
    }

    #[test]
    fn match_category_thresholds() {
        assert_eq!(match_category(500, 380), MatchCategory::Easy);
        assert_eq!(match_category(500, 500), MatchCategory::Optimal);
        assert_eq!(match_category(500, 600), MatchCategory::Optimal);
        assert_eq!(match_category(500, 650), MatchCategory::Hard);
        assert_eq!(match_category(500, 750), MatchCategory::Stretch);
    }

    #[test]
    fn inverse_round_trips_within_tolerance() {
        for t in [0.2, 0.3, 0.5, 0.65, 0.8] {
            let difficulty = find_difficulty_for_win_rate(500, t);
            let e = expected_win_rate(500, difficulty);
            assert!((e - t).abs() < 0.01, "t={t} e={e}");
        }
    }

    #[test]
    fn appropriateness_filter_rejects_out_of_band() {
        // Build rejects anything the learner isn't favored on.
        assert!(!is_appropriate(Mode::Build, 500, 900));
        // Prove rejects near-certain wins.
        assert!(!is_appropriate(Mode::Prove, 700, 100));
        // Review rejects anything below a 0.6 win rate.
        assert!(!is_appropriate(Mode::Review, 500, 560));
        // Diagnostic admits everything.
        assert!(is_appropriate(Mode::Diagnostic, 100, 900));
    }
}
