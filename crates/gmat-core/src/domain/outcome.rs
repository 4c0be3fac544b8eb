use serde::{Deserialize, Serialize};

/// One of the six outcome classes an attempt can fall into (§4.6, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeType {
    CleanWin,
    SlowWin,
    LuckyWin,
    ExpectedLoss,
    UpsetLoss,
    Timeout,
}

impl OutcomeType {
    /// The SM-2 quality mapping used by the attempt pipeline (§4.7 step 7).
    pub fn to_review_quality(&self) -> u8 {
        match self {
            OutcomeType::CleanWin => 5,
            OutcomeType::SlowWin => 4,
            OutcomeType::LuckyWin => 3,
            OutcomeType::UpsetLoss | OutcomeType::ExpectedLoss => 2,
            OutcomeType::Timeout => 1,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(
            self,
            OutcomeType::CleanWin | OutcomeType::SlowWin | OutcomeType::LuckyWin
        )
    }
}

/// Classifies an attempt's outcome from its raw facts (§4.6).
///
/// `expected_win_rate` is the global-scope `E(R, q.difficulty)` at the time
/// of the attempt.
pub fn classify_outcome(
    is_correct: bool,
    was_overtime: bool,
    was_guessed: bool,
    expected_win_rate: f64,
) -> OutcomeType {
    if !is_correct {
        if was_overtime {
            return OutcomeType::Timeout;
        }
        if expected_win_rate > 0.6 {
            return OutcomeType::UpsetLoss;
        }
        return OutcomeType::ExpectedLoss;
    }

    if was_guessed {
        return OutcomeType::LuckyWin;
    }
    if was_overtime {
        return OutcomeType::SlowWin;
    }
    OutcomeType::CleanWin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_correct_overtime_is_timeout() {
        assert_eq!(
            classify_outcome(false, true, false, 0.5),
            OutcomeType::Timeout
        );
    }

    #[test]
    fn not_correct_high_expectation_is_upset_loss() {
        assert_eq!(
            classify_outcome(false, false, false, 0.76),
            OutcomeType::UpsetLoss
        );
    }

    #[test]
    fn not_correct_low_expectation_is_expected_loss() {
        assert_eq!(
            classify_outcome(false, false, false, 0.4),
            OutcomeType::ExpectedLoss
        );
    }

    #[test]
    fn correct_guessed_is_lucky_win() {
        assert_eq!(
            classify_outcome(true, false, true, 0.5),
            OutcomeType::LuckyWin
        );
    }

    #[test]
    fn correct_overtime_is_slow_win() {
        assert_eq!(
            classify_outcome(true, true, false, 0.5),
            OutcomeType::SlowWin
        );
    }

    #[test]
    fn correct_on_time_not_guessed_is_clean_win() {
        assert_eq!(
            classify_outcome(true, false, false, 0.5),
            OutcomeType::CleanWin
        );
    }

    #[test]
    fn guessed_takes_priority_over_overtime() {
        assert_eq!(
            classify_outcome(true, true, true, 0.5),
            OutcomeType::LuckyWin
        );
    }
}
