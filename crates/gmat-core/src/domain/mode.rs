use serde::{Deserialize, Serialize};

/// A selection regime (GLOSSARY: "Mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Build,
    Prove,
    Review,
    Diagnostic,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Build => "build",
            Mode::Prove => "prove",
            Mode::Review => "review",
            Mode::Diagnostic => "diagnostic",
        }
    }

    /// "prove-like" training modes multiply running XP by 1.5 (§4.6).
    pub fn is_prove_like(&self, target_win_rate: f64) -> bool {
        let _ = self;
        target_win_rate <= 0.55
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCategory {
    Easy,
    Optimal,
    Hard,
    Stretch,
}

impl MatchCategory {
    pub fn from_difficulty_delta(difficulty_minus_rating: i32) -> Self {
        match difficulty_minus_rating {
            d if d < -100 => MatchCategory::Easy,
            -100..=100 => MatchCategory::Optimal,
            d if d <= 200 => MatchCategory::Hard,
            _ => MatchCategory::Stretch,
        }
    }
}
