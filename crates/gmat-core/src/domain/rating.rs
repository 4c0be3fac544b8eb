use serde::{Deserialize, Serialize};

/// Authoritative rating constants (§4.1). Any function computing a rating
/// update must use exactly these bounds.
pub const DEFAULT_RATING: i32 = 500;
pub const MIN_RATING: i32 = 100;
pub const MAX_RATING: i32 = 900;
pub const DEFAULT_DEVIATION: i32 = 350;
pub const MIN_DEVIATION: i32 = 30;
pub const MAX_DEVIATION: i32 = 500;

/// The slice a rating is maintained over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    Global,
    Section,
    Topic,
    QuestionType,
    AtomCluster,
}

impl ScopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Section => "section",
            Self::Topic => "topic",
            Self::QuestionType => "question_type",
            Self::AtomCluster => "atom_cluster",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "global" => Some(Self::Global),
            "section" => Some(Self::Section),
            "topic" => Some(Self::Topic),
            "question_type" => Some(Self::QuestionType),
            "atom_cluster" => Some(Self::AtomCluster),
            _ => None,
        }
    }
}

/// `(scope_type, scope_code)`. `scope_code` is `None` only for `Global`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey {
    pub scope_type: ScopeType,
    pub scope_code: Option<String>,
}

impl ScopeKey {
    pub fn global() -> Self {
        Self {
            scope_type: ScopeType::Global,
            scope_code: None,
        }
    }

    pub fn new(scope_type: ScopeType, scope_code: impl Into<String>) -> Self {
        Self {
            scope_type,
            scope_code: Some(scope_code.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakType {
    Win,
    Loss,
    None,
}

/// Derived purely from `games_played`; never stored independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Provisional,
    Establishing,
    Confident,
    Stable,
}

impl ConfidenceLevel {
    pub fn from_games_played(games_played: u32) -> Self {
        match games_played {
            0..=9 => Self::Provisional,
            10..=29 => Self::Establishing,
            30..=99 => Self::Confident,
            _ => Self::Stable,
        }
    }
}

/// A rating record for one learner in one scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: String,
    pub scope: ScopeKey,
    pub rating: i32,
    pub deviation: i32,
    pub games_played: u32,
    pub games_won: u32,
    pub peak_rating: i32,
    pub current_streak: u32,
    pub streak_type: StreakType,
    /// Oldest-first; capped at 10, oldest evicted on push.
    pub last_10_results: Vec<bool>,
}

impl RatingRecord {
    /// A fresh record for a scope the learner has never played in.
    pub fn new(user_id: impl Into<String>, scope: ScopeKey) -> Self {
        Self {
            user_id: user_id.into(),
            scope,
            rating: DEFAULT_RATING,
            deviation: DEFAULT_DEVIATION,
            games_played: 0,
            games_won: 0,
            peak_rating: DEFAULT_RATING,
            current_streak: 0,
            streak_type: StreakType::None,
            last_10_results: Vec::new(),
        }
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_games_played(self.games_played)
    }

    /// Push a correctness result onto the trailing-10 window, evicting the
    /// oldest entry once full.
    pub fn push_result(&mut self, correct: bool) {
        self.last_10_results.push(correct);
        if self.last_10_results.len() > 10 {
            self.last_10_results.remove(0);
        }
    }

    /// Count of `true` entries in the trailing-10 window.
    pub fn recent_correct_count(&self) -> usize {
        self.last_10_results.iter().filter(|c| **c).count()
    }

    /// Folds one attempt's outcome into this record in place: bumps
    /// `games_played`/`games_won`, sets `rating` to `new_rating`, updates
    /// `peak_rating`, pushes onto the trailing window, and recomputes the
    /// win/loss streak (§4.1 "Update algorithm"). Does not touch
    /// `deviation` — callers apply `next_deviation` separately since it
    /// depends on the post-update `games_played`.
    pub fn apply_attempt_result(&mut self, is_correct: bool, new_rating: i32) {
        self.games_played += 1;
        if is_correct {
            self.games_won += 1;
        }
        self.rating = new_rating;
        self.peak_rating = self.peak_rating.max(self.rating);
        self.push_result(is_correct);

        let continuing = matches!(
            (self.streak_type, is_correct),
            (StreakType::Win, true) | (StreakType::Loss, false)
        );
        if continuing {
            self.current_streak += 1;
        } else {
            self.current_streak = 1;
            self.streak_type = if is_correct {
                StreakType::Win
            } else {
                StreakType::Loss
            };
        }
    }
}
