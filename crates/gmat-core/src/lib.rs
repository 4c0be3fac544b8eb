//! The adaptive learning core: per-learner rating dynamics, question
//! selection, spaced-repetition scheduling, and mastery-gate evaluation for
//! a GMAT practice system.
//!
//! This crate owns the pure numeric algorithms and the orchestration that
//! ties them together; it knows nothing about HTTP, the web client, AI
//! question generation, or concrete storage. Those are consumed as
//! repository ports (see [`ports`]) implemented elsewhere.

pub mod domain;
pub mod error;
pub mod gating;
pub mod matching;
pub mod pipeline;
pub mod ports;
pub mod rating;
pub mod scheduling;
pub mod selection;
pub mod xp;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use domain::{
    AtomId, AtomMastery, Attempt, AttemptInput, AttemptResult, ConfidenceLevel, Gate,
    GateEvaluationResult, GateStatus, GateSummary, ItemType, MasteryLevel, MatchCategory, Mode,
    OutcomeType, PassedGate, PassingMode, Question, QuestionId, QuestionSource, RatingDelta,
    RatingRecord, Requirement, RequirementProgress, ReviewItem, ScopeKey, ScopeType,
    SelectedQuestion, SelectionCriteria, SelectionReason, StreakType, UserProgressionState,
    DEFAULT_DEVIATION, DEFAULT_RATING, MAX_DEVIATION, MAX_RATING, MIN_DEVIATION, MIN_RATING,
};

pub use error::{CoreError, CoreResult};

pub use ports::{AttemptRepo, MasteryRepo, QuestionRepo, RatingRepo, ReviewRepo, UserStateRepo};

pub use pipeline::AttemptPipeline;

pub use rating::{elo_to_gmat, gmat_to_elo, RatingEngine};

pub use gating::GateEvaluator;

pub use scheduling::ReviewScheduler;

pub use selection::Selector;

pub use domain::progression::{level_for_xp, level_name, LEVELS};

pub use xp::{calculate_xp, ProgressionService, XpInputs};

pub use matching::{
    difficulty_band, find_difficulty_for_win_rate, is_appropriate, match_category, match_score,
    mode_profile, DifficultyBand, ModeProfile,
};
