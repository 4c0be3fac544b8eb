//! Domain model for the adaptive learning core: ratings, questions,
//! attempts, mastery, review state, gates, and progression.

pub mod attempt;
pub mod gate;
pub mod mastery;
pub mod mode;
pub mod outcome;
pub mod pipeline;
pub mod progression;
pub mod question;
pub mod rating;
pub mod review;
pub mod selection;

pub use attempt::Attempt;
pub use gate::{Gate, GateEvaluationResult, GateStatus, GateSummary, PassingMode, Requirement, RequirementProgress};
pub use mastery::{AtomMastery, MasteryLevel, RECENT_WINDOW};
pub use mode::{MatchCategory, Mode};
pub use outcome::{classify_outcome, OutcomeType};
pub use pipeline::{AttemptInput, AttemptResult, PassedGate, RatingDelta};
pub use progression::{level_for_xp, level_name, UserProgressionState, LEVELS};
pub use question::{AtomId, Question, QuestionId, QuestionSource};
pub use rating::{
    ConfidenceLevel, RatingRecord, ScopeKey, ScopeType, StreakType, DEFAULT_DEVIATION,
    DEFAULT_RATING, MAX_DEVIATION, MAX_RATING, MIN_DEVIATION, MIN_RATING,
};
pub use review::{ItemType, ReviewItem, DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR};
pub use selection::{SelectedQuestion, SelectionCriteria, SelectionReason};
