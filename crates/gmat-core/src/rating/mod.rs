//! Pure rating mathematics (C1, §4.1) and the ELO↔GMAT conversion that
//! rides alongside it.

pub mod elo_gmat;
pub mod engine;
pub mod service;

pub use elo_gmat::{elo_to_gmat, gmat_to_elo};
pub use engine::{
    expected_win_rate, k_factor, next_deviation, update_rating, AttemptFacts, RatingUpdate,
    GRIND_WINDOW,
};
pub use service::{RatingEngine, ScopeRatingOutcome};
