//! Question selection (C3, §4.3): mode-aware distribution planning,
//! per-candidate scoring, and the service that wires both to the
//! repository ports.

pub mod scoring;
pub mod selector;

pub use scoring::{score_candidate, selection_plan, SelectionPlan};
pub use selector::Selector;
