use serde::{Deserialize, Serialize};

use super::question::AtomId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassingMode {
    All,
    Any,
    Weighted,
}

/// A leaf or composite gate requirement (§4.5). Modeled as a tagged union
/// rather than trait objects, per §9's direction to replace the source's
/// runtime type discrimination with an exhaustively-matched enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Requirement {
    Accuracy {
        threshold: f64,
        min_attempts: u32,
        window_size: Option<usize>,
        atom_ids: Option<Vec<AtomId>>,
        description: String,
    },
    Consistency {
        threshold: f64,
        window_size: usize,
        description: String,
    },
    Volume {
        threshold: u32,
        correct_only: bool,
        description: String,
    },
    Timing {
        threshold: f64,
        budget_multiplier: f64,
        description: String,
    },
    Streak {
        threshold: u32,
        description: String,
    },
    Composite {
        requirements: Vec<WeightedRequirement>,
        passing_mode: PassingMode,
        /// Only meaningful when `passing_mode = Weighted`.
        threshold: Option<f64>,
        description: String,
    },
}

/// A requirement paired with its contribution to a `Weighted` composite's
/// passing sum. Ignored by `All`/`Any` composites (every sub-requirement
/// counts as weight 1 there).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedRequirement {
    pub requirement: Requirement,
    pub weight: f64,
}

impl WeightedRequirement {
    pub fn unweighted(requirement: Requirement) -> Self {
        Self {
            requirement,
            weight: 1.0,
        }
    }
}

impl Requirement {
    pub fn description(&self) -> &str {
        match self {
            Requirement::Accuracy { description, .. }
            | Requirement::Consistency { description, .. }
            | Requirement::Volume { description, .. }
            | Requirement::Timing { description, .. }
            | Requirement::Streak { description, .. }
            | Requirement::Composite { description, .. } => description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub requirements: Vec<Requirement>,
    pub atom_ids: Option<Vec<AtomId>>,
    pub passing_mode: PassingMode,
    /// Only meaningful when `passing_mode = Weighted`; each top-level
    /// requirement counts with weight 1 against this threshold.
    pub weighted_threshold: Option<f64>,
    pub xp_reward: u32,
}

impl Gate {
    /// The default per-atom mastery gate (§4.5): composite-all of
    /// accuracy ≥ 0.80, volume ≥ 5, streak ≥ 3, rewarding 100 XP.
    pub fn default_mastery_gate(atom_id: &AtomId) -> Self {
        Self {
            id: format!("mastery-{atom_id}"),
            name: format!("Mastery: {atom_id}"),
            description: "Default per-atom mastery gate".to_string(),
            requirements: vec![
                Requirement::Accuracy {
                    threshold: 0.80,
                    min_attempts: 1,
                    window_size: None,
                    atom_ids: Some(vec![atom_id.clone()]),
                    description: "Accuracy at least 80%".to_string(),
                },
                Requirement::Volume {
                    threshold: 5,
                    correct_only: false,
                    description: "At least 5 attempts".to_string(),
                },
                Requirement::Streak {
                    threshold: 3,
                    description: "A trailing streak of at least 3".to_string(),
                },
            ],
            atom_ids: Some(vec![atom_id.clone()]),
            passing_mode: PassingMode::All,
            weighted_threshold: None,
            xp_reward: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Locked,
    InProgress,
    Passed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementProgress {
    pub status: GateStatus,
    pub current_value: f64,
    pub required_value: f64,
    pub percent_complete: f64,
    pub description: String,
    pub details: Vec<RequirementProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateEvaluationResult {
    pub gate_id: String,
    pub status: GateStatus,
    pub percent_complete: f64,
    pub progress: RequirementProgress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSummary {
    pub results: Vec<GateEvaluationResult>,
}
