//! Gate evaluation (C5, §4.5): composing leaf requirement evaluators into
//! weighted/quorum mastery gates.

pub mod evaluator;
pub mod snapshot;

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::gate::{Gate, GateEvaluationResult, GateSummary, Requirement};
use crate::domain::question::AtomId;
use crate::error::CoreResult;
use crate::ports::{AttemptRepo, MasteryRepo, UserStateRepo};
pub use evaluator::{evaluate, evaluate_gate as evaluate_gate_pure};
pub use snapshot::MasterySnapshot;

/// How many recent attempts to pull per gate evaluation for the Timing
/// requirement. Generous enough to cover any realistic `window_size`.
const TIMING_LOOKBACK: usize = 50;

fn collect_atom_ids(requirements: &[Requirement], into: &mut HashSet<AtomId>) {
    for requirement in requirements {
        match requirement {
            Requirement::Accuracy { atom_ids, .. } => {
                if let Some(ids) = atom_ids {
                    into.extend(ids.iter().cloned());
                }
            }
            Requirement::Composite { requirements, .. } => {
                let nested: Vec<Requirement> =
                    requirements.iter().map(|wr| wr.requirement.clone()).collect();
                collect_atom_ids(&nested, into);
            }
            _ => {}
        }
    }
}

/// The atom set a gate's evaluation needs mastery/attempt data for: its own
/// `atom_ids`, unioned with any atom-scoped `Accuracy` sub-requirements.
fn relevant_atom_ids(gate: &Gate) -> Vec<AtomId> {
    let mut set: HashSet<AtomId> = gate.atom_ids.iter().flatten().cloned().collect();
    collect_atom_ids(&gate.requirements, &mut set);
    set.into_iter().collect()
}

pub struct GateEvaluator {
    mastery_repo: Arc<dyn MasteryRepo>,
    attempt_repo: Arc<dyn AttemptRepo>,
    user_state_repo: Arc<dyn UserStateRepo>,
}

impl GateEvaluator {
    pub fn new(
        mastery_repo: Arc<dyn MasteryRepo>,
        attempt_repo: Arc<dyn AttemptRepo>,
        user_state_repo: Arc<dyn UserStateRepo>,
    ) -> Self {
        Self {
            mastery_repo,
            attempt_repo,
            user_state_repo,
        }
    }

    async fn snapshot_for(&self, user_id: &str, gate: &Gate) -> CoreResult<MasterySnapshot> {
        let atom_ids = relevant_atom_ids(gate);
        if atom_ids.is_empty() {
            return Ok(MasterySnapshot::default());
        }
        let atoms = self.mastery_repo.get_many(user_id, &atom_ids).await?;
        let recent_attempts = self
            .attempt_repo
            .get_recent_for_atoms(user_id, &atom_ids, TIMING_LOOKBACK)
            .await?;
        Ok(MasterySnapshot {
            atoms,
            recent_attempts,
        })
    }

    /// External interface `evaluate_gate(gate_id)` (§6).
    #[tracing::instrument(skip(self), fields(user_id, gate_id))]
    pub async fn evaluate_gate(
        &self,
        user_id: &str,
        gate_id: &str,
    ) -> CoreResult<GateEvaluationResult> {
        let gate = self.user_state_repo.get_gate(gate_id).await?;
        let snapshot = self.snapshot_for(user_id, &gate).await?;
        Ok(evaluator::evaluate_gate(&gate, &snapshot))
    }

    /// Evaluates the synthesized per-atom default mastery gate (§4.5) for
    /// `atom_id`, bypassing `UserStateRepo::get_gate` since this gate is a
    /// pure function of the atom id rather than an authored definition
    /// (§4.7 step 6).
    pub async fn evaluate_default_mastery_gate(
        &self,
        user_id: &str,
        atom_id: &AtomId,
    ) -> CoreResult<GateEvaluationResult> {
        let gate = Gate::default_mastery_gate(atom_id);
        let snapshot = self.snapshot_for(user_id, &gate).await?;
        Ok(evaluator::evaluate_gate(&gate, &snapshot))
    }

    /// External interface `gate_summary(gate_ids)` (§6).
    pub async fn gate_summary(
        &self,
        user_id: &str,
        gate_ids: &[String],
    ) -> CoreResult<GateSummary> {
        let mut results = Vec::with_capacity(gate_ids.len());
        for gate_id in gate_ids {
            results.push(self.evaluate_gate(user_id, gate_id).await?);
        }
        Ok(GateSummary { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mastery::AtomMastery;
    use crate::ports::{MockAttemptRepo, MockMasteryRepo, MockUserStateRepo};

    fn gate_for(atom_id: &str) -> Gate {
        Gate::default_mastery_gate(&atom_id.to_string())
    }

    #[tokio::test]
    async fn evaluate_gate_wires_mastery_and_attempt_data() {
        let atom_id = "atom-x".to_string();
        let mut mastery_repo = MockMasteryRepo::new();
        mastery_repo.expect_get_many().returning(move |_, ids| {
            let mut atom = AtomMastery::new("u1", ids[0].clone());
            for correct in [true, true, true, true, true] {
                atom.record_attempt(correct);
            }
            Ok(vec![atom])
        });

        let mut attempt_repo = MockAttemptRepo::new();
        attempt_repo
            .expect_get_recent_for_atoms()
            .returning(|_, _, _| Ok(vec![]));

        let mut user_state_repo = MockUserStateRepo::new();
        let gate = gate_for(&atom_id);
        user_state_repo
            .expect_get_gate()
            .returning(move |_| Ok(gate_for("atom-x")));
        let _ = &gate;

        let evaluator = GateEvaluator::new(
            Arc::new(mastery_repo),
            Arc::new(attempt_repo),
            Arc::new(user_state_repo),
        );

        let result = evaluator
            .evaluate_gate("u1", "mastery-atom-x")
            .await
            .unwrap();
        assert_eq!(result.status, crate::domain::GateStatus::Passed);
    }

    #[tokio::test]
    async fn gate_with_no_atoms_skips_repo_lookups() {
        let mastery_repo = MockMasteryRepo::new();
        let attempt_repo = MockAttemptRepo::new();
        let mut user_state_repo = MockUserStateRepo::new();
        user_state_repo.expect_get_gate().returning(|_| {
            Ok(Gate {
                id: "g1".into(),
                name: "g1".into(),
                description: "no atoms".into(),
                requirements: vec![Requirement::Volume {
                    threshold: 0,
                    correct_only: false,
                    description: "any volume".into(),
                }],
                atom_ids: None,
                passing_mode: crate::domain::PassingMode::All,
                weighted_threshold: None,
                xp_reward: 0,
            })
        });

        let evaluator = GateEvaluator::new(
            Arc::new(mastery_repo),
            Arc::new(attempt_repo),
            Arc::new(user_state_repo),
        );
        let result = evaluator.evaluate_gate("u1", "g1").await.unwrap();
        assert_eq!(result.status, crate::domain::GateStatus::Passed);
    }
}
