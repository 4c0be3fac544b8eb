//! The requirement evaluator (§4.5). One exhaustively-matched free
//! function per SPEC_FULL §4.5's implementation note: `Requirement` is a
//! tagged union, not a trait object, so adding a new kind is a
//! compiler-checked single-site change.

use crate::domain::gate::{Gate, GateStatus, PassingMode, Requirement, WeightedRequirement};
use crate::domain::gate::{GateEvaluationResult, RequirementProgress};

use super::snapshot::MasterySnapshot;

fn status_for(current: f64, required: f64, passed: bool) -> GateStatus {
    if passed {
        GateStatus::Passed
    } else if current <= 0.0 {
        GateStatus::Locked
    } else {
        let _ = required;
        GateStatus::InProgress
    }
}

fn percent_of(current: f64, required: f64) -> f64 {
    if required <= 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current / required * 100.0).clamp(0.0, 100.0)
}

fn std_dev(results: &[bool]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let values: Vec<f64> = results.iter().map(|b| if *b { 1.0 } else { 0.0 }).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn windowed(results: &[bool], window_size: usize) -> &[bool] {
    if results.len() <= window_size {
        results
    } else {
        &results[results.len() - window_size..]
    }
}

/// Evaluates one `Requirement` against a `MasterySnapshot`, returning the
/// full progress tree (§4.5 "Progress reporting").
pub fn evaluate(requirement: &Requirement, snapshot: &MasterySnapshot) -> RequirementProgress {
    match requirement {
        Requirement::Accuracy {
            threshold,
            min_attempts,
            window_size,
            atom_ids,
            description,
        } => {
            let atoms = snapshot.filtered_atoms(atom_ids);
            let (correct, total) = match window_size {
                Some(w) => atoms.iter().fold((0u32, 0u32), |(c, t), atom| {
                    let window = windowed(&atom.recent_attempts, *w);
                    let wc = window.iter().filter(|x| **x).count() as u32;
                    (c + wc, t + window.len() as u32)
                }),
                None => atoms
                    .iter()
                    .fold((0u32, 0u32), |(c, t), atom| {
                        (c + atom.attempts_correct, t + atom.attempts_total)
                    }),
            };
            let accuracy = if total == 0 { 0.0 } else { correct as f64 / total as f64 };
            let passed = accuracy >= *threshold && total >= *min_attempts;
            RequirementProgress {
                status: status_for(accuracy, *threshold, passed),
                current_value: accuracy,
                required_value: *threshold,
                percent_complete: percent_of(accuracy, *threshold)
                    .min(percent_of(total as f64, *min_attempts as f64)),
                description: description.clone(),
                details: Vec::new(),
            }
        }

        Requirement::Consistency {
            threshold,
            window_size,
            description,
        } => {
            let flattened: Vec<bool> = snapshot
                .atoms
                .iter()
                .flat_map(|atom| windowed(&atom.recent_attempts, *window_size).iter().copied())
                .collect();
            let sd = std_dev(&flattened);
            let passed = sd <= *threshold;
            RequirementProgress {
                status: status_for(if sd > 0.0 { 1.0 } else { 0.0 }, 0.0, passed),
                current_value: sd,
                required_value: *threshold,
                // Lower is better here; report 100% once under threshold.
                percent_complete: if passed {
                    100.0
                } else if *threshold <= 0.0 {
                    0.0
                } else {
                    (100.0 * (1.0 - (sd - threshold) / threshold.max(0.01))).clamp(0.0, 99.0)
                },
                description: description.clone(),
                details: Vec::new(),
            }
        }

        Requirement::Volume {
            threshold,
            correct_only,
            description,
        } => {
            let total: u32 = snapshot.atoms.iter().map(|a| {
                if *correct_only {
                    a.attempts_correct
                } else {
                    a.attempts_total
                }
            }).sum();
            let passed = total >= *threshold;
            RequirementProgress {
                status: status_for(total as f64, *threshold as f64, passed),
                current_value: total as f64,
                required_value: *threshold as f64,
                percent_complete: percent_of(total as f64, *threshold as f64),
                description: description.clone(),
                details: Vec::new(),
            }
        }

        Requirement::Timing {
            threshold,
            budget_multiplier,
            description,
        } => {
            let correct: Vec<&crate::domain::Attempt> = snapshot
                .recent_attempts
                .iter()
                .filter(|a| a.is_correct)
                .collect();
            let within_budget = correct
                .iter()
                .filter(|a| a.time_spent_sec <= a.time_budget_sec * budget_multiplier)
                .count();
            let fraction = if correct.is_empty() {
                0.0
            } else {
                within_budget as f64 / correct.len() as f64
            };
            let passed = fraction >= *threshold;
            RequirementProgress {
                status: status_for(fraction, *threshold, passed),
                current_value: fraction,
                required_value: *threshold,
                percent_complete: percent_of(fraction, *threshold),
                description: description.clone(),
                details: Vec::new(),
            }
        }

        Requirement::Streak {
            threshold,
            description,
        } => {
            let best = snapshot
                .atoms
                .iter()
                .map(|a| a.current_streak())
                .max()
                .unwrap_or(0);
            let passed = best >= *threshold;
            RequirementProgress {
                status: status_for(best as f64, *threshold as f64, passed),
                current_value: best as f64,
                required_value: *threshold as f64,
                percent_complete: percent_of(best as f64, *threshold as f64),
                description: description.clone(),
                details: Vec::new(),
            }
        }

        Requirement::Composite {
            requirements,
            passing_mode,
            threshold,
            description,
        } => evaluate_composite(requirements, *passing_mode, *threshold, description, snapshot),
    }
}

fn evaluate_composite(
    requirements: &[WeightedRequirement],
    passing_mode: PassingMode,
    threshold: Option<f64>,
    description: &str,
    snapshot: &MasterySnapshot,
) -> RequirementProgress {
    let details: Vec<RequirementProgress> = requirements
        .iter()
        .map(|wr| evaluate(&wr.requirement, snapshot))
        .collect();

    let passed_flags: Vec<bool> = details
        .iter()
        .map(|d| d.status == GateStatus::Passed)
        .collect();

    let (passed, current_value, required_value) = match passing_mode {
        PassingMode::All => (
            passed_flags.iter().all(|p| *p),
            passed_flags.iter().filter(|p| **p).count() as f64,
            passed_flags.len() as f64,
        ),
        PassingMode::Any => (
            passed_flags.iter().any(|p| *p),
            passed_flags.iter().filter(|p| **p).count() as f64,
            1.0,
        ),
        PassingMode::Weighted => {
            let weight_sum: f64 = requirements
                .iter()
                .zip(passed_flags.iter())
                .filter(|(_, p)| **p)
                .map(|(wr, _)| wr.weight)
                .sum();
            let required = threshold.unwrap_or(requirements.iter().map(|r| r.weight).sum());
            (weight_sum >= required, weight_sum, required)
        }
    };

    let percent_complete = if details.is_empty() {
        0.0
    } else {
        details.iter().map(|d| d.percent_complete).sum::<f64>() / details.len() as f64
    };

    RequirementProgress {
        status: status_for(current_value, required_value, passed),
        current_value,
        required_value,
        percent_complete: percent_complete.clamp(0.0, 100.0),
        description: description.to_string(),
        details,
    }
}

/// Evaluates a whole `Gate` by treating its top-level requirements as an
/// implicit composite with the gate's own `passing_mode` (§3: gates have no
/// nested `Requirement::Composite` wrapper at the root).
pub fn evaluate_gate(gate: &Gate, snapshot: &MasterySnapshot) -> GateEvaluationResult {
    let weighted: Vec<WeightedRequirement> = gate
        .requirements
        .iter()
        .cloned()
        .map(WeightedRequirement::unweighted)
        .collect();

    let progress = evaluate_composite(
        &weighted,
        gate.passing_mode,
        gate.weighted_threshold,
        &gate.description,
        snapshot,
    );

    GateEvaluationResult {
        gate_id: gate.id.clone(),
        status: progress.status,
        percent_complete: progress.percent_complete,
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mastery::AtomMastery;

    fn mastered_atom(atom_id: &str) -> AtomMastery {
        let mut atom = AtomMastery::new("u1", atom_id);
        // 5/6 correct (83%), trailing streak of 4.
        for correct in [true, false, true, true, true, true] {
            atom.record_attempt(correct);
        }
        atom
    }

    #[test]
    fn default_mastery_gate_passes_on_the_worked_example() {
        // SPEC_FULL §8 scenario 5.
        let gate = Gate::default_mastery_gate(&"atom-x".to_string());
        let snapshot = MasterySnapshot {
            atoms: vec![mastered_atom("atom-x")],
            recent_attempts: Vec::new(),
        };

        let result = evaluate_gate(&gate, &snapshot);
        assert_eq!(result.status, GateStatus::Passed);
        assert_eq!(result.percent_complete, 100.0);
    }

    #[test]
    fn locked_when_no_attempts_yet() {
        let gate = Gate::default_mastery_gate(&"atom-x".to_string());
        let snapshot = MasterySnapshot {
            atoms: vec![AtomMastery::new("u1", "atom-x")],
            recent_attempts: Vec::new(),
        };
        let result = evaluate_gate(&gate, &snapshot);
        assert_eq!(result.status, GateStatus::Locked);
    }

    #[test]
    fn any_mode_passes_with_one_satisfied_child() {
        let requirement = Requirement::Composite {
            requirements: vec![
                WeightedRequirement::unweighted(Requirement::Volume {
                    threshold: 1000,
                    correct_only: false,
                    description: "unreachable volume".into(),
                }),
                WeightedRequirement::unweighted(Requirement::Streak {
                    threshold: 3,
                    description: "streak of 3".into(),
                }),
            ],
            passing_mode: PassingMode::Any,
            threshold: None,
            description: "any".into(),
        };
        let snapshot = MasterySnapshot {
            atoms: vec![mastered_atom("atom-x")],
            recent_attempts: Vec::new(),
        };
        let progress = evaluate(&requirement, &snapshot);
        assert_eq!(progress.status, GateStatus::Passed);
    }

    #[test]
    fn weighted_mode_sums_passed_weights() {
        let requirement = Requirement::Composite {
            requirements: vec![
                WeightedRequirement {
                    requirement: Requirement::Streak {
                        threshold: 3,
                        description: "streak".into(),
                    },
                    weight: 0.6,
                },
                WeightedRequirement {
                    requirement: Requirement::Volume {
                        threshold: 1000,
                        correct_only: false,
                        description: "volume".into(),
                    },
                    weight: 0.4,
                },
            ],
            passing_mode: PassingMode::Weighted,
            threshold: Some(0.5),
            description: "weighted".into(),
        };
        let snapshot = MasterySnapshot {
            atoms: vec![mastered_atom("atom-x")],
            recent_attempts: Vec::new(),
        };
        let progress = evaluate(&requirement, &snapshot);
        assert_eq!(progress.status, GateStatus::Passed);
        assert_eq!(progress.current_value, 0.6);
    }

    #[test]
    fn percent_complete_is_always_clamped() {
        let requirement = Requirement::Volume {
            threshold: 5,
            correct_only: false,
            description: "vol".into(),
        };
        let snapshot = MasterySnapshot {
            atoms: vec![mastered_atom("atom-x")],
            recent_attempts: Vec::new(),
        };
        let progress = evaluate(&requirement, &snapshot);
        assert!(progress.percent_complete <= 100.0);
        assert!(progress.percent_complete >= 0.0);
    }
}
