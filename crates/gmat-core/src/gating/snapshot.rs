//! The read model the Gate Evaluator's pure `evaluate` function consumes.
//! Assembling one of these is the only I/O-touching step in gate
//! evaluation; everything downstream is arithmetic.

use crate::domain::{Attempt, AtomId, AtomMastery};

/// Mastery and timing data for the atom set a gate (or one of its
/// requirements) is scoped to.
#[derive(Debug, Clone, Default)]
pub struct MasterySnapshot {
    pub atoms: Vec<AtomMastery>,
    /// Recent attempts touching any atom in `atoms`, newest first. Backs
    /// the Timing requirement, which needs per-attempt facts `AtomMastery`
    /// doesn't retain.
    pub recent_attempts: Vec<Attempt>,
}

impl MasterySnapshot {
    pub fn filtered_atoms<'a>(&'a self, atom_ids: &Option<Vec<AtomId>>) -> Vec<&'a AtomMastery> {
        match atom_ids {
            None => self.atoms.iter().collect(),
            Some(ids) => self
                .atoms
                .iter()
                .filter(|a| ids.contains(&a.atom_id))
                .collect(),
        }
    }
}
