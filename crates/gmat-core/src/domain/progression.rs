use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::question::AtomId;

/// Authoritative level thresholds and names (§4.6, §6). Index `i` is level
/// `i + 1`.
pub const LEVELS: [(u32, &str); 10] = [
    (0, "Orientation"),
    (500, "Foundations"),
    (1500, "Recognition"),
    (3000, "Easy Mastery"),
    (5000, "Medium Control"),
    (8000, "Strategy & Abandonment"),
    (12000, "Hard Exposure"),
    (17000, "Consistency"),
    (23000, "Elite Execution"),
    (30000, "Test-Day Operator"),
];

/// The level (1-indexed) whose `min_xp` is the largest not exceeding
/// `total_xp`.
pub fn level_for_xp(total_xp: u32) -> u32 {
    LEVELS
        .iter()
        .enumerate()
        .rev()
        .find(|(_, (min_xp, _))| *min_xp <= total_xp)
        .map(|(i, _)| i as u32 + 1)
        .unwrap_or(1)
}

pub fn level_name(level: u32) -> &'static str {
    LEVELS
        .get((level.saturating_sub(1)) as usize)
        .map(|(_, name)| *name)
        .unwrap_or("Test-Day Operator")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgressionState {
    pub user_id: String,
    pub total_xp: u32,
    pub current_level: u32,
    pub passed_gate_ids: HashSet<String>,
    pub mastered_atom_ids: HashSet<AtomId>,
}

impl UserProgressionState {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_xp: 0,
            current_level: 1,
            passed_gate_ids: HashSet::new(),
            mastered_atom_ids: HashSet::new(),
        }
    }

    /// Awards XP and returns every level threshold crossed, in ascending
    /// order (one `level_up` event per crossed threshold per §4.6).
    pub fn award_xp(&mut self, xp: u32) -> Vec<u32> {
        let previous_level = self.current_level;
        self.total_xp += xp;
        self.current_level = level_for_xp(self.total_xp);

        (previous_level + 1..=self.current_level).collect()
    }
}
