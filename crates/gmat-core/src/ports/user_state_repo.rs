use async_trait::async_trait;

use crate::domain::{Gate, UserProgressionState};
use crate::error::CoreResult;

/// A single user-state row holding `total_xp`/`current_level`, plus the
/// read-only gate definitions consulted by the Gate Evaluator (§6).
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait UserStateRepo: Send + Sync {
    async fn get_or_create(&self, user_id: &str) -> CoreResult<UserProgressionState>;

    async fn save(&self, state: &UserProgressionState) -> CoreResult<()>;

    async fn get_gate(&self, gate_id: &str) -> CoreResult<Gate>;
}
