use async_trait::async_trait;

use crate::domain::{Attempt, AtomId};
use crate::error::CoreResult;

/// Append-only attempt log (§3 "Attempts are append-only").
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AttemptRepo: Send + Sync {
    async fn record(&self, attempt: &Attempt) -> CoreResult<()>;

    /// The `limit` most recent attempts touching any of `atom_ids`, newest
    /// first. Backs the Gate Evaluator's Timing requirement, which needs
    /// per-attempt timing facts that don't live on `AtomMastery`.
    async fn get_recent_for_atoms(
        &self,
        user_id: &str,
        atom_ids: &[AtomId],
        limit: usize,
    ) -> CoreResult<Vec<Attempt>>;
}
