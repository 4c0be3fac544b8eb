use async_trait::async_trait;

use crate::domain::{AtomId, AtomMastery};
use crate::error::CoreResult;

/// One row per `(user, atom_id)` mastery record (§6).
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait MasteryRepo: Send + Sync {
    async fn get_or_create(&self, user_id: &str, atom_id: &AtomId) -> CoreResult<AtomMastery>;

    async fn save(&self, mastery: &AtomMastery) -> CoreResult<()>;

    /// Mastery levels for the atoms of interest, used to derive the default
    /// `weakness_atom_ids` set (§4.3: atoms at `learning` or `reviewing`).
    async fn get_many(&self, user_id: &str, atom_ids: &[AtomId]) -> CoreResult<Vec<AtomMastery>>;
}
