use async_trait::async_trait;

use crate::domain::{AtomId, Question, QuestionId};
use crate::error::CoreResult;

/// The question bank, treated as an external collaborator (§1). Concrete
/// storage and schema are out of scope for this core.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait QuestionRepo: Send + Sync {
    async fn get_question(&self, id: &QuestionId) -> CoreResult<Question>;

    /// Questions linked to any of `atom_ids`.
    async fn get_questions_for_atoms(&self, atom_ids: &[AtomId]) -> CoreResult<Vec<Question>>;

    /// Questions in `section_code` (or all sections if `None`) whose
    /// `difficulty_rating` falls in `[band_min, band_max]`.
    async fn get_questions_in_band(
        &self,
        section_code: Option<&str>,
        band_min: i32,
        band_max: i32,
    ) -> CoreResult<Vec<Question>>;

    /// Bumps `times_served` for a question that was just selected.
    async fn record_served(&self, id: &QuestionId) -> CoreResult<()>;
}
