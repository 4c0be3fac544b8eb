use async_trait::async_trait;

use crate::domain::{RatingRecord, ScopeKey};
use crate::error::CoreResult;

/// One row per `(user, scope_type, scope_code)` rating (§6). Rating records
/// are created lazily on first attempt in their scope.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RatingRepo: Send + Sync {
    /// Returns the current record for `scope`, or a freshly-initialized one
    /// if the learner has never played in it.
    async fn get_or_create(&self, user_id: &str, scope: &ScopeKey) -> CoreResult<RatingRecord>;

    /// Persists every updated record in one atomic batch (§5's
    /// "read all, then write all" boundary).
    async fn save_all(&self, records: &[RatingRecord]) -> CoreResult<()>;
}
