use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{ItemType, ReviewItem};
use crate::error::CoreResult;

/// One row per review item (§6).
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ReviewRepo: Send + Sync {
    async fn get_or_create(
        &self,
        user_id: &str,
        item_type: ItemType,
        item_id: &str,
        today: NaiveDate,
    ) -> CoreResult<ReviewItem>;

    /// Looks a review item up by its own id, for the `process_review`
    /// external interface (§6), which addresses items by `review_id` rather
    /// than `(user, item_type, item_id)`. `NotFound` if unknown.
    async fn get_by_id(&self, review_id: &str) -> CoreResult<ReviewItem>;

    async fn save(&self, item: &ReviewItem) -> CoreResult<()>;

    /// Items with `next_review_date <= today`, ordered by
    /// `(priority desc, next_review_date asc)`, capped at `limit`.
    async fn due_reviews(
        &self,
        user_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> CoreResult<Vec<ReviewItem>>;
}
