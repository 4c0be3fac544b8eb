//! Spaced-repetition scheduling (C4, §4.4): the pure SM-2 transition plus
//! the service that threads it through `ReviewRepo`.

pub mod sm2;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::domain::review::ItemType;
use crate::domain::ReviewItem;
use crate::error::CoreResult;
use crate::ports::ReviewRepo;
pub use sm2::{apply_review, Sm2Update};

pub struct ReviewScheduler {
    repo: Arc<dyn ReviewRepo>,
}

impl ReviewScheduler {
    pub fn new(repo: Arc<dyn ReviewRepo>) -> Self {
        Self { repo }
    }

    /// `get_or_create` for the item tied to a (user, item) pair, creating a
    /// fresh SM-2 state the first time an atom or question appears in
    /// practice (§3 "Lifecycles").
    pub async fn ensure_item(
        &self,
        user_id: &str,
        item_type: ItemType,
        item_id: &str,
    ) -> CoreResult<ReviewItem> {
        let today = Utc::now().date_naive();
        self.repo.get_or_create(user_id, item_type, item_id, today).await
    }

    /// External interface `process_review(review_id, quality)` (§6).
    #[tracing::instrument(skip(self), fields(review_id, quality))]
    pub async fn process_review(&self, review_id: &str, quality: u8) -> CoreResult<ReviewItem> {
        self.process_review_on(review_id, quality, Utc::now().date_naive())
            .await
    }

    /// Same as `process_review` but with an explicit `today`, so tests and
    /// the CLI can drive it without depending on wall-clock time.
    pub async fn process_review_on(
        &self,
        review_id: &str,
        quality: u8,
        today: NaiveDate,
    ) -> CoreResult<ReviewItem> {
        let mut item = self.repo.get_by_id(review_id).await?;
        let update = apply_review(
            item.ease_factor,
            item.interval_days,
            item.repetitions,
            quality,
            today,
        );
        item.ease_factor = update.ease_factor;
        item.interval_days = update.interval_days;
        item.repetitions = update.repetitions;
        item.next_review_date = update.next_review_date;

        self.repo.save(&item).await?;
        Ok(item)
    }

    /// External interface `due_reviews(limit)` (§6).
    pub async fn due_reviews(&self, user_id: &str, limit: usize) -> CoreResult<Vec<ReviewItem>> {
        self.due_reviews_on(user_id, limit, Utc::now().date_naive())
            .await
    }

    pub async fn due_reviews_on(
        &self,
        user_id: &str,
        limit: usize,
        today: NaiveDate,
    ) -> CoreResult<Vec<ReviewItem>> {
        self.repo.due_reviews(user_id, today, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::DEFAULT_EASE_FACTOR;
    use crate::ports::MockReviewRepo;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    fn fresh_item() -> ReviewItem {
        ReviewItem::new_for_item("u1", ItemType::Atom, "atom-1", day(0))
    }

    #[tokio::test]
    async fn process_review_persists_the_updated_state() {
        let mut mock = MockReviewRepo::new();
        mock.expect_get_by_id()
            .withf(|id| id == "review-atom-atom-1")
            .returning(|_| Ok(fresh_item()));
        mock.expect_save()
            .withf(|item: &ReviewItem| item.repetitions == 1 && item.interval_days == 1)
            .returning(|_| Ok(()));

        let scheduler = ReviewScheduler::new(Arc::new(mock));
        let updated = scheduler
            .process_review_on("review-atom-atom-1", 4, day(0))
            .await
            .unwrap();

        assert_eq!(updated.repetitions, 1);
        assert_eq!(updated.ease_factor, DEFAULT_EASE_FACTOR + 0.1);
    }

    #[tokio::test]
    async fn due_reviews_delegates_to_repo_with_today() {
        let mut mock = MockReviewRepo::new();
        mock.expect_due_reviews()
            .withf(|_, today, limit| *today == day(5) && *limit == 10)
            .returning(|_, _, _| Ok(vec![]));

        let scheduler = ReviewScheduler::new(Arc::new(mock));
        let due = scheduler.due_reviews_on("u1", 10, day(5)).await.unwrap();
        assert!(due.is_empty());
    }
}
