use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Question,
    Atom,
}

/// SM-2 scheduling state for one item (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: String,
    pub user_id: String,
    pub item_type: ItemType,
    pub item_id: String,
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review_date: NaiveDate,
    pub priority: f64,
}

impl ReviewItem {
    /// A freshly-created item, as created the moment an atom or question
    /// first appears in practice (§3 "Lifecycles").
    pub fn new_for_item(
        user_id: impl Into<String>,
        item_type: ItemType,
        item_id: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        let item_id = item_id.into();
        let type_tag = match item_type {
            ItemType::Question => "question",
            ItemType::Atom => "atom",
        };
        Self {
            id: format!("review-{type_tag}-{item_id}"),
            user_id: user_id.into(),
            item_type,
            item_id,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            next_review_date: today,
            priority: 0.0,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.next_review_date < today
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_date <= today
    }
}
