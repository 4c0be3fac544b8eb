//! Pure SM-2 transition function (§4.4). Structural analog of the
//! reference system's FSRS state update: read the current state, branch on
//! grade, compute the next state purely — only the formula differs.

use chrono::NaiveDate;

use crate::domain::review::MIN_EASE_FACTOR;

/// The result of folding one `quality` grade into a review item's prior
/// `(ease_factor, interval_days, repetitions)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2Update {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review_date: NaiveDate,
}

/// Applies one SM-2 review grade (§4.4 "Algorithm"). `quality` is clamped
/// into `0..=5` defensively; callers are expected to validate it upstream.
pub fn apply_review(
    ease_factor: f64,
    interval_days: u32,
    repetitions: u32,
    quality: u8,
    today: NaiveDate,
) -> Sm2Update {
    let q = quality.min(5);

    let (new_interval, new_repetitions) = if q < 3 {
        (1, 0)
    } else if repetitions == 0 {
        (1, repetitions + 1)
    } else if repetitions == 1 {
        (6, repetitions + 1)
    } else {
        let interval = (interval_days as f64 * ease_factor).round() as u32;
        (interval.max(1), repetitions + 1)
    };

    let q = q as f64;
    let new_ease = (ease_factor + 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02)).max(MIN_EASE_FACTOR);

    Sm2Update {
        ease_factor: new_ease,
        interval_days: new_interval,
        repetitions: new_repetitions,
        next_review_date: today + chrono::Duration::days(new_interval as i64),
    }
}
