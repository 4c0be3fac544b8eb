//! `Mutex`/`RwLock<HashMap<..>>`-backed implementations of the six
//! repository ports, structurally grounded in the reference system's own
//! in-memory simulation repository: HashMaps behind locks, one per table,
//! with small helper methods for seeding and inspection in tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::gate::Gate;
use crate::domain::mastery::AtomMastery;
use crate::domain::progression::UserProgressionState;
use crate::domain::question::{AtomId, Question, QuestionId};
use crate::domain::rating::{RatingRecord, ScopeKey};
use crate::domain::review::{ItemType, ReviewItem};
use crate::domain::Attempt;
use crate::error::{CoreError, CoreResult};
use crate::ports::{AttemptRepo, MasteryRepo, QuestionRepo, RatingRepo, ReviewRepo, UserStateRepo};

/// In-memory question bank. Seeded up front; `record_served` is the only
/// mutation, matching the real bank's `times_served` counter.
pub struct InMemoryQuestionRepo {
    questions: RwLock<HashMap<QuestionId, Question>>,
}

impl InMemoryQuestionRepo {
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Self {
        let map = questions.into_iter().map(|q| (q.id.clone(), q)).collect();
        Self {
            questions: RwLock::new(map),
        }
    }

    pub fn all(&self) -> Vec<Question> {
        self.questions.read().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl QuestionRepo for InMemoryQuestionRepo {
    async fn get_question(&self, id: &QuestionId) -> CoreResult<Question> {
        self.questions
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("question {id}")))
    }

    async fn get_questions_for_atoms(&self, atom_ids: &[AtomId]) -> CoreResult<Vec<Question>> {
        Ok(self
            .questions
            .read()
            .unwrap()
            .values()
            .filter(|q| q.atoms.iter().any(|a| atom_ids.contains(a)))
            .cloned()
            .collect())
    }

    async fn get_questions_in_band(
        &self,
        section_code: Option<&str>,
        band_min: i32,
        band_max: i32,
    ) -> CoreResult<Vec<Question>> {
        Ok(self
            .questions
            .read()
            .unwrap()
            .values()
            .filter(|q| section_code.map_or(true, |s| q.section_code == s))
            .filter(|q| q.difficulty_rating >= band_min && q.difficulty_rating <= band_max)
            .cloned()
            .collect())
    }

    async fn record_served(&self, id: &QuestionId) -> CoreResult<()> {
        if let Some(question) = self.questions.write().unwrap().get_mut(id) {
            question.times_served += 1;
        }
        Ok(())
    }
}

/// One row per `(user_id, scope)`, created lazily on first read (§3
/// "Lifecycles").
#[derive(Default)]
pub struct InMemoryRatingRepo {
    ratings: RwLock<HashMap<(String, ScopeKey), RatingRecord>>,
}

impl InMemoryRatingRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatingRepo for InMemoryRatingRepo {
    async fn get_or_create(&self, user_id: &str, scope: &ScopeKey) -> CoreResult<RatingRecord> {
        let key = (user_id.to_string(), scope.clone());
        if let Some(record) = self.ratings.read().unwrap().get(&key) {
            return Ok(record.clone());
        }
        let record = RatingRecord::new(user_id, scope.clone());
        self.ratings.write().unwrap().insert(key, record.clone());
        Ok(record)
    }

    async fn save_all(&self, records: &[RatingRecord]) -> CoreResult<()> {
        let mut ratings = self.ratings.write().unwrap();
        for record in records {
            ratings.insert((record.user_id.clone(), record.scope.clone()), record.clone());
        }
        Ok(())
    }
}

/// Append-only attempt log (§3 "Attempts are append-only").
#[derive(Default)]
pub struct InMemoryAttemptRepo {
    attempts: RwLock<Vec<Attempt>>,
}

impl InMemoryAttemptRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptRepo for InMemoryAttemptRepo {
    async fn record(&self, attempt: &Attempt) -> CoreResult<()> {
        self.attempts.write().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn get_recent_for_atoms(
        &self,
        user_id: &str,
        atom_ids: &[AtomId],
        limit: usize,
    ) -> CoreResult<Vec<Attempt>> {
        let attempts = self.attempts.read().unwrap();
        let mut matching: Vec<Attempt> = attempts
            .iter()
            .filter(|a| a.user_id == user_id && a.atom_ids.iter().any(|atom| atom_ids.contains(atom)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }
}

/// One row per `(user_id, atom_id)` (§3 "AtomMastery").
#[derive(Default)]
pub struct InMemoryMasteryRepo {
    mastery: RwLock<HashMap<(String, AtomId), AtomMastery>>,
}

impl InMemoryMasteryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MasteryRepo for InMemoryMasteryRepo {
    async fn get_or_create(&self, user_id: &str, atom_id: &AtomId) -> CoreResult<AtomMastery> {
        let key = (user_id.to_string(), atom_id.clone());
        if let Some(mastery) = self.mastery.read().unwrap().get(&key) {
            return Ok(mastery.clone());
        }
        let mastery = AtomMastery::new(user_id, atom_id.clone());
        self.mastery.write().unwrap().insert(key, mastery.clone());
        Ok(mastery)
    }

    async fn save(&self, mastery: &AtomMastery) -> CoreResult<()> {
        self.mastery.write().unwrap().insert(
            (mastery.user_id.clone(), mastery.atom_id.clone()),
            mastery.clone(),
        );
        Ok(())
    }

    async fn get_many(&self, user_id: &str, atom_ids: &[AtomId]) -> CoreResult<Vec<AtomMastery>> {
        let mastery = self.mastery.read().unwrap();
        Ok(atom_ids
            .iter()
            .map(|atom_id| {
                mastery
                    .get(&(user_id.to_string(), atom_id.clone()))
                    .cloned()
                    .unwrap_or_else(|| AtomMastery::new(user_id, atom_id.clone()))
            })
            .collect())
    }
}

/// One row per review item, created lazily the first time an atom or
/// question appears in practice (§3 "Lifecycles").
#[derive(Default)]
pub struct InMemoryReviewRepo {
    items: RwLock<HashMap<String, ReviewItem>>,
}

impl InMemoryReviewRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepo for InMemoryReviewRepo {
    async fn get_or_create(
        &self,
        user_id: &str,
        item_type: ItemType,
        item_id: &str,
        today: NaiveDate,
    ) -> CoreResult<ReviewItem> {
        let candidate = ReviewItem::new_for_item(user_id, item_type, item_id, today);
        let mut items = self.items.write().unwrap();
        Ok(items.entry(candidate.id.clone()).or_insert(candidate).clone())
    }

    async fn get_by_id(&self, review_id: &str) -> CoreResult<ReviewItem> {
        self.items
            .read()
            .unwrap()
            .get(review_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("review item {review_id}")))
    }

    async fn save(&self, item: &ReviewItem) -> CoreResult<()> {
        self.items.write().unwrap().insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn due_reviews(
        &self,
        user_id: &str,
        today: NaiveDate,
        limit: usize,
    ) -> CoreResult<Vec<ReviewItem>> {
        let items = self.items.read().unwrap();
        let mut due: Vec<ReviewItem> = items
            .values()
            .filter(|i| i.user_id == user_id && i.next_review_date <= today)
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap()
                .then(a.next_review_date.cmp(&b.next_review_date))
        });
        due.truncate(limit);
        Ok(due)
    }
}

/// A single user-state row plus the read-only gate registry the Gate
/// Evaluator consults for authored (non-default) gates (§6).
pub struct InMemoryUserStateRepo {
    state: RwLock<HashMap<String, UserProgressionState>>,
    gates: RwLock<HashMap<String, Gate>>,
}

impl InMemoryUserStateRepo {
    pub fn new(gates: impl IntoIterator<Item = Gate>) -> Self {
        Self {
            state: RwLock::new(HashMap::new()),
            gates: RwLock::new(gates.into_iter().map(|g| (g.id.clone(), g)).collect()),
        }
    }
}

#[async_trait]
impl UserStateRepo for InMemoryUserStateRepo {
    async fn get_or_create(&self, user_id: &str) -> CoreResult<UserProgressionState> {
        if let Some(state) = self.state.read().unwrap().get(user_id) {
            return Ok(state.clone());
        }
        let state = UserProgressionState::new(user_id);
        self.state
            .write()
            .unwrap()
            .insert(user_id.to_string(), state.clone());
        Ok(state)
    }

    async fn save(&self, state: &UserProgressionState) -> CoreResult<()> {
        self.state
            .write()
            .unwrap()
            .insert(state.user_id.clone(), state.clone());
        Ok(())
    }

    async fn get_gate(&self, gate_id: &str) -> CoreResult<Gate> {
        self.gates
            .read()
            .unwrap()
            .get(gate_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("gate {gate_id}")))
    }
}
