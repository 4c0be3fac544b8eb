//! The Question Selector service (C3, §4.3): composes the Difficulty
//! Matcher (C2) with repository queries and the mode-specific distribution
//! to produce an ordered, anti-repetition-constrained selection.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::domain::mastery::MasteryLevel;
use crate::domain::mode::Mode;
use crate::domain::question::{AtomId, Question, QuestionId};
use crate::domain::rating::{ScopeKey, ScopeType};
use crate::domain::review::ItemType;
use crate::domain::selection::{SelectedQuestion, SelectionCriteria, SelectionReason};
use crate::error::CoreResult;
use crate::matching::difficulty_band;
use crate::ports::{MasteryRepo, QuestionRepo, RatingRepo, ReviewRepo};

use super::scoring::{score_candidate, selection_plan};

/// Bounded outward expansion of the difficulty band when the initial fetch
/// comes back thin (§4.3 "expanding outward if fewer than count/2
/// results").
const MAX_BAND_EXPANSIONS: u32 = 3;
const BAND_EXPAND_STEP: i32 = 50;

/// How many of the top-scored candidates to pick the random slot from
/// (§4.3 "first min(5, remaining)").
const RANDOM_WINDOW: usize = 5;

pub struct Selector {
    question_repo: Arc<dyn QuestionRepo>,
    rating_repo: Arc<dyn RatingRepo>,
    mastery_repo: Arc<dyn MasteryRepo>,
    review_repo: Arc<dyn ReviewRepo>,
}

impl Selector {
    pub fn new(
        question_repo: Arc<dyn QuestionRepo>,
        rating_repo: Arc<dyn RatingRepo>,
        mastery_repo: Arc<dyn MasteryRepo>,
        review_repo: Arc<dyn ReviewRepo>,
    ) -> Self {
        Self {
            question_repo,
            rating_repo,
            mastery_repo,
            review_repo,
        }
    }

    /// External interface `select_questions(SelectionCriteria)` (§6). The
    /// RNG is threaded through explicitly rather than reached for from a
    /// thread-local, so tests can inject a seeded generator (SPEC_FULL
    /// §4.3 implementation note).
    #[tracing::instrument(skip(self, criteria, rng), fields(user_id = %criteria.user_id, mode = criteria.mode.as_str(), count = criteria.count))]
    pub async fn select_questions(
        &self,
        criteria: &SelectionCriteria,
        rng: &mut impl Rng,
    ) -> CoreResult<Vec<SelectedQuestion>> {
        if criteria.count == 0 {
            return Ok(Vec::new());
        }

        let scope = match &criteria.section_code {
            Some(code) => ScopeKey::new(ScopeType::Section, code.clone()),
            None => ScopeKey::global(),
        };
        let rating = self
            .rating_repo
            .get_or_create(&criteria.user_id, &scope)
            .await?
            .rating;

        let mut selected: Vec<SelectedQuestion> = Vec::new();
        let mut excluded: HashSet<QuestionId> = criteria.exclude_ids.clone();

        if criteria.mode == Mode::Review {
            self.apply_review_due_override(criteria, &mut selected, &mut excluded)
                .await?;
        }

        let remaining = criteria.count.saturating_sub(selected.len());
        if remaining == 0 {
            return Ok(selected);
        }

        let mut candidates = self.fetch_candidates(criteria, rating, remaining).await?;
        candidates.retain(|q| !excluded.contains(&q.id));
        if candidates.is_empty() {
            return Ok(selected);
        }

        let weakness_atom_ids = self.weakness_atom_ids(criteria, &candidates).await?;

        let mut scored: Vec<(f64, Question)> = candidates
            .into_iter()
            .map(|q| (score_candidate(rating, &q, criteria.mode, &weakness_atom_ids), q))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());

        let pool_size = (3 * remaining).min(scored.len());
        let mut pool: Vec<(f64, Question)> = scored.into_iter().take(pool_size).collect();

        let plan = selection_plan(criteria.mode, remaining);
        let buckets = [
            (plan.near_rating, SelectionReason::NearRating),
            (plan.stretch, SelectionReason::Stretch),
            (plan.weakness, SelectionReason::Weakness),
            (plan.exploration, SelectionReason::Exploration),
        ];

        let mut atom_counts: HashMap<AtomId, usize> = HashMap::new();

        'buckets: for (bucket_count, reason) in buckets {
            for _ in 0..bucket_count {
                if selected.len() >= criteria.count {
                    break 'buckets;
                }
                match self.pick_one(&mut pool, &mut atom_counts, criteria.max_same_atom_per_session, rng) {
                    Some((score, question)) => {
                        self.question_repo.record_served(&question.id).await?;
                        selected.push(SelectedQuestion {
                            question_id: question.id,
                            score,
                            reason,
                        });
                    }
                    None => break 'buckets,
                }
            }
        }

        selected.truncate(criteria.count);
        Ok(selected)
    }

    /// External interface `get_next_question(mode, section?, exclude_ids)`
    /// (§6): `select_questions` with `count = 1`.
    pub async fn get_next_question(
        &self,
        user_id: &str,
        mode: Mode,
        section_code: Option<String>,
        exclude_ids: HashSet<QuestionId>,
    ) -> CoreResult<Option<SelectedQuestion>> {
        let mut criteria = SelectionCriteria::new(user_id, mode, 1);
        criteria.section_code = section_code;
        criteria.exclude_ids = exclude_ids;
        let mut rng = rand::thread_rng();
        let mut results = self.select_questions(&criteria, &mut rng).await?;
        Ok(results.pop())
    }

    /// Repeatedly samples a uniformly random index from the first
    /// `min(RANDOM_WINDOW, remaining)` candidates, skipping (and
    /// discarding) any that would blow the per-atom session cap, until one
    /// is accepted or the pool is exhausted.
    fn pick_one(
        &self,
        pool: &mut Vec<(f64, Question)>,
        atom_counts: &mut HashMap<AtomId, usize>,
        max_same_atom: usize,
        rng: &mut impl Rng,
    ) -> Option<(f64, Question)> {
        while !pool.is_empty() {
            let span = pool.len().min(RANDOM_WINDOW);
            let idx = rng.gen_range(0..span);
            let violates = pool[idx]
                .1
                .atoms
                .iter()
                .any(|atom| *atom_counts.get(atom).unwrap_or(&0) >= max_same_atom);
            if violates {
                pool.remove(idx);
                continue;
            }
            let (score, question) = pool.remove(idx);
            for atom in &question.atoms {
                *atom_counts.entry(atom.clone()).or_insert(0) += 1;
            }
            return Some((score, question));
        }
        None
    }

    async fn apply_review_due_override(
        &self,
        criteria: &SelectionCriteria,
        selected: &mut Vec<SelectedQuestion>,
        excluded: &mut HashSet<QuestionId>,
    ) -> CoreResult<()> {
        let today = Utc::now().date_naive();
        let due = self
            .review_repo
            .due_reviews(&criteria.user_id, today, criteria.count)
            .await?;

        for item in due.into_iter().filter(|i| i.item_type == ItemType::Question) {
            if selected.len() >= criteria.count {
                break;
            }
            if excluded.contains(&item.item_id) {
                continue;
            }
            excluded.insert(item.item_id.clone());
            selected.push(SelectedQuestion {
                question_id: item.item_id,
                score: 100.0,
                reason: SelectionReason::ReviewDue,
            });
        }
        Ok(())
    }

    async fn fetch_candidates(
        &self,
        criteria: &SelectionCriteria,
        rating: i32,
        remaining: usize,
    ) -> CoreResult<Vec<Question>> {
        let mut candidates = if let Some(atom_ids) = &criteria.target_atom_ids {
            self.question_repo.get_questions_for_atoms(atom_ids).await?
        } else {
            let mut band = difficulty_band(rating, criteria.mode);
            let mut results = self
                .question_repo
                .get_questions_in_band(criteria.section_code.as_deref(), band.min, band.max)
                .await?;

            let floor = (remaining / 2).max(1);
            let mut expansions = 0;
            while results.len() < floor && expansions < MAX_BAND_EXPANSIONS {
                band.min = (band.min - BAND_EXPAND_STEP).max(crate::domain::rating::MIN_RATING);
                band.max = (band.max + BAND_EXPAND_STEP).min(crate::domain::rating::MAX_RATING);
                results = self
                    .question_repo
                    .get_questions_in_band(criteria.section_code.as_deref(), band.min, band.max)
                    .await?;
                expansions += 1;
            }
            results
        };

        if let Some(question_type) = &criteria.question_type_code {
            candidates.retain(|q| &q.question_type_code == question_type);
        }

        let mut seen = HashSet::new();
        candidates.retain(|q| seen.insert(q.id.clone()));
        Ok(candidates)
    }

    async fn weakness_atom_ids(
        &self,
        criteria: &SelectionCriteria,
        candidates: &[Question],
    ) -> CoreResult<HashSet<AtomId>> {
        if let Some(ids) = &criteria.weakness_atom_ids {
            return Ok(ids.iter().cloned().collect());
        }

        let atom_universe: Vec<AtomId> = candidates
            .iter()
            .flat_map(|q| q.atoms.iter().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if atom_universe.is_empty() {
            return Ok(HashSet::new());
        }

        let masteries = self
            .mastery_repo
            .get_many(&criteria.user_id, &atom_universe)
            .await?;
        Ok(masteries
            .into_iter()
            .filter(|m| matches!(m.mastery_level, MasteryLevel::Learning | MasteryLevel::Reviewing))
            .map(|m| m.atom_id)
            .collect())
    }
}
