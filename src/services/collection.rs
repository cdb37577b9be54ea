use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use crate::{
    db::SlotStore,
    error::{AppError, AppResult},
    models::{MovieMetadata, Rating, RatingDraft, Sentiment, Tier},
    services::{
        affinity,
        classifier::tier_for_score,
        codec,
        scoring::{self, Comparison, DeltaSource},
    },
};

/// Owns the rating collection and keeps its persisted copy in sync
///
/// Every successful mutation re-encodes the whole collection and writes it to the slot
/// before returning. A failed write is logged and otherwise ignored: the in-memory
/// collection stays authoritative.
pub struct RatingCollectionManager {
    ratings: Vec<Rating>,
    store: Arc<dyn SlotStore>,
    slot: String,
    delta: Arc<dyn DeltaSource>,
}

impl RatingCollectionManager {
    /// Empty manager; call [`RatingCollectionManager::load`] to pick up a persisted collection
    pub fn new(
        store: Arc<dyn SlotStore>,
        slot: impl Into<String>,
        delta: Arc<dyn DeltaSource>,
    ) -> Self {
        Self {
            ratings: Vec::new(),
            store,
            slot: slot.into(),
            delta,
        }
    }

    /// Replaces the in-memory collection with the persisted one
    ///
    /// A missing, unreadable or corrupt slot leaves the collection empty. Repeated ids are
    /// repaired: the first entry keeps its id, later ones get fresh ids.
    pub async fn load(&mut self) {
        let stored = match self.store.get(&self.slot).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    store = self.store.name(),
                    slot = %self.slot,
                    "Failed to read ratings slot"
                );
                None
            }
        };

        self.ratings = codec::decode_or_empty(stored.as_deref());

        for rating in self.ratings.iter().filter(|r| !r.score_in_domain()) {
            tracing::error!(
                rating_id = rating.id,
                score = rating.score,
                "Invariant violation: stored score outside [1.0, 10.0]"
            );
        }

        if self.reassign_duplicate_ids() > 0 {
            self.persist().await;
        }

        tracing::info!(
            count = self.ratings.len(),
            store = self.store.name(),
            slot = %self.slot,
            "Ratings loaded"
        );
    }

    /// All ratings in insertion order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn get(&self, id: i64) -> Option<&Rating> {
        self.ratings.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Ratings by descending score, each with its display tier
    ///
    /// Equal scores keep insertion order.
    pub fn ranked(&self) -> Vec<(Rating, Tier)> {
        let mut ranked: Vec<Rating> = self.ratings.clone();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
            .into_iter()
            .map(|r| {
                let tier = tier_for_score(r.score);
                (r, tier)
            })
            .collect()
    }

    /// Highest-scored rating currently in `sentiment`'s bucket
    ///
    /// This is the peer offered for a "better or worse?" comparison. `exclude` skips the
    /// entry being edited. Ties go to the earlier entry.
    pub fn reference_candidate(&self, sentiment: Sentiment, exclude: Option<i64>) -> Option<&Rating> {
        scoring::bucket(&self.ratings, sentiment, exclude).fold(None, |best, r| match best {
            Some(b) if r.score <= b.score => Some(b),
            _ => Some(r),
        })
    }

    /// Genre with the highest mean score, or `"Unknown"`
    pub fn favorite_genre(&self) -> String {
        affinity::favorite_genre(&self.ratings)
    }

    /// Scores and appends a new rating
    pub async fn create(&mut self, draft: RatingDraft) -> AppResult<Rating> {
        let (title, sentiment) = validate(&draft)?;
        let score = self.score_for(sentiment, &draft, None)?;
        let id = self.next_id()?;

        let rating = Rating {
            id,
            title,
            score,
            genres: draft.genres,
            external_rating: draft.external_rating,
            year: draft.year,
        };
        self.check_domain(&rating);
        self.ratings.push(rating.clone());

        tracing::info!(
            rating_id = rating.id,
            title = %rating.title,
            sentiment = %sentiment,
            score = rating.score,
            "Rating created"
        );

        self.persist().await;
        Ok(rating)
    }

    /// Re-scores and replaces every field of an existing rating; the id is kept
    pub async fn update(&mut self, id: i64, draft: RatingDraft) -> AppResult<Rating> {
        let (title, sentiment) = validate(&draft)?;
        let index = self.position_of(id)?;
        let score = self.score_for(sentiment, &draft, Some(id))?;

        let rating = Rating {
            id,
            title,
            score,
            genres: draft.genres,
            external_rating: draft.external_rating,
            year: draft.year,
        };
        self.check_domain(&rating);
        self.ratings[index] = rating.clone();

        tracing::info!(
            rating_id = id,
            title = %rating.title,
            sentiment = %sentiment,
            score = rating.score,
            "Rating updated"
        );

        self.persist().await;
        Ok(rating)
    }

    /// Removes one rating by id
    pub async fn delete(&mut self, id: i64) -> AppResult<Rating> {
        let index = self.position_of(id)?;
        let removed = self.ratings.remove(index);

        tracing::info!(rating_id = id, title = %removed.title, "Rating deleted");

        self.persist().await;
        Ok(removed)
    }

    /// Removes every rating whose id is in `ids`; unknown ids are skipped
    ///
    /// Returns how many ratings were removed.
    pub async fn delete_ids(&mut self, ids: &[i64]) -> usize {
        let before = self.ratings.len();
        self.ratings.retain(|r| !ids.contains(&r.id));
        let removed = before - self.ratings.len();

        tracing::info!(requested = ids.len(), removed, "Ratings deleted by id");

        self.persist().await;
        removed
    }

    /// Removes the ratings at the given insertion-order positions
    ///
    /// The whole call is rejected if any position is out of range.
    pub async fn delete_positions(&mut self, positions: &[usize]) -> AppResult<usize> {
        let len = self.ratings.len();
        if let Some(bad) = positions.iter().find(|&&p| p >= len) {
            return Err(AppError::InvalidInput(format!(
                "Position {} is out of range for {} ratings",
                bad, len
            )));
        }

        let positions: BTreeSet<usize> = positions.iter().copied().collect();
        // Highest first so earlier removals do not shift later ones
        for &position in positions.iter().rev() {
            self.ratings.remove(position);
        }

        tracing::info!(removed = positions.len(), "Ratings deleted by position");

        self.persist().await;
        Ok(positions.len())
    }

    /// Applies a late-arriving metadata lookup to an existing rating
    ///
    /// Only genres, external rating and year change; the score is untouched.
    pub async fn attach_metadata(&mut self, id: i64, metadata: &MovieMetadata) -> AppResult<Rating> {
        let index = self.position_of(id)?;
        let rating = &mut self.ratings[index];
        rating.apply_metadata(metadata);
        let rating = rating.clone();

        tracing::debug!(
            rating_id = id,
            genres = rating.genres.len(),
            "Metadata attached"
        );

        self.persist().await;
        Ok(rating)
    }

    fn score_for(
        &self,
        sentiment: Sentiment,
        draft: &RatingDraft,
        exclude: Option<i64>,
    ) -> AppResult<f64> {
        let comparison = match (draft.reference_id, draft.reference_is_better) {
            (Some(reference_id), Some(better)) => {
                let reference = self.get(reference_id).ok_or_else(|| {
                    AppError::NotFound(format!("Reference rating {} not found", reference_id))
                })?;
                Some(Comparison { reference, better })
            }
            _ => None,
        };

        Ok(scoring::assign_score(
            sentiment,
            comparison,
            &self.ratings,
            exclude,
            self.delta.as_ref(),
        ))
    }

    fn next_id(&self) -> AppResult<i64> {
        match self.ratings.iter().map(|r| r.id).max() {
            None => Ok(1),
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| AppError::Internal("Rating ids exhausted".to_string())),
        }
    }

    /// Gives every repeated id after its first occurrence a fresh `max + 1` id
    ///
    /// Returns how many ratings were renumbered.
    fn reassign_duplicate_ids(&mut self) -> usize {
        let mut next = self.ratings.iter().map(|r| r.id).max().unwrap_or(0);
        let mut seen = HashSet::with_capacity(self.ratings.len());
        let mut reassigned = 0;

        for rating in &mut self.ratings {
            if seen.insert(rating.id) {
                continue;
            }

            let Some(fresh) = next.checked_add(1) else {
                tracing::error!(rating_id = rating.id, "Rating ids exhausted, duplicate kept");
                continue;
            };
            tracing::error!(
                rating_id = rating.id,
                new_id = fresh,
                title = %rating.title,
                "Invariant violation: duplicate stored id, reassigned"
            );

            next = fresh;
            rating.id = fresh;
            seen.insert(fresh);
            reassigned += 1;
        }

        reassigned
    }

    fn position_of(&self, id: i64) -> AppResult<usize> {
        self.ratings
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Rating {} not found", id)))
    }

    fn check_domain(&self, rating: &Rating) {
        if !rating.score_in_domain() {
            tracing::error!(
                rating_id = rating.id,
                score = rating.score,
                "Invariant violation: assigned score outside [1.0, 10.0]"
            );
        }
    }

    /// Writes the whole collection to the slot; failures are logged, never returned
    async fn persist(&self) {
        let encoded = match codec::encode(&self.ratings) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode ratings");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.slot, encoded).await {
            tracing::error!(
                error = %e,
                store = self.store.name(),
                slot = %self.slot,
                "Failed to persist ratings, keeping in-memory state"
            );
        }
    }
}

/// Checks the fields every create/update needs
fn validate(draft: &RatingDraft) -> AppResult<(String, Sentiment)> {
    let sentiment = draft
        .sentiment
        .ok_or_else(|| AppError::InvalidInput("Sentiment is required".to_string()))?;

    let title = draft.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }

    Ok((title.to_string(), sentiment))
}
