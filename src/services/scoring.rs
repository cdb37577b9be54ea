use rand::Rng;

use crate::{
    models::{Rating, Sentiment, MAX_SCORE, MIN_SCORE},
    services::classifier::sentiment_for_score,
};

/// Smallest nudge applied when placing a movie next to its reference
pub const DELTA_MIN: f64 = 0.1;
/// Largest nudge applied when placing a movie next to its reference
pub const DELTA_MAX: f64 = 0.3;

/// Source of the perturbation used by pairwise refinement
///
/// Implementations must return values inside [`DELTA_MIN`, `DELTA_MAX`].
#[cfg_attr(test, mockall::automock)]
pub trait DeltaSource: Send + Sync {
    fn draw(&self) -> f64;
}

/// Uniform draw from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDelta;

impl DeltaSource for RandomDelta {
    fn draw(&self) -> f64 {
        rand::thread_rng().gen_range(DELTA_MIN..=DELTA_MAX)
    }
}

/// Always returns the same delta
#[derive(Debug, Clone, Copy)]
pub struct FixedDelta(f64);

impl FixedDelta {
    /// Values outside the allowed range are pulled back into it
    pub fn new(delta: f64) -> Self {
        Self(delta.clamp(DELTA_MIN, DELTA_MAX))
    }
}

impl DeltaSource for FixedDelta {
    fn draw(&self) -> f64 {
        self.0
    }
}

/// A "better or worse than X" judgment
#[derive(Debug, Clone, Copy)]
pub struct Comparison<'a> {
    pub reference: &'a Rating,
    pub better: bool,
}

/// Score given to the first member of an empty bucket
pub fn baseline_score(sentiment: Sentiment) -> f64 {
    match sentiment {
        Sentiment::Loved => 10.0,
        Sentiment::Fine => 8.4,
        Sentiment::Disliked => 6.4,
    }
}

/// Ratings currently in `sentiment`'s bucket, skipping the entry being edited
pub fn bucket<'a>(
    ratings: &'a [Rating],
    sentiment: Sentiment,
    exclude: Option<i64>,
) -> impl Iterator<Item = &'a Rating> {
    ratings
        .iter()
        .filter(move |r| Some(r.id) != exclude)
        .filter(move |r| sentiment_for_score(r.score) == Some(sentiment))
}

/// Computes the score for a new or edited rating
///
/// The first matching rule wins:
/// 1. with a comparison, land just above or below the reference
/// 2. with an empty bucket, take the sentiment baseline
/// 3. otherwise take the bucket mean
///
/// Pairwise placement only keeps the new score consistent with the one reference it was
/// compared against; earlier comparisons are not revisited.
pub fn assign_score(
    sentiment: Sentiment,
    comparison: Option<Comparison<'_>>,
    ratings: &[Rating],
    exclude: Option<i64>,
    delta: &dyn DeltaSource,
) -> f64 {
    let score = match comparison {
        Some(Comparison { reference, better }) => {
            let delta = delta.draw();
            if better {
                (reference.score + delta).min(MAX_SCORE)
            } else {
                (reference.score - delta).max(MIN_SCORE)
            }
        }
        None => {
            let (sum, count) = bucket(ratings, sentiment, exclude)
                .fold((0.0, 0usize), |(sum, count), r| (sum + r.score, count + 1));

            if count == 0 {
                baseline_score(sentiment)
            } else {
                sum / count as f64
            }
        }
    };

    score.clamp(MIN_SCORE, MAX_SCORE)
}
