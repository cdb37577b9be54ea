//! Score banding.
//!
//! Sentiment buckets drive score assignment; tiers are for display only. The two tables use
//! different cut points and are kept apart on purpose.

use crate::models::{Sentiment, Tier, MAX_SCORE, MIN_SCORE};

/// Maps a score to its sentiment bucket
///
/// | score        | bucket   |
/// |--------------|----------|
/// | [8.5, 10.0]  | Loved    |
/// | [6.5, 8.5)   | Fine     |
/// | [1.0, 6.5)   | Disliked |
///
/// Scores outside [1.0, 10.0] have no bucket.
pub fn sentiment_for_score(score: f64) -> Option<Sentiment> {
    match score {
        s if (8.5..=MAX_SCORE).contains(&s) => Some(Sentiment::Loved),
        s if (6.5..8.5).contains(&s) => Some(Sentiment::Fine),
        s if (MIN_SCORE..6.5).contains(&s) => Some(Sentiment::Disliked),
        _ => None,
    }
}

/// Maps a score to its display tier
///
/// | score        | tier |
/// |--------------|------|
/// | [8.5, 10.0]  | S    |
/// | [7.5, 8.5)   | A    |
/// | [6.5, 7.5)   | B    |
/// | [5.0, 6.5)   | C    |
/// | otherwise    | Skip |
pub fn tier_for_score(score: f64) -> Tier {
    match score {
        s if (8.5..=MAX_SCORE).contains(&s) => Tier::S,
        s if (7.5..8.5).contains(&s) => Tier::A,
        s if (6.5..7.5).contains(&s) => Tier::B,
        s if (5.0..6.5).contains(&s) => Tier::C,
        _ => Tier::Skip,
    }
}
