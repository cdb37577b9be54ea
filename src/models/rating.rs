use serde::{Deserialize, Serialize};

use super::{MovieMetadata, Sentiment, Tier};

/// Lowest score a rating may carry
pub const MIN_SCORE: f64 = 1.0;
/// Highest score a rating may carry
pub const MAX_SCORE: f64 = 10.0;

/// One rated movie in the user's collection
///
/// Field names are persisted in camelCase; `imdbScore` is accepted as an alias of
/// `externalRating` so collections written by the older app still decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,
    pub title: String,
    pub score: f64,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, alias = "imdbScore")]
    pub external_rating: f64,
    #[serde(default)]
    pub year: i32,
}

impl Rating {
    /// Whether the score sits inside the closed [1.0, 10.0] domain
    pub fn score_in_domain(&self) -> bool {
        (MIN_SCORE..=MAX_SCORE).contains(&self.score)
    }

    /// Applies a late-arriving metadata lookup; never touches the score
    pub fn apply_metadata(&mut self, metadata: &MovieMetadata) {
        if !metadata.genres.is_empty() {
            self.genres = metadata.genres.clone();
        }
        if let Some(external_rating) = metadata.external_rating {
            self.external_rating = external_rating;
        }
        if let Some(year) = metadata.year {
            self.year = year;
        }
    }
}

/// User input for creating or editing a rating
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDraft {
    pub title: String,
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub external_rating: f64,
    #[serde(default)]
    pub year: i32,
    /// Id of an already-rated movie this one is compared against
    pub reference_id: Option<i64>,
    /// `true` if this movie was better than the reference
    pub reference_is_better: Option<bool>,
}

impl RatingDraft {
    pub fn new(title: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            title: title.into(),
            sentiment: Some(sentiment),
            ..Default::default()
        }
    }

    /// Compares against `reference_id`; `better` says which side of it this movie lands
    pub fn compared_to(mut self, reference_id: i64, better: bool) -> Self {
        self.reference_id = Some(reference_id);
        self.reference_is_better = Some(better);
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }
}

/// A rating as shown in the ranked list
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedRating {
    #[serde(flatten)]
    pub rating: Rating,
    pub tier: Tier,
    pub poster_path: Option<String>,
}
