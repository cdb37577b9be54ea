mod rating;
mod sentiment;
mod title;

pub use rating::{RankedRating, Rating, RatingDraft, MAX_SCORE, MIN_SCORE};
pub use sentiment::{Sentiment, Tier};
pub use title::{
    DiscoveredMovie, MovieMetadata, TmdbGenre, TmdbGenreList, TmdbMovie, TmdbSearchResponse,
};
