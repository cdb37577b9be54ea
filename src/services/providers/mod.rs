/// Movie metadata provider abstraction
///
/// The rating engine never calls a provider directly. The API layer uses one to offer title
/// suggestions while typing, to fill in genres, poster, external rating and year after a
/// rating is saved, and to discover popular titles in a genre.
use crate::{
    error::AppResult,
    models::{DiscoveredMovie, MovieMetadata},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Raw candidate titles for a partial query, as the provider returns them
    ///
    /// Filtering and de-duplication happen in [`crate::services::title_search`].
    async fn search_titles(&self, query: &str) -> AppResult<Vec<String>>;

    /// Metadata for the best match of `title`, `None` if nothing matched
    async fn fetch_metadata(&self, title: &str) -> AppResult<Option<MovieMetadata>>;

    /// Popular titles in `genre` (name or provider id) with a vote average of at least
    /// `min_rating`, most popular first
    async fn discover(&self, genre: &str, min_rating: f64) -> AppResult<Vec<DiscoveredMovie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
