use std::{collections::BTreeSet, sync::Arc};

use crate::{
    models::{DiscoveredMovie, MovieMetadata},
    services::{affinity::UNKNOWN_GENRE, providers::MetadataProvider},
};

/// Queries shorter than this get no suggestions
pub const MIN_QUERY_CHARS: usize = 2;

/// Vote average floor for discovery when none is given
pub const DEFAULT_MIN_RATING: f64 = 7.0;

/// Title suggestions for a partially typed title
///
/// Keeps only titles containing the query case-insensitively, drops exact duplicates and
/// sorts the rest. Provider failures degrade to no suggestions.
pub async fn suggest_titles(provider: Arc<dyn MetadataProvider>, query: &str) -> Vec<String> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    match provider.search_titles(query).await {
        Ok(titles) => filter_suggestions(titles, query),
        Err(e) => {
            tracing::warn!(
                error = %e,
                query = %query,
                provider = provider.name(),
                "Title suggestion lookup failed"
            );
            Vec::new()
        }
    }
}

/// Metadata for a rated title; lookup failures count as "no data"
pub async fn lookup_metadata(
    provider: Arc<dyn MetadataProvider>,
    title: &str,
) -> Option<MovieMetadata> {
    match provider.fetch_metadata(title).await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(
                error = %e,
                title = %title,
                provider = provider.name(),
                "Metadata lookup failed"
            );
            None
        }
    }
}

/// Popular titles in a genre; an unknown genre or a failed lookup gives an empty list
pub async fn discover_titles(
    provider: Arc<dyn MetadataProvider>,
    genre: &str,
    min_rating: f64,
) -> Vec<DiscoveredMovie> {
    let genre = genre.trim();
    if genre.is_empty() || genre == UNKNOWN_GENRE {
        return Vec::new();
    }

    match provider.discover(genre, min_rating).await {
        Ok(movies) => movies,
        Err(e) => {
            tracing::warn!(
                error = %e,
                genre = %genre,
                min_rating,
                provider = provider.name(),
                "Genre discovery failed"
            );
            Vec::new()
        }
    }
}

fn filter_suggestions(titles: Vec<String>, query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    titles
        .into_iter()
        .filter(|title| title.to_lowercase().contains(&needle))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
