use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata the lookup collaborator returns for a title
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieMetadata {
    pub genres: Vec<String>,
    pub poster_path: Option<String>,
    pub external_rating: Option<f64>,
    pub year: Option<i32>,
}

/// A popular title returned by genre discovery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveredMovie {
    pub title: String,
    #[serde(flatten)]
    pub metadata: MovieMetadata,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response from GET /search/movie and GET /discover/movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// One search hit from TMDB
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub title: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Response from GET /genre/movie/list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbGenreList {
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

impl TmdbGenreList {
    /// TMDB id for a genre given by name (case-insensitive) or by numeric id
    pub fn id_for(&self, genre: &str) -> Option<u32> {
        let genre = genre.trim();
        if let Ok(id) = genre.parse() {
            return Some(id);
        }
        self.genres
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(genre))
            .map(|g| g.id)
    }

    pub fn into_lookup(self) -> HashMap<u32, String> {
        self.genres.into_iter().map(|g| (g.id, g.name)).collect()
    }
}

impl TmdbMovie {
    /// Release year from a `YYYY-MM-DD` date; missing or malformed dates give `None`
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }

    /// Converts into metadata, resolving genre ids through `genre_names`
    ///
    /// Ids missing from the lookup are dropped.
    pub fn into_metadata(self, genre_names: &HashMap<u32, String>) -> MovieMetadata {
        let year = self.release_year();
        let genres = self
            .genre_ids
            .iter()
            .filter_map(|id| genre_names.get(id).cloned())
            .collect();

        MovieMetadata {
            genres,
            poster_path: self.poster_path.filter(|p| !p.is_empty()),
            external_rating: self.vote_average,
            year,
        }
    }

    pub fn into_discovered(self, genre_names: &HashMap<u32, String>) -> DiscoveredMovie {
        DiscoveredMovie {
            title: self.title.clone(),
            metadata: self.into_metadata(genre_names),
        }
    }
}
