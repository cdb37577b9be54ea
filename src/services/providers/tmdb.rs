/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Suggestions: /search/movie?query=… → result titles
/// 2. Metadata: /genre/movie/list for the id → name table, then /search/movie for the title;
///    the first hit supplies genres, poster path, vote average and release year
/// 3. Discovery: genre name → id via the genre list, then
///    /discover/movie?with_genres=…&vote_average.gte=…&sort_by=popularity.desc
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{DiscoveredMovie, MovieMetadata, TmdbGenreList, TmdbMovie, TmdbSearchResponse},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// GETs `path` with the API key attached and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    async fn search_movies(&self, query: &str) -> AppResult<Vec<TmdbMovie>> {
        let response: TmdbSearchResponse =
            self.get_json("/search/movie", &[("query", query)]).await?;
        Ok(response.results)
    }

    async fn genre_list(&self) -> AppResult<TmdbGenreList> {
        cached!(self.cache, CacheKey::GenreList, async {
            let list: TmdbGenreList = self.get_json("/genre/movie/list", &[]).await?;
            tracing::info!(genres = list.genres.len(), "Loaded TMDB genre list");
            Ok::<_, AppError>(list)
        })
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_titles(&self, query: &str) -> AppResult<Vec<String>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::TitleSearch(query.to_string()),
            async move {
                let titles: Vec<String> = self
                    .search_movies(query)
                    .await?
                    .into_iter()
                    .map(|movie| movie.title)
                    .collect();

                tracing::info!(
                    query = %query,
                    results = titles.len(),
                    provider = "tmdb",
                    "Title search completed"
                );

                Ok::<_, AppError>(titles)
            }
        )
    }

    async fn fetch_metadata(&self, title: &str) -> AppResult<Option<MovieMetadata>> {
        if title.trim().is_empty() {
            return Ok(None);
        }

        cached!(
            self.cache,
            CacheKey::MovieDetails(title.to_string()),
            async move {
                let genre_names = self.genre_list().await?.into_lookup();
                let metadata = self
                    .search_movies(title)
                    .await?
                    .into_iter()
                    .next()
                    .map(|movie| movie.into_metadata(&genre_names));

                tracing::info!(
                    title = %title,
                    found = metadata.is_some(),
                    provider = "tmdb",
                    "Metadata lookup completed"
                );

                Ok::<_, AppError>(metadata)
            }
        )
    }

    async fn discover(&self, genre: &str, min_rating: f64) -> AppResult<Vec<DiscoveredMovie>> {
        let genres = self.genre_list().await?;
        let genre_id = genres
            .id_for(genre)
            .ok_or_else(|| AppError::NotFound(format!("Unknown genre: {}", genre)))?;
        let genre_names = genres.into_lookup();
        let min_rating = format!("{:.1}", min_rating);

        cached!(
            self.cache,
            CacheKey::Discover {
                genre_id,
                min_rating: min_rating.clone(),
            },
            async move {
                let with_genres = genre_id.to_string();
                let response: TmdbSearchResponse = self
                    .get_json(
                        "/discover/movie",
                        &[
                            ("with_genres", with_genres.as_str()),
                            ("vote_average.gte", min_rating.as_str()),
                            ("sort_by", "popularity.desc"),
                        ],
                    )
                    .await?;

                let movies: Vec<DiscoveredMovie> = response
                    .results
                    .into_iter()
                    .map(|movie| movie.into_discovered(&genre_names))
                    .collect();

                tracing::info!(
                    genre_id,
                    min_rating = %min_rating,
                    results = movies.len(),
                    provider = "tmdb",
                    "Genre discovery completed"
                );

                Ok::<_, AppError>(movies)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
