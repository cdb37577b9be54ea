use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{DiscoveredMovie, RankedRating, Rating, RatingDraft, Sentiment};
use crate::services::{
    affinity::{self, GenreAverage},
    title_search,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Option<Vec<i64>>,
    pub positions: Option<Vec<usize>>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub count: usize,
    pub favorite_genre: String,
    pub genres: Vec<GenreAverage>,
}

#[derive(Debug, Deserialize)]
pub struct ReferenceQuery {
    pub sentiment: Sentiment,
    pub exclude: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    pub genre: Option<String>,
    pub rating: Option<f64>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All ratings in insertion order
pub async fn list_ratings(State(state): State<AppState>) -> Json<Vec<Rating>> {
    let ratings = state.ratings.lock().await;
    Json(ratings.ratings().to_vec())
}

pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Rating>> {
    let ratings = state.ratings.lock().await;
    ratings
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Rating {} not found", id)))
}

/// Rate a newly watched movie
pub async fn create_rating(
    State(state): State<AppState>,
    Json(draft): Json<RatingDraft>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let rating = state.ratings.lock().await.create(draft).await?;
    spawn_metadata_lookup(state, rating.id, rating.title.clone());
    Ok((StatusCode::CREATED, Json(rating)))
}

/// Edit an existing rating
pub async fn update_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<RatingDraft>,
) -> AppResult<Json<Rating>> {
    let rating = state.ratings.lock().await.update(id, draft).await?;
    spawn_metadata_lookup(state, rating.id, rating.title.clone());
    Ok(Json(rating))
}

pub async fn delete_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.ratings.lock().await.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete several ratings, either by id or by list position
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let mut ratings = state.ratings.lock().await;
    let removed = match (request.ids, request.positions) {
        (Some(ids), None) => ratings.delete_ids(&ids).await,
        (None, Some(positions)) => ratings.delete_positions(&positions).await?,
        _ => {
            return Err(AppError::InvalidInput(
                "Provide exactly one of `ids` or `positions`".to_string(),
            ))
        }
    };
    Ok(Json(BulkDeleteResponse { removed }))
}

/// Ratings by descending score with tier and poster
pub async fn ranked_ratings(State(state): State<AppState>) -> Json<Vec<RankedRating>> {
    let ranked = state.ratings.lock().await.ranked();

    let posters = state.posters.read().await;
    let ranked = ranked
        .into_iter()
        .map(|(rating, tier)| RankedRating {
            poster_path: posters.get(&rating.title).cloned(),
            rating,
            tier,
        })
        .collect();

    Json(ranked)
}

pub async fn summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let ratings = state.ratings.lock().await;
    Json(SummaryResponse {
        count: ratings.len(),
        favorite_genre: ratings.favorite_genre(),
        genres: affinity::genre_averages(ratings.ratings()),
    })
}

/// Peer to compare a new rating against for the chosen sentiment
pub async fn reference_candidate(
    State(state): State<AppState>,
    Query(query): Query<ReferenceQuery>,
) -> Json<Option<Rating>> {
    let ratings = state.ratings.lock().await;
    Json(
        ratings
            .reference_candidate(query.sentiment, query.exclude)
            .cloned(),
    )
}

/// Title suggestions while typing
pub async fn suggest_titles(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Json<Vec<String>> {
    Json(title_search::suggest_titles(state.provider.clone(), &query.q).await)
}

/// Popular titles in a genre, defaulting to the collection's favorite genre
pub async fn discover_titles(
    State(state): State<AppState>,
    Query(query): Query<DiscoverQuery>,
) -> AppResult<Json<Vec<DiscoveredMovie>>> {
    let min_rating = query.rating.unwrap_or(title_search::DEFAULT_MIN_RATING);
    if !(0.0..=10.0).contains(&min_rating) {
        return Err(AppError::InvalidInput(format!(
            "Rating floor {} is outside [0, 10]",
            min_rating
        )));
    }

    let genre = match query.genre {
        Some(genre) => genre,
        None => state.ratings.lock().await.favorite_genre(),
    };

    Ok(Json(
        title_search::discover_titles(state.provider.clone(), &genre, min_rating).await,
    ))
}

/// Looks up metadata in the background and applies it when it arrives
///
/// The result is dropped if the rating was deleted or retitled in the meantime.
fn spawn_metadata_lookup(state: AppState, id: i64, title: String) {
    tokio::spawn(async move {
        let Some(metadata) = title_search::lookup_metadata(state.provider.clone(), &title).await
        else {
            return;
        };

        if let Some(poster_path) = &metadata.poster_path {
            state
                .remember_poster(title.clone(), poster_path.clone())
                .await;
        }

        let mut ratings = state.ratings.lock().await;
        if ratings.get(id).is_some_and(|r| r.title != title) {
            tracing::debug!(rating_id = id, "Rating retitled before metadata arrived");
            return;
        }

        match ratings.attach_metadata(id, &metadata).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(rating_id = id, "Rating removed before metadata arrived");
            }
            Err(e) => tracing::warn!(error = %e, rating_id = id, "Failed to attach metadata"),
        }
    });
}
