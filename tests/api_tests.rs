use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use cinematch_api::api::{create_router, AppState};
use cinematch_api::db::{MemoryStore, SlotStore};
use cinematch_api::error::{AppError, AppResult};
use cinematch_api::models::{DiscoveredMovie, MovieMetadata, Rating};
use cinematch_api::services::{
    codec, providers::MetadataProvider, FixedDelta, RatingCollectionManager,
};

const SLOT: &str = "watchedMoviesData";

/// Provider returning canned data
#[derive(Default)]
struct StubProvider {
    titles: Vec<String>,
    metadata: Option<MovieMetadata>,
    discovered: Vec<DiscoveredMovie>,
}

#[async_trait::async_trait]
impl MetadataProvider for StubProvider {
    async fn search_titles(&self, _query: &str) -> AppResult<Vec<String>> {
        Ok(self.titles.clone())
    }

    async fn fetch_metadata(&self, _title: &str) -> AppResult<Option<MovieMetadata>> {
        Ok(self.metadata.clone())
    }

    async fn discover(&self, genre: &str, min_rating: f64) -> AppResult<Vec<DiscoveredMovie>> {
        Ok(self
            .discovered
            .iter()
            .filter(|m| m.metadata.genres.iter().any(|g| g.eq_ignore_ascii_case(genre)))
            .filter(|m| m.metadata.external_rating.unwrap_or(0.0) >= min_rating)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Provider that always fails
struct DownProvider;

#[async_trait::async_trait]
impl MetadataProvider for DownProvider {
    async fn search_titles(&self, _query: &str) -> AppResult<Vec<String>> {
        Err(AppError::ExternalApi("unavailable".to_string()))
    }

    async fn fetch_metadata(&self, _title: &str) -> AppResult<Option<MovieMetadata>> {
        Err(AppError::ExternalApi("unavailable".to_string()))
    }

    async fn discover(&self, _genre: &str, _min_rating: f64) -> AppResult<Vec<DiscoveredMovie>> {
        Err(AppError::ExternalApi("unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

fn create_test_server_with(
    provider: Arc<dyn MetadataProvider>,
) -> (TestServer, MemoryStore, AppState) {
    let store = MemoryStore::new();
    let ratings = RatingCollectionManager::new(
        Arc::new(store.clone()),
        SLOT,
        Arc::new(FixedDelta::new(0.2)),
    );
    let state = AppState::new(ratings, provider);
    let server = TestServer::new(create_router(state.clone())).unwrap();
    (server, store, state)
}

fn create_test_server() -> (TestServer, MemoryStore, AppState) {
    create_test_server_with(Arc::new(StubProvider::default()))
}

fn alien_metadata() -> MovieMetadata {
    MovieMetadata {
        genres: vec!["Horror".to_string(), "Science Fiction".to_string()],
        poster_path: Some("/alien.jpg".to_string()),
        external_rating: Some(8.1),
        year: Some(1979),
    }
}

fn discovered(title: &str, genre: &str, external_rating: f64) -> DiscoveredMovie {
    DiscoveredMovie {
        title: title.to_string(),
        metadata: MovieMetadata {
            genres: vec![genre.to_string()],
            poster_path: None,
            external_rating: Some(external_rating),
            year: None,
        },
    }
}

async fn create(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/v1/ratings").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_health_check() {
    let (server, _, _) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_three_loved_movies() {
    let (server, _, _) = create_test_server();

    let first = create(&server, json!({ "title": "Heat", "sentiment": "loved" })).await;
    assert_eq!(first["score"], 10.0);

    let second = create(
        &server,
        json!({
            "title": "Collateral",
            "sentiment": "Loved it",
            "referenceId": first["id"],
            "referenceIsBetter": false
        }),
    )
    .await;
    let second_score = second["score"].as_f64().unwrap();
    assert!((second_score - 9.8).abs() < 1e-9);

    let third = create(&server, json!({ "title": "Thief", "sentiment": "loved" })).await;
    let third_score = third["score"].as_f64().unwrap();
    assert!((third_score - 9.9).abs() < 1e-9);

    let response = server.get("/api/v1/ratings").await;
    response.assert_status_ok();
    let ratings: Vec<Value> = response.json();
    let titles: Vec<&str> = ratings.iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Heat", "Collateral", "Thief"]);
}

#[tokio::test]
async fn test_create_without_sentiment_is_rejected() {
    let (server, store, _) = create_test_server();

    let response = server
        .post("/api/v1/ratings")
        .json(&json!({ "title": "Heat" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let ratings: Vec<Value> = server.get("/api/v1/ratings").await.json();
    assert!(ratings.is_empty());
    assert_eq!(store.get(SLOT).await.unwrap(), None);
}

#[tokio::test]
async fn test_mutations_are_persisted() {
    let (server, store, _) = create_test_server();

    create(&server, json!({ "title": "Heat", "sentiment": "loved", "genres": ["Crime"] })).await;
    create(&server, json!({ "title": "Cats", "sentiment": "disliked", "year": 2019 })).await;

    let listed: Vec<Rating> = server.get("/api/v1/ratings").await.json();
    let persisted = codec::decode(&store.get(SLOT).await.unwrap().unwrap()).unwrap();
    assert_eq!(persisted, listed);
}

#[tokio::test]
async fn test_update_and_missing_update() {
    let (server, _, _) = create_test_server();
    let created = create(&server, json!({ "title": "Heat", "sentiment": "fine" })).await;
    let id = created["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/v1/ratings/{}", id))
        .json(&json!({ "title": "Heat (1995)", "sentiment": "disliked" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["id"], id);
    assert_eq!(updated["score"], 6.4);
    assert_eq!(updated["title"], "Heat (1995)");

    let response = server
        .put("/api/v1/ratings/999")
        .json(&json!({ "title": "Ghost", "sentiment": "fine" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoints() {
    let (server, _, _) = create_test_server();
    for title in ["A", "B", "C", "D"] {
        create(&server, json!({ "title": title, "sentiment": "fine" })).await;
    }

    server
        .delete("/api/v1/ratings/1")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/api/v1/ratings/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .post("/api/v1/ratings/delete")
        .json(&json!({ "positions": [0, 7] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let ratings: Vec<Value> = server.get("/api/v1/ratings").await.json();
    assert_eq!(ratings.len(), 3);

    let response = server
        .post("/api/v1/ratings/delete")
        .json(&json!({ "ids": [2, 42] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["removed"], 1);

    let response = server
        .post("/api/v1/ratings/delete")
        .json(&json!({ "positions": [0] }))
        .await;
    response.assert_status_ok();

    let ratings: Vec<Value> = server.get("/api/v1/ratings").await.json();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["title"], "D");

    server
        .post("/api/v1/ratings/delete")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ranked_summary_and_reference() {
    let (server, _, _) = create_test_server();
    create(&server, json!({ "title": "Meh", "sentiment": "disliked", "genres": ["Comedy"] })).await;
    create(&server, json!({ "title": "Great", "sentiment": "loved", "genres": ["Drama"] })).await;
    create(&server, json!({ "title": "Okay", "sentiment": "fine", "genres": ["Drama", "Comedy"] })).await;

    let ranked: Vec<Value> = server.get("/api/v1/ratings/ranked").await.json();
    let order: Vec<(&str, &str)> = ranked
        .iter()
        .map(|r| (r["title"].as_str().unwrap(), r["tier"].as_str().unwrap()))
        .collect();
    assert_eq!(order, vec![("Great", "S"), ("Okay", "A"), ("Meh", "C")]);

    let summary: Value = server.get("/api/v1/ratings/summary").await.json();
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["favoriteGenre"], "Drama");

    let response = server
        .get("/api/v1/ratings/reference")
        .add_query_param("sentiment", "fine")
        .await;
    response.assert_status_ok();
    let reference: Value = response.json();
    assert_eq!(reference["title"], "Okay");

    let reference: Value = server
        .get("/api/v1/ratings/reference")
        .add_query_param("sentiment", "fine")
        .add_query_param("exclude", 3)
        .await
        .json();
    assert!(reference.is_null());
}

#[tokio::test]
async fn test_metadata_arrives_after_create() {
    let provider = Arc::new(StubProvider {
        metadata: Some(alien_metadata()),
        ..Default::default()
    });
    let (server, _, _) = create_test_server_with(provider);

    let created = create(&server, json!({ "title": "Alien", "sentiment": "loved" })).await;
    let id = created["id"].as_i64().unwrap();

    let mut rating: Value = Value::Null;
    for _ in 0..50 {
        rating = server.get(&format!("/api/v1/ratings/{}", id)).await.json();
        if rating["year"] == 1979 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(rating["year"], 1979);
    assert_eq!(rating["genres"], json!(["Horror", "Science Fiction"]));
    assert_eq!(rating["score"], 10.0);

    let ranked: Vec<Value> = server.get("/api/v1/ratings/ranked").await.json();
    assert_eq!(ranked[0]["posterPath"], "/alien.jpg");
}

#[tokio::test]
async fn test_title_suggestions() {
    let provider = Arc::new(StubProvider {
        titles: vec![
            "Alien".to_string(),
            "Aliens".to_string(),
            "Alien".to_string(),
            "Predator".to_string(),
        ],
        ..Default::default()
    });
    let (server, _, _) = create_test_server_with(provider);

    let suggestions: Vec<String> = server
        .get("/api/v1/titles/suggest")
        .add_query_param("q", "ALI")
        .await
        .json();
    assert_eq!(suggestions, vec!["Alien", "Aliens"]);

    let suggestions: Vec<String> = server
        .get("/api/v1/titles/suggest")
        .add_query_param("q", "a")
        .await
        .json();
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn test_provider_outage_degrades_quietly() {
    let (server, _, _) = create_test_server_with(Arc::new(DownProvider));

    let suggestions: Vec<String> = server
        .get("/api/v1/titles/suggest")
        .add_query_param("q", "alien")
        .await
        .json();
    assert!(suggestions.is_empty());

    let created = create(&server, json!({ "title": "Alien", "sentiment": "fine" })).await;
    assert_eq!(created["score"], 8.4);
}

#[tokio::test]
async fn test_startup_with_corrupt_slot() {
    let store = MemoryStore::with_slot(SLOT, "garbage!!");
    let mut ratings = RatingCollectionManager::new(
        Arc::new(store.clone()),
        SLOT,
        Arc::new(FixedDelta::new(0.2)),
    );
    ratings.load().await;

    let state = AppState::new(ratings, Arc::new(DownProvider));
    let server = TestServer::new(create_router(state)).unwrap();

    let listed: Vec<Value> = server.get("/api/v1/ratings").await.json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_posters_refreshed_for_loaded_ratings() {
    let stored = vec![Rating {
        id: 7,
        title: "Alien".to_string(),
        score: 9.6,
        genres: vec!["Horror".to_string()],
        external_rating: 8.1,
        year: 1979,
    }];
    let store = MemoryStore::with_slot(SLOT, codec::encode(&stored).unwrap());
    let mut ratings = RatingCollectionManager::new(
        Arc::new(store),
        SLOT,
        Arc::new(FixedDelta::new(0.2)),
    );
    ratings.load().await;

    let provider = Arc::new(StubProvider {
        metadata: Some(alien_metadata()),
        ..Default::default()
    });
    let state = AppState::new(ratings, provider);
    state.refresh_posters().await;
    let server = TestServer::new(create_router(state)).unwrap();

    let mut ranked: Vec<Value> = Vec::new();
    for _ in 0..50 {
        ranked = server.get("/api/v1/ratings/ranked").await.json();
        if ranked[0]["posterPath"] == "/alien.jpg" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(ranked[0]["posterPath"], "/alien.jpg");
    assert_eq!(ranked[0]["score"], 9.6);
}

#[tokio::test]
async fn test_discover_by_genre_and_favorite() {
    let provider = Arc::new(StubProvider {
        discovered: vec![
            discovered("Heat", "Crime", 8.3),
            discovered("Ronin", "Crime", 6.9),
            discovered("Amelie", "Comedy", 7.9),
        ],
        ..Default::default()
    });
    let (server, _, _) = create_test_server_with(provider);

    let movies: Vec<Value> = server
        .get("/api/v1/titles/discover")
        .add_query_param("genre", "comedy")
        .await
        .json();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["title"], "Amelie");

    // No ratings yet, so no favorite genre to fall back on
    let movies: Vec<Value> = server.get("/api/v1/titles/discover").await.json();
    assert!(movies.is_empty());

    create(&server, json!({ "title": "Thief", "sentiment": "loved", "genres": ["Crime"] })).await;

    let movies: Vec<Value> = server.get("/api/v1/titles/discover").await.json();
    let titles: Vec<&str> = movies.iter().map(|m| m["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Heat"]);

    let movies: Vec<Value> = server
        .get("/api/v1/titles/discover")
        .add_query_param("rating", 6.5)
        .await
        .json();
    assert_eq!(movies.len(), 2);

    server
        .get("/api/v1/titles/discover")
        .add_query_param("rating", 11)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_discover_outage_gives_empty_list() {
    let (server, _, _) = create_test_server_with(Arc::new(DownProvider));

    let response = server
        .get("/api/v1/titles/discover")
        .add_query_param("genre", "Drama")
        .await;
    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert!(movies.is_empty());
}
