use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Ratings
        .route(
            "/ratings",
            get(handlers::list_ratings).post(handlers::create_rating),
        )
        .route("/ratings/ranked", get(handlers::ranked_ratings))
        .route("/ratings/summary", get(handlers::summary))
        .route("/ratings/reference", get(handlers::reference_candidate))
        .route("/ratings/delete", post(handlers::bulk_delete))
        .route(
            "/ratings/:id",
            get(handlers::get_rating)
                .put(handlers::update_rating)
                .delete(handlers::delete_rating),
        )
        // Titles
        .route("/titles/suggest", get(handlers::suggest_titles))
        .route("/titles/discover", get(handlers::discover_titles))
}
