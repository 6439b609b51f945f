pub mod export;
pub mod penduduk;

use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::handlers;
use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(handlers::login))
        .merge(penduduk::router())
        .merge(export::router())
}

/// The full application: API routes, read-only serving of the uploads
/// directory, CORS for the browser frontend, request tracing.
pub fn app(state: AppState) -> Router {
    api_router()
        .nest_service("/uploads", ServeDir::new(state.config.uploads_path()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
