use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{assets, generate, handlers, middleware::metrics_middleware, publish, search, session};
use crate::state::AppState;

/// Upper bound for uploaded assets.
const MAX_ASSET_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Search
        .route("/search", get(search::search_simple))
        .route("/search", post(search::search_combined))
        .route("/search/images", post(search::search_images))
        // Stateless generation and publishing
        .route("/generate", post(generate::generate))
        .route("/publish/post", post(publish::publish_post))
        .route("/publish/thread", post(publish::publish_thread))
        // Local assets
        .route(
            "/assets",
            post(assets::upload_asset).layer(DefaultBodyLimit::max(MAX_ASSET_BYTES)),
        )
        // Composition session
        .route("/session", get(session::get_session))
        .route("/session/generate", post(session::generate))
        .route("/session/drafts", post(session::insert_draft))
        .route("/session/drafts/{position}", delete(session::remove_draft))
        .route("/session/drafts/{position}/text", put(session::set_text))
        .route("/session/drafts/{position}/image", post(session::select_image))
        .route(
            "/session/drafts/{position}/candidates",
            post(session::add_candidate),
        )
        .route("/session/images/refresh", post(session::refresh_images))
        .route("/session/publish", post(session::publish));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
