//! HTTP API for the sound service
//!
//! Thin transport over [`SoundService`]: text operations answer with
//! `text/plain`, health and queue status with JSON.

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::SoundService;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Sound service (catalog, player chain and queue)
    pub service: Arc<SoundService>,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (no prefix for health endpoint)
        .route("/health", get(handlers::health))
        .nest(
            "/api/v1",
            Router::new()
                // Catalog endpoints
                .route("/search", get(handlers::search))
                .route("/categories", get(handlers::categories))
                .route("/categories/:name", get(handlers::browse))
                .route("/trending", get(handlers::trending))
                .route("/best", get(handlers::best_of_all_time))
                .route("/sounds/:slug", get(handlers::sound_details))
                // Playback endpoints
                .route("/play", post(handlers::play))
                .route("/queue", get(handlers::queue_status)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
