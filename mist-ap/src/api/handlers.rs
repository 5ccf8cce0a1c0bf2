//! HTTP request handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiResult, AppState};
use crate::error::{Error, Result};
use crate::service::PlayRequest;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    port: u16,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    /// Sounds waiting behind the one playing
    pending: usize,
    playing: bool,
}

/// Required, non-empty query parameter
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::BadRequest(format!("missing query parameter '{}'", name)))
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "mist-ap".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        port: state.port,
    })
}

// ============================================================================
// Catalog Endpoints
// ============================================================================

/// GET /api/v1/search?query=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<String> {
    let query = required(&params.query, "query")?;
    Ok(state.service.search(query).await)
}

/// GET /api/v1/categories
pub async fn categories(State(state): State<AppState>) -> String {
    state.service.categories()
}

/// GET /api/v1/categories/:name
pub async fn browse(State(state): State<AppState>, Path(name): Path<String>) -> String {
    state.service.browse(&name).await
}

/// GET /api/v1/trending
pub async fn trending(State(state): State<AppState>) -> String {
    state.service.trending().await
}

/// GET /api/v1/best
pub async fn best_of_all_time(State(state): State<AppState>) -> String {
    state.service.best_of_all_time().await
}

/// GET /api/v1/sounds/:slug
pub async fn sound_details(State(state): State<AppState>, Path(slug): Path<String>) -> String {
    state.service.sound_details(Some(&slug), None).await
}

// ============================================================================
// Playback Endpoints
// ============================================================================

/// POST /api/v1/play
pub async fn play(State(state): State<AppState>, Json(req): Json<PlayRequest>) -> String {
    info!(
        "Play request: slug={:?} url={:?} query={:?} wait={:?}",
        req.slug, req.url, req.query, req.wait
    );
    state.service.play_sound(req).await
}

/// GET /api/v1/queue
pub async fn queue_status(State(state): State<AppState>) -> Json<QueueResponse> {
    let queue = state.service.queue();
    Json(QueueResponse {
        pending: queue.len().await,
        playing: queue.is_playing().await,
    })
}
