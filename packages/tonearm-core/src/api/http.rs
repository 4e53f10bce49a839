//! HTTP route handlers.
//!
//! All handlers are thin - they delegate to services for business logic.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::response::api_success;
use crate::api::stream::{download_audio, stream_audio};
use crate::api::AppState;
use crate::error::GatewayResult;
use crate::protocol_constants::SERVICE_ID;

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Deserialize)]
struct LyricsParams {
    q: Option<String>,
    /// Kept as text so a malformed limit falls back to the default
    /// instead of rejecting the request.
    limit: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/search", get(search))
        .route("/lyrics/search", get(lyrics_search))
        .route("/audio/{id}", get(stream_audio))
        .route("/download/{id}", get(download_audio))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness check with upstream readiness attached.
///
/// Always 200 while the process serves requests; `ready` tells whether
/// catalog operations can run without initializing first.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    api_success(json!({
        "ok": true,
        "service": SERVICE_ID,
        "ready": state.readiness.is_ready(),
        "state": state.readiness.state(),
        "uptimeSeconds": state.started_at.elapsed().as_secs(),
    }))
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> GatewayResult<impl IntoResponse> {
    let tracks = state
        .search
        .search(params.q.as_deref().unwrap_or_default())
        .await?;
    Ok(api_success(tracks))
}

async fn lyrics_search(
    State(state): State<AppState>,
    Query(params): Query<LyricsParams>,
) -> GatewayResult<impl IntoResponse> {
    let limit = params.limit.and_then(|l| l.trim().parse::<usize>().ok());
    let hits = state.lyrics.search(params.q.as_deref(), limit).await?;
    Ok(api_success(hits))
}
