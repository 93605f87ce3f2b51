use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::cache::FeedCache;
use crate::source::types::{FeedItem, InstagramSource, ProfileSnapshot};

/// Feed size served when the widget does not ask for one.
pub const DEFAULT_REQUEST_LIMIT: usize = 4;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<FeedCache>,
    pub source: Arc<dyn InstagramSource>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/feed", get(feed))
        .route("/debug/cache", get(debug_cache))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct FeedResponse {
    profile: ProfileSnapshot,
    feed: Vec<FeedItem>,
}

/// Cached profile plus a live feed fetch. The feed bypasses the cache so new
/// posts show up without waiting out the TTL; only the rarely-changing profile
/// fields are cache-backed. Always answers 200: upstream failures degrade to
/// the fallback profile / empty feed instead of an error status.
async fn feed(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<FeedResponse> {
    // Lenient limit parsing: anything unusable means the default.
    let limit = q
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_REQUEST_LIMIT);

    let profile = state.cache.profile().await;
    let feed = match state.source.fetch_feed(limit).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = ?e, "live feed fetch failed");
            Vec::new()
        }
    };
    Json(FeedResponse { profile, feed })
}

#[derive(serde::Serialize)]
struct CacheDebug {
    status: String,
    timestamp: Option<i64>,
    age_secs: Option<i64>,
}

async fn debug_cache(State(state): State<AppState>) -> Json<CacheDebug> {
    let status = state.cache.status().await;
    let snapshot = state.cache.snapshot().await;
    let timestamp = snapshot.as_ref().map(|r| r.timestamp.timestamp());
    let age_secs = snapshot.map(|r| {
        chrono::Utc::now()
            .signed_duration_since(r.timestamp)
            .num_seconds()
    });
    Json(CacheDebug {
        status: format!("{status:?}"),
        timestamp,
        age_secs,
    })
}
