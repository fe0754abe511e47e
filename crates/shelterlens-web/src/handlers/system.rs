//! Liveness and fetch-cache control.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::state::SharedState;

/// GET /api/health: Status, configured sources and cache age
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    let (cache_age_secs, fetched_at, ttl_secs) = match state.sources.remote() {
        Some(cache) => (
            cache.age().await.map(|d| d.as_secs()),
            cache.fetched_at().await,
            Some(cache.ttl().as_secs()),
        ),
        None => (None, None, None),
    };

    let sources: Vec<Value> = state
        .sources
        .sources()
        .iter()
        .map(|s| json!({ "name": s.name(), "kind": s.kind() }))
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at,
        "reference": state.pipeline.reference().name,
        "categories_loaded": state.pipeline.category_map().len(),
        "sources": sources,
        "cache": {
            "age_secs": cache_age_secs,
            "fetched_at": fetched_at,
            "ttl_secs": ttl_secs,
        },
    }))
}

/// POST /api/refresh: Drop the memoised remote fetch
pub async fn refresh(State(state): State<SharedState>) -> Json<Value> {
    let refreshed = match state.sources.remote() {
        Some(cache) => {
            cache.invalidate().await;
            true
        }
        None => false,
    };
    info!(refreshed, "Refresh requested");
    Json(json!({ "refreshed": refreshed }))
}
