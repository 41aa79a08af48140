use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppConfig;
use crate::engine;
use crate::error::EngineError;
use crate::feed::PriceFeed;
use crate::store::TranscriptStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TranscriptStore>,
    pub feed: Arc<dyn PriceFeed>,
    pub config: Arc<AppConfig>,
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/divergence", get(divergence))
        .route("/api/transcripts", get(transcripts))
        .route("/api/transcripts/{id}/sentences", get(transcript_sentences))
        .route("/api/market", get(market))
        .layer(cors)
        .with_state(state)
}

/// Explicit origin list when configured (production frontend); very
/// permissive otherwise (local development).
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }
    let list: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(list))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// The aligned divergence view for the configured institution pair, one
/// record per calendar day in ascending order.
async fn divergence(State(state): State<AppState>) -> Response {
    let rows = match state.store.scored_documents().await {
        Ok(rows) => rows,
        Err(e) => return storage_failure(e),
    };
    let docs = engine::collect_documents(&rows);
    match engine::divergence_records(&docs, &state.config.divergence) {
        Ok(records) => Json(records).into_response(),
        Err(e) => engine_failure(e),
    }
}

/// Market overlay over the sentiment calendar: raw close plus its min/max
/// normalization. Days before the first close are omitted.
async fn market(State(state): State<AppState>) -> Response {
    let rows = match state.store.scored_documents().await {
        Ok(rows) => rows,
        Err(e) => return storage_failure(e),
    };
    let docs = engine::collect_documents(&rows);
    let aligned = match engine::aligned_from_documents(&docs) {
        Ok(a) => a,
        Err(e) => return engine_failure(e),
    };

    let (start, end) = match (aligned.calendar.first(), aligned.calendar.last()) {
        (Some(&s), Some(&e)) => (s, e),
        _ => return Json(json!([])).into_response(),
    };

    let closes = match state.feed.daily_closes(start, end).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = ?e, feed = state.feed.name(), "price feed error");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "price feed unavailable" })),
            )
                .into_response();
        }
    };

    match engine::market_records(&closes, &aligned.calendar) {
        Ok(records) => Json(records).into_response(),
        Err(e) => engine_failure(e),
    }
}

async fn transcripts(State(state): State<AppState>) -> Response {
    match state.store.list_transcripts().await {
        Ok(list) => Json(list).into_response(),
        Err(e) => storage_failure(e),
    }
}

async fn transcript_sentences(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Response {
    match state.store.sentences_for(id).await {
        Ok(Some(sentences)) => Json(sentences).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no sentences for transcript {id}") })),
        )
            .into_response(),
        Err(e) => storage_failure(e),
    }
}

/// `EmptyInput` is "nothing ingested yet": an empty result set, not a
/// failure. The other structural errors surface as 422 with their message;
/// defaulting them would hand the chart a fake measurement.
fn engine_failure(err: EngineError) -> Response {
    match err {
        EngineError::EmptyInput => Json(json!([])).into_response(),
        other => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}

fn storage_failure(err: anyhow::Error) -> Response {
    tracing::error!(error = ?err, "store error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "storage unavailable" })),
    )
        .into_response()
}
