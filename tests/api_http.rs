// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/divergence (empty store and seeded store)
// - GET /api/transcripts + /api/transcripts/{id}/sentences
// - GET /api/market (overlay + degenerate range)

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use dovetail_terminal::api::{router, AppState};
use dovetail_terminal::config::AppConfig;
use dovetail_terminal::feed::FixtureFeed;
use dovetail_terminal::sentiment::{SentenceScore, Topic};
use dovetail_terminal::store::{MemoryStore, TranscriptStore};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn sentence(score: f64, weight: f64) -> SentenceScore {
    SentenceScore {
        text: "The committee will act as needed.".into(),
        topic: Topic::Guidance,
        score,
        weight,
        reasoning: "test fixture".into(),
    }
}

fn app_with(store: Arc<MemoryStore>, feed: FixtureFeed) -> Router {
    let state = AppState {
        store,
        feed: Arc::new(feed),
        config: Arc::new(AppConfig::seed()),
    };
    router(state)
}

/// Store seeded with the worked example:
/// Fed = {01-01: 0.4, 01-04: 0.6}, BoC = {01-02: -0.2}.
async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (bank, day, score, url) in [
        ("Fed", 1, 0.4, "https://x/fed-1"),
        ("Fed", 4, 0.6, "https://x/fed-4"),
        ("BoC", 2, -0.2, "https://x/boc-2"),
    ] {
        let id = store
            .insert_transcript(bank, d(day), url, "statement text")
            .await
            .unwrap()
            .unwrap();
        store
            .attach_sentences(id, vec![sentence(score, 1.0)])
            .await
            .unwrap();
    }
    store
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v: Json = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn health_returns_200_and_ok_body() {
    let app = app_with(Arc::new(MemoryStore::new()), FixtureFeed::default());

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(std::str::from_utf8(&bytes).unwrap(), "ok");
}

#[tokio::test]
async fn divergence_on_empty_store_is_empty_array_not_error() {
    let app = app_with(Arc::new(MemoryStore::new()), FixtureFeed::default());
    let (status, v) = get_json(app, "/api/divergence").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!([]));
}

#[tokio::test]
async fn divergence_serves_the_aligned_records() {
    let app = app_with(seeded_store().await, FixtureFeed::default());
    let (status, v) = get_json(app, "/api/divergence").await;
    assert_eq!(status, StatusCode::OK);

    let rows = v.as_array().expect("array body");
    assert_eq!(rows.len(), 4, "inclusive day span 01-01..01-04");

    assert_eq!(rows[0]["date"], serde_json::json!("2024-01-01"));
    assert!((rows[0]["fed"].as_f64().unwrap() - 0.4).abs() < 1e-9);
    assert!((rows[0]["boc"].as_f64().unwrap() - 0.0).abs() < 1e-9);

    let last = &rows[3];
    assert_eq!(last["date"], serde_json::json!("2024-01-04"));
    assert!((last["fed"].as_f64().unwrap() - 0.6).abs() < 1e-9);
    assert!((last["boc"].as_f64().unwrap() + 0.2).abs() < 1e-9);
    assert!((last["divergence"].as_f64().unwrap() - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn divergence_with_one_sided_data_names_the_missing_column() {
    // Only Fed has data; the configured pair needs BoC too.
    let store = Arc::new(MemoryStore::new());
    let id = store
        .insert_transcript("Fed", d(1), "https://x/fed-1", "statement text")
        .await
        .unwrap()
        .unwrap();
    store
        .attach_sentences(id, vec![sentence(0.4, 1.0)])
        .await
        .unwrap();

    let app = app_with(store, FixtureFeed::default());
    let (status, v) = get_json(app, "/api/divergence").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(v["error"].as_str().unwrap().contains("BoC"));
}

#[tokio::test]
async fn transcripts_list_and_sentences_round() {
    let store = seeded_store().await;
    let app = app_with(store, FixtureFeed::default());

    let (status, v) = get_json(app.clone(), "/api/transcripts").await;
    assert_eq!(status, StatusCode::OK);
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    // Ascending by publish date.
    assert_eq!(rows[0]["bank"], serde_json::json!("Fed"));
    assert_eq!(rows[1]["bank"], serde_json::json!("BoC"));
    assert_eq!(rows[0]["scored"], serde_json::json!(true));

    let id = rows[0]["id"].as_u64().unwrap();
    let (status, v) = get_json(app.clone(), &format!("/api/transcripts/{id}/sentences")).await;
    assert_eq!(status, StatusCode::OK);
    let sentences = v.as_array().unwrap();
    assert_eq!(sentences.len(), 1);
    assert_eq!(sentences[0]["topic"], serde_json::json!("Guidance"));

    let (status, _) = get_json(app, "/api/transcripts/9999/sentences").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn market_overlay_forward_fills_and_normalizes() {
    let feed = FixtureFeed {
        closes: BTreeMap::from([(d(1), 1.30), (d(2), 1.32), (d(4), 1.28)]),
    };
    let app = app_with(seeded_store().await, feed);

    let (status, v) = get_json(app, "/api/market").await;
    assert_eq!(status, StatusCode::OK);
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 4);

    // 01-03 has no close; it forward-fills from 01-02.
    assert_eq!(rows[2]["date"], serde_json::json!("2024-01-03"));
    assert!((rows[2]["price"].as_f64().unwrap() - 1.32).abs() < 1e-9);
    // min = 1.28, max = 1.32 → 01-01 normalizes to 0.5.
    assert!((rows[0]["normalized"].as_f64().unwrap() - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn market_with_single_close_is_unprocessable_not_flat() {
    let feed = FixtureFeed {
        closes: BTreeMap::from([(d(1), 1.30)]),
    };
    let app = app_with(seeded_store().await, feed);

    let (status, v) = get_json(app, "/api/market").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(v["error"]
        .as_str()
        .unwrap()
        .contains("degenerate price range"));
}

#[tokio::test]
async fn market_on_empty_store_is_empty_array() {
    let feed = FixtureFeed {
        closes: BTreeMap::from([(d(1), 1.30), (d(2), 1.32)]),
    };
    let app = app_with(Arc::new(MemoryStore::new()), feed);
    let (status, v) = get_json(app, "/api/market").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!([]));
}
