//! One-shot pipeline run: ingest both press feeds, classify whatever is
//! unscored (bounded batch), and print the divergence rows.
//!
//! ```bash
//! CLASSIFY_TEST_MODE=mock cargo run --bin pipeline_once
//! ```

use std::sync::Arc;

use dovetail_terminal::classify::{build_classifier, load_classifier_config};
use dovetail_terminal::config::AppConfig;
use dovetail_terminal::engine;
use dovetail_terminal::ingest::providers::{boc::BocPressProvider, fed::FedPressProvider};
use dovetail_terminal::ingest::types::TranscriptProvider;
use dovetail_terminal::ingest::run_once;
use dovetail_terminal::store::{MemoryStore, TranscriptStore};

/// Cap per run, mirroring the classifier's daily budget granularity.
const CLASSIFY_BATCH_LIMIT: usize = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter("dovetail_terminal=info,pipeline_once=info,warn")
        .compact()
        .init();

    let config = AppConfig::load_default();
    let store = Arc::new(MemoryStore::new());

    // 1) Ingest
    let providers: Vec<Box<dyn TranscriptProvider>> = vec![
        Box::new(FedPressProvider::default_http()),
        Box::new(BocPressProvider::default_http()),
    ];
    let outcome = run_once(&providers, store.as_ref()).await?;
    tracing::info!(
        stored = outcome.stored,
        short = outcome.skipped_short,
        duplicate = outcome.skipped_duplicate,
        "ingest finished"
    );

    // 2) Classify
    let classifier = build_classifier(&load_classifier_config());
    let batch = store.unscored(CLASSIFY_BATCH_LIMIT).await?;
    if batch.is_empty() {
        tracing::info!("no transcripts left to classify");
    }
    for row in batch {
        match classifier.classify(&row.text).await {
            Ok(sentences) => {
                if let Some(bad) = sentences.iter().find_map(|s| s.validate().err()) {
                    // A corrupted sentence taints the document; skip it whole.
                    tracing::warn!(id = row.id, bank = %row.bank, error = %bad, "document dropped");
                    continue;
                }
                let n = sentences.len();
                store.attach_sentences(row.id, sentences).await?;
                tracing::info!(id = row.id, bank = %row.bank, sentences = n, "classified");
            }
            Err(e) => {
                tracing::warn!(id = row.id, bank = %row.bank, error = ?e, "classification failed");
            }
        }
    }

    // 3) Divergence printout
    let rows = store.scored_documents().await?;
    let docs = engine::collect_documents(&rows);
    match engine::divergence_records(&docs, &config.divergence) {
        Ok(records) => {
            for r in &records {
                println!("{}", serde_json::to_string(r)?);
            }
            tracing::info!(days = records.len(), "divergence computed");
        }
        Err(e) => tracing::warn!(error = %e, "divergence unavailable"),
    }

    Ok(())
}
