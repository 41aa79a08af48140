// src/ingest/types.rs
use anyhow::Result;
use chrono::NaiveDate;

/// One policy statement pulled from an institution's press feed,
/// pre-cleanup.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct TranscriptEvent {
    pub bank: String, // e.g., "Fed", "BoC"
    pub published_on: NaiveDate,
    pub url: String,
    pub text: String,
}

#[async_trait::async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<TranscriptEvent>>;
    fn name(&self) -> &'static str;
}
