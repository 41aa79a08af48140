//! # Transcript store (persistence boundary)
//!
//! The engine consumes documents as `(source, date, [SentenceScore])`
//! tuples and knows nothing about storage schema or transactions; this
//! module is that boundary. `MemoryStore` is the in-process implementation
//! used by the service and seeded directly by tests; a database-backed
//! implementation would slot in behind the same trait.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::sentiment::SentenceScore;

/// A stored policy statement.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptRow {
    pub id: u64,
    pub bank: String,
    pub published_on: NaiveDate,
    pub url: String,
    pub text: String,
}

/// List view without the full text.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSummary {
    pub id: u64,
    pub bank: String,
    pub published_on: NaiveDate,
    pub url: String,
    /// Whether sentence scores have been attached yet.
    pub scored: bool,
}

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Insert a transcript; idempotent on URL. Returns the new id, or
    /// `None` when the URL was already present.
    async fn insert_transcript(
        &self,
        bank: &str,
        published_on: NaiveDate,
        url: &str,
        text: &str,
    ) -> Result<Option<u64>>;

    /// All transcripts, ascending by publish date then id.
    async fn list_transcripts(&self) -> Result<Vec<TranscriptSummary>>;

    /// `(bank, text)` pairs of everything stored; used by the ingest
    /// pipeline's near-duplicate filter.
    async fn transcript_texts(&self) -> Result<Vec<(String, String)>>;

    /// Transcripts with no sentence scores yet, oldest first, capped.
    async fn unscored(&self, limit: usize) -> Result<Vec<TranscriptRow>>;

    /// Attach classifier output to a transcript. Fails on unknown id.
    async fn attach_sentences(&self, id: u64, sentences: Vec<SentenceScore>) -> Result<()>;

    /// Sentence scores for one transcript; `None` for unknown id or when
    /// not yet classified.
    async fn sentences_for(&self, id: u64) -> Result<Option<Vec<SentenceScore>>>;

    /// The engine-facing tuple shape: one entry per scored transcript.
    async fn scored_documents(&self) -> Result<Vec<(String, NaiveDate, Vec<SentenceScore>)>>;
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    rows: Vec<TranscriptRow>,
    sentences: HashMap<u64, Vec<SentenceScore>>,
}

/// Mutex-guarded in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptStore for MemoryStore {
    async fn insert_transcript(
        &self,
        bank: &str,
        published_on: NaiveDate,
        url: &str,
        text: &str,
    ) -> Result<Option<u64>> {
        let mut g = self.inner.lock().expect("store mutex poisoned");
        if g.rows.iter().any(|r| r.url == url) {
            return Ok(None);
        }
        g.next_id += 1;
        let id = g.next_id;
        g.rows.push(TranscriptRow {
            id,
            bank: bank.to_string(),
            published_on,
            url: url.to_string(),
            text: text.to_string(),
        });
        Ok(Some(id))
    }

    async fn list_transcripts(&self) -> Result<Vec<TranscriptSummary>> {
        let g = self.inner.lock().expect("store mutex poisoned");
        let mut out: Vec<TranscriptSummary> = g
            .rows
            .iter()
            .map(|r| TranscriptSummary {
                id: r.id,
                bank: r.bank.clone(),
                published_on: r.published_on,
                url: r.url.clone(),
                scored: g.sentences.contains_key(&r.id),
            })
            .collect();
        out.sort_by_key(|r| (r.published_on, r.id));
        Ok(out)
    }

    async fn transcript_texts(&self) -> Result<Vec<(String, String)>> {
        let g = self.inner.lock().expect("store mutex poisoned");
        Ok(g.rows
            .iter()
            .map(|r| (r.bank.clone(), r.text.clone()))
            .collect())
    }

    async fn unscored(&self, limit: usize) -> Result<Vec<TranscriptRow>> {
        let g = self.inner.lock().expect("store mutex poisoned");
        let mut out: Vec<TranscriptRow> = g
            .rows
            .iter()
            .filter(|r| !g.sentences.contains_key(&r.id))
            .cloned()
            .collect();
        out.sort_by_key(|r| (r.published_on, r.id));
        out.truncate(limit);
        Ok(out)
    }

    async fn attach_sentences(&self, id: u64, sentences: Vec<SentenceScore>) -> Result<()> {
        let mut g = self.inner.lock().expect("store mutex poisoned");
        if !g.rows.iter().any(|r| r.id == id) {
            bail!("unknown transcript id {id}");
        }
        g.sentences.insert(id, sentences);
        Ok(())
    }

    async fn sentences_for(&self, id: u64) -> Result<Option<Vec<SentenceScore>>> {
        let g = self.inner.lock().expect("store mutex poisoned");
        Ok(g.sentences.get(&id).cloned())
    }

    async fn scored_documents(&self) -> Result<Vec<(String, NaiveDate, Vec<SentenceScore>)>> {
        let g = self.inner.lock().expect("store mutex poisoned");
        let mut out = Vec::new();
        for r in &g.rows {
            if let Some(s) = g.sentences.get(&r.id) {
                out.push((r.bank.clone(), r.published_on, s.clone()));
            }
        }
        Ok(out)
    }
}
