//! # Transcript aggregation
//!
//! Reduces the sentence scores of one statement to a single weighted value:
//! `Σ(score·weight) / Σ(weight)`.
//!
//! A document whose sentences carry zero total weight (all boilerplate)
//! yields *no signal*, not `0.0`: zero is a meaningful neutral stance and
//! must stay distinguishable from "no data" all the way to the output
//! series. Collapsing the two would bias aggregates toward neutrality
//! whenever a source is silent.

use chrono::NaiveDate;

use crate::error::EngineError;
use crate::sentiment::{DocumentSentiment, SentenceScore};

/// Aggregate one document's sentences into a `DocumentSentiment`.
///
/// Returns `Ok(None)` when the document carries no usable weight (including
/// the empty-document case). Returns `Err(Validation)` when any sentence
/// violates its range contract; the caller drops the document whole (no
/// partial aggregation) and moves on with the batch.
pub fn document_sentiment(
    source: &str,
    date: NaiveDate,
    sentences: &[SentenceScore],
) -> Result<Option<DocumentSentiment>, EngineError> {
    match weighted_stance(sentences)? {
        Some(value) => Ok(Some(DocumentSentiment {
            source: source.to_string(),
            date,
            value,
        })),
        None => Ok(None),
    }
}

/// The weighted average itself, without the document envelope.
pub fn weighted_stance(sentences: &[SentenceScore]) -> Result<Option<f64>, EngineError> {
    for s in sentences {
        s.validate()?;
    }

    let mut num = 0.0f64;
    let mut denom = 0.0f64;
    for s in sentences {
        num += s.score * s.weight;
        denom += s.weight;
    }

    if denom == 0.0 {
        return Ok(None);
    }
    Ok(Some(num / denom))
}
