//! # Sentence & document sentiment values
//!
//! `SentenceScore` is the record the external classifier hands us: one
//! sentence, a stance score in `[-1, 1]` (hawkish positive, dovish
//! negative), an impact weight in `[0, 1]`, and the classifier's one-line
//! reasoning. The engine validates these at its boundary and everything
//! downstream may assume the ranges hold.
//!
//! `DocumentSentiment` is the per-statement reduction: one weighted value
//! per `(source, publish date)`. It is created once, after all sentence
//! scores for the document are available, and never mutated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Primary topic of a classified sentence. Variant names match the strings
/// the classifier is prompted to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topic {
    Inflation,
    Growth,
    Employment,
    Guidance,
    Boilerplate,
}

/// One classified sentence from a policy statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceScore {
    pub text: String,
    pub topic: Topic,
    /// Hawkish(+) / dovish(−) stance, in `[-1.0, 1.0]`.
    pub score: f64,
    /// Market-impact importance, in `[0.0, 1.0]`. Exactly 0.0 means the
    /// sentence contributes nothing to any weighted average.
    pub weight: f64,
    pub reasoning: String,
}

impl SentenceScore {
    /// Check the record against its contract. A violation taints the whole
    /// document: callers drop it rather than aggregate partially, since a
    /// corrupted sentence invalidates trust in the rest of the same batch.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.text.trim().is_empty() {
            return Err(EngineError::validation("empty sentence text"));
        }
        if !self.score.is_finite() || !(-1.0..=1.0).contains(&self.score) {
            return Err(EngineError::validation(format!(
                "score {} outside [-1.0, 1.0]",
                self.score
            )));
        }
        if !self.weight.is_finite() || !(0.0..=1.0).contains(&self.weight) {
            return Err(EngineError::validation(format!(
                "weight {} outside [0.0, 1.0]",
                self.weight
            )));
        }
        Ok(())
    }
}

/// Weighted stance of one full statement. Immutable after creation; a
/// document with zero usable weight never produces one of these (see
/// `analysis::aggregate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSentiment {
    /// Institution identifier, e.g. "Fed", "BoC".
    pub source: String,
    /// Publish date of the statement, not ingestion date.
    pub date: NaiveDate,
    pub value: f64,
}
