//! # Sparse per-source series
//!
//! Groups document sentiments by `(source, date)` into one sparse daily
//! series per institution. Gaps stay absent here (no zeros, no nulls); the
//! calendar aligner owns every filling decision.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::sentiment::DocumentSentiment;

/// One institution's irregularly-dated sentiment points. Dates are unique
/// by construction; same-source same-date documents are pre-aggregated by
/// `build_sparse_series`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseSeries {
    pub source: String,
    pub points: BTreeMap<NaiveDate, f64>,
}

impl SparseSeries {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }
}

/// Build one `SparseSeries` per distinct source, sorted by source name.
///
/// Tie-break when several documents from one source share a date: plain
/// arithmetic mean of their values. Cross-document importance is not
/// modeled, so the mean is deliberately not weight-aware.
pub fn build_sparse_series(docs: &[DocumentSentiment]) -> Vec<SparseSeries> {
    let mut grouped: BTreeMap<&str, BTreeMap<NaiveDate, Vec<f64>>> = BTreeMap::new();
    for d in docs {
        grouped
            .entry(d.source.as_str())
            .or_default()
            .entry(d.date)
            .or_default()
            .push(d.value);
    }

    grouped
        .into_iter()
        .map(|(source, by_date)| SparseSeries {
            source: source.to_string(),
            points: by_date
                .into_iter()
                .map(|(date, vals)| {
                    let mean = vals.iter().sum::<f64>() / vals.len() as f64;
                    (date, mean)
                })
                .collect(),
        })
        .collect()
}
