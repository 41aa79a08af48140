//! # Series Engine
//! Pure, testable assembly that maps stored `(source, date, sentences)`
//! tuples → the record shapes the API serves. No I/O, suitable for unit
//! tests and offline evaluation.
//!
//! Policy: per-document validation failures are isolated (document skipped,
//! batch continues); structural failures (`EmptyInput`, `ColumnNotFound`,
//! `DegenerateRange`) abort only the requested computation and propagate.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{align, build_sparse_series, divergence, merge_onto_calendar, AlignedSeries};
use crate::error::EngineError;
use crate::sentiment::{DocumentSentiment, SentenceScore};

/// Which two institutions to spread. Caller configuration; the engine has
/// no built-in pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergencePair {
    pub left: String,
    pub right: String,
}

/// One output row: a date plus one value per column. Serializes flat as
/// `{"date": "2024-01-01", "fed": 0.4, "boc": -0.2, "divergence": 0.6}`,
/// the one shape that must stay stable for chart consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub columns: BTreeMap<String, f64>,
}

/// One market-overlay row over the sentiment calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub date: NaiveDate,
    pub price: f64,
    pub normalized: f64,
}

/// Reduce stored tuples to document sentiments, dropping bad documents and
/// no-signal documents. A validation failure never aborts the batch.
pub fn collect_documents(
    rows: &[(String, NaiveDate, Vec<SentenceScore>)],
) -> Vec<DocumentSentiment> {
    let mut docs = Vec::with_capacity(rows.len());
    for (source, date, sentences) in rows {
        match crate::analysis::document_sentiment(source, *date, sentences) {
            Ok(Some(doc)) => docs.push(doc),
            Ok(None) => {} // zero usable weight: no signal, not 0.0
            Err(e) => {
                tracing::warn!(source = %source, date = %date, error = %e, "document dropped");
            }
        }
    }
    docs
}

/// Align all sources present in `docs` onto the shared daily calendar.
pub fn aligned_from_documents(docs: &[DocumentSentiment]) -> Result<AlignedSeries, EngineError> {
    align(&build_sparse_series(docs))
}

/// Full divergence view: one record per calendar day, ascending, with a
/// lowercased column per institution plus the `divergence` spread for the
/// configured pair.
pub fn divergence_records(
    docs: &[DocumentSentiment],
    pair: &DivergencePair,
) -> Result<Vec<SeriesRecord>, EngineError> {
    let aligned = aligned_from_documents(docs)?;
    let spread = divergence(&aligned, &pair.left, &pair.right)?;

    let mut out = Vec::with_capacity(aligned.len());
    for (i, &date) in aligned.calendar.iter().enumerate() {
        let mut columns = BTreeMap::new();
        for (name, values) in &aligned.columns {
            columns.insert(name.to_lowercase(), values[i]);
        }
        columns.insert("divergence".to_string(), spread[i]);
        out.push(SeriesRecord { date, columns });
    }
    Ok(out)
}

/// Market overlay over the sentiment calendar. Leading days before the
/// first close are absent from the result (no neutral price exists).
pub fn market_records(
    prices: &BTreeMap<NaiveDate, f64>,
    calendar: &[NaiveDate],
) -> Result<Vec<MarketRecord>, EngineError> {
    let overlay = merge_onto_calendar(prices, calendar)?;
    Ok(overlay
        .dates
        .iter()
        .zip(overlay.price.iter().zip(&overlay.normalized))
        .map(|(&date, (&price, &normalized))| MarketRecord {
            date,
            price,
            normalized,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Topic;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sentence(score: f64, weight: f64) -> SentenceScore {
        SentenceScore {
            text: "Rates will stay restrictive.".into(),
            topic: Topic::Guidance,
            score,
            weight,
            reasoning: String::new(),
        }
    }

    fn pair() -> DivergencePair {
        DivergencePair {
            left: "Fed".into(),
            right: "BoC".into(),
        }
    }

    #[test]
    fn end_to_end_spec_example() {
        let rows = vec![
            ("Fed".to_string(), d(1), vec![sentence(0.4, 1.0)]),
            ("Fed".to_string(), d(4), vec![sentence(0.6, 1.0)]),
            ("BoC".to_string(), d(2), vec![sentence(-0.2, 1.0)]),
        ];
        let docs = collect_documents(&rows);
        let records = divergence_records(&docs, &pair()).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].date, d(1));
        assert_eq!(records[3].date, d(4));

        let last = &records[3].columns;
        assert!((last["fed"] - 0.6).abs() < 1e-12);
        assert!((last["boc"] + 0.2).abs() < 1e-12);
        assert!((last["divergence"] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn records_serialize_flat_for_the_chart() {
        let rows = vec![
            ("Fed".to_string(), d(1), vec![sentence(0.4, 1.0)]),
            ("BoC".to_string(), d(1), vec![sentence(-0.2, 1.0)]),
        ];
        let records = divergence_records(&collect_documents(&rows), &pair()).unwrap();
        let v = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(v["date"], serde_json::json!("2024-01-01"));
        assert!(v["fed"].is_number() && v["boc"].is_number() && v["divergence"].is_number());
    }

    #[test]
    fn bad_document_is_isolated_from_the_batch() {
        let rows = vec![
            ("Fed".to_string(), d(1), vec![sentence(0.4, 1.0)]),
            ("Fed".to_string(), d(2), vec![sentence(7.0, 1.0)]), // corrupt
            ("BoC".to_string(), d(1), vec![sentence(-0.2, 1.0)]),
        ];
        let docs = collect_documents(&rows);
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn no_signal_documents_do_not_become_zero_points() {
        let rows = vec![
            ("Fed".to_string(), d(1), vec![sentence(0.4, 1.0)]),
            ("Fed".to_string(), d(2), vec![sentence(0.9, 0.0)]), // all boilerplate
        ];
        let docs = collect_documents(&rows);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].date, d(1));
    }

    #[test]
    fn empty_store_propagates_empty_input() {
        let err = divergence_records(&[], &pair()).unwrap_err();
        assert_eq!(err, EngineError::EmptyInput);
    }

    #[test]
    fn misconfigured_pair_surfaces_column_not_found() {
        let rows = vec![("Fed".to_string(), d(1), vec![sentence(0.4, 1.0)])];
        let err = divergence_records(&collect_documents(&rows), &pair()).unwrap_err();
        assert_eq!(err, EngineError::column_not_found("BoC"));
    }

    #[test]
    fn market_records_zip_dates_prices_and_normals() {
        let prices: BTreeMap<NaiveDate, f64> =
            [(d(1), 1.30), (d(2), 1.32), (d(4), 1.28)].into_iter().collect();
        let cal = vec![d(1), d(2), d(3), d(4)];
        let recs = market_records(&prices, &cal).unwrap();
        assert_eq!(recs.len(), 4);
        assert!((recs[2].price - 1.32).abs() < 1e-12);
        assert!((recs[0].normalized - 0.5).abs() < 1e-9);
    }
}
