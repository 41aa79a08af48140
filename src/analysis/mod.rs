// src/analysis/mod.rs
//
// The aggregation & calendar-reconciliation engine. Every function here is
// a pure transformation over in-memory values: no clock reads, no caches,
// no I/O. Identical inputs always reproduce identical outputs.

pub mod aggregate;
pub mod calendar;
pub mod divergence;
pub mod market;
pub mod series;

pub use aggregate::document_sentiment;
pub use calendar::{align, AlignedSeries};
pub use divergence::divergence;
pub use market::{merge_onto_calendar, MarketOverlay};
pub use series::{build_sparse_series, SparseSeries};
