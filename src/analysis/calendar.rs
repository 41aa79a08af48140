//! # Calendar alignment
//!
//! Merges N sparse series onto one shared, contiguous daily calendar. The
//! fill policy is fixed and deterministic:
//!
//! * exact observation wins;
//! * otherwise forward-fill from the most recent earlier observation, the
//!   standing assumption that a policy stance persists between statements;
//! * a leading gap (before the source's first data point) fills with `0.0`,
//!   an assumed-neutral prior. This is a series-level modeling choice and
//!   distinct from the aggregator's "no signal" exclusion.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::analysis::series::SparseSeries;
use crate::error::EngineError;

/// Value assumed for a source before its first real observation.
pub const NEUTRAL_PRIOR: f64 = 0.0;

/// Dense, aligned daily series. The calendar is strictly increasing by one
/// day with no gaps; every column holds a value for every calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    pub calendar: Vec<NaiveDate>,
    pub columns: BTreeMap<String, Vec<f64>>,
}

impl AlignedSeries {
    /// Look up a named column. No fuzzy matching: ambiguous or
    /// alternate-casing names are the caller's problem to resolve.
    pub fn column(&self, name: &str) -> Result<&[f64], EngineError> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::column_not_found(name))
    }

    pub fn len(&self) -> usize {
        self.calendar.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendar.is_empty()
    }
}

/// Align a set of sparse series onto the shared daily calendar spanning
/// [min observed date, max observed date] inclusive.
///
/// Pure function of its inputs; fails with `EmptyInput` when the set is
/// empty or every series is.
pub fn align(series: &[SparseSeries]) -> Result<AlignedSeries, EngineError> {
    let min = series.iter().filter_map(SparseSeries::first_date).min();
    let max = series.iter().filter_map(SparseSeries::last_date).max();
    let (min, max) = match (min, max) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(EngineError::EmptyInput),
    };

    let calendar = daily_calendar(min, max);

    let mut columns = BTreeMap::new();
    for s in series {
        if s.points.is_empty() {
            continue;
        }
        columns.insert(s.source.clone(), fill_column(&s.points, &calendar));
    }

    Ok(AlignedSeries { calendar, columns })
}

/// Every date in [start, end] inclusive, ascending, step one day.
pub fn daily_calendar(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = start;
    while d <= end {
        out.push(d);
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }
    out
}

fn fill_column(points: &BTreeMap<NaiveDate, f64>, calendar: &[NaiveDate]) -> Vec<f64> {
    let mut out = Vec::with_capacity(calendar.len());
    let mut carried: Option<f64> = None;
    for date in calendar {
        if let Some(&v) = points.get(date) {
            carried = Some(v);
        }
        out.push(carried.unwrap_or(NEUTRAL_PRIOR));
    }
    out
}
