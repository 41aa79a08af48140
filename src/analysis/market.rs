//! # External price-series merge
//!
//! Aligns a foreign-sampled price series (arbitrary sampling, weekends and
//! holidays missing) onto the sentiment calendar, forward-filling interior
//! gaps with the same policy as the calendar aligner. Two deliberate
//! differences from sentiment columns:
//!
//! * there is no "neutral price", so dates before the first real
//!   observation are omitted from the result, never defaulted;
//! * the normalized companion `(p − min)/(max − min)` refuses a zero-width
//!   range (`DegenerateRange`) instead of dividing by zero: a silently
//!   flat output would be indistinguishable from legitimate "no movement".

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::EngineError;

/// Price series realized over (a suffix of) the target calendar, plus its
/// min/max-normalized companion. Never persisted; always recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOverlay {
    pub dates: Vec<NaiveDate>,
    pub price: Vec<f64>,
    pub normalized: Vec<f64>,
}

/// Merge `prices` onto `calendar`.
///
/// `EmptyInput` when the price map is empty or no calendar date falls on or
/// after the first observation; `DegenerateRange` when the realized series
/// has max == min (constant or single-point).
pub fn merge_onto_calendar(
    prices: &BTreeMap<NaiveDate, f64>,
    calendar: &[NaiveDate],
) -> Result<MarketOverlay, EngineError> {
    let first_observed = match prices.keys().next() {
        Some(&d) => d,
        None => return Err(EngineError::EmptyInput),
    };

    let mut dates = Vec::new();
    let mut price = Vec::new();
    let mut carried: Option<f64> = None;
    for &day in calendar {
        if let Some(&p) = prices.get(&day) {
            carried = Some(p);
        }
        if day < first_observed {
            continue; // leading gap: omitted, not filled
        }
        match carried {
            Some(p) => {
                dates.push(day);
                price.push(p);
            }
            // Calendar day on/after the first observation but nothing
            // carried yet: only possible when the first observation lies
            // outside the calendar entirely, before it starts.
            None => {
                if let Some((_, &p)) = prices.range(..=day).next_back() {
                    carried = Some(p);
                    dates.push(day);
                    price.push(p);
                }
            }
        }
    }

    if price.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let min = price.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = price.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return Err(EngineError::DegenerateRange { value: min });
    }

    let normalized = price.iter().map(|p| (p - min) / (max - min)).collect();

    Ok(MarketOverlay {
        dates,
        price,
        normalized,
    })
}
