//! Typed errors for the aggregation engine.
//!
//! Per-document failures (`Validation`) are isolated by callers and never
//! abort a batch; the structural variants abort only the single computation
//! that was requested and must reach the caller as-is: a fallback value on
//! a structural failure would be indistinguishable from a real measurement.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A sentence score carried an out-of-range or non-finite field.
    /// The owning document is dropped whole; the batch continues.
    #[error("invalid sentence score: {reason}")]
    Validation { reason: String },

    /// Nothing to align: the input set was empty, or every series was.
    #[error("no observations to align")]
    EmptyInput,

    /// A named series is absent from the aligned set. No fuzzy fallback;
    /// callers resolve casing/aliases before asking.
    #[error("column not found: {name}")]
    ColumnNotFound { name: String },

    /// min == max over the realized calendar; normalization is undefined.
    #[error("degenerate price range: min == max == {value}")]
    DegenerateRange { value: f64 },
}

impl EngineError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }
}
