//! Cross-institution divergence: `left − right`, position-wise over the
//! shared calendar of an already-aligned set.

use crate::analysis::calendar::AlignedSeries;
use crate::error::EngineError;

/// Difference series between two named columns of `aligned`.
///
/// Fails with `ColumnNotFound` naming the missing column. There is no
/// silent substitution and no fuzzy name matching here; which institutions
/// to compare is caller configuration, not an engine constant.
pub fn divergence(
    aligned: &AlignedSeries,
    left: &str,
    right: &str,
) -> Result<Vec<f64>, EngineError> {
    let a = aligned.column(left)?;
    let b = aligned.column(right)?;
    Ok(a.iter().zip(b).map(|(x, y)| x - y).collect())
}
