//! Placeholder variables for single-segment piecewise-linear costs.
//!
//! When a generator's one-segment PWL cost is converted to a polynomial, the
//! model loses that generator's auxiliary cost variable. Callers still expect
//! the variable vector laid out with one auxiliary slot per PWL generator,
//! directly after the generator injection block, so zeros are inserted there.
//! The inserted values carry no meaning.

use super::algorithm::Algorithm;
use super::model::OpfModel;
use super::types::{OpfResults, SolverDiagnostics};
use crate::OpfError;

/// Insert `count` zeros into `values` before position `at`.
///
/// `at` past the end appends.
pub fn insert_placeholder(values: &mut Vec<f64>, at: usize, count: usize) {
    let at = at.min(values.len());
    values.splice(at..at, std::iter::repeat(0.0).take(count));
}

/// Index right after the last generator injection variable.
///
/// That is the end of `Pg` for DC runs and the end of `Qg` for AC runs.
pub fn split_point(model: &OpfModel, dc: bool) -> Result<usize, OpfError> {
    let name = if dc { "Pg" } else { "Qg" };
    Ok(model.index().var.require(name)?.last)
}

/// Whether the placeholder patch applies to this run.
pub fn needs_patch(model: &OpfModel, algorithm: Algorithm) -> bool {
    !model.userdata().pwl1.is_empty() && !algorithm.handles_pwl_natively()
}

/// Pad both the backend's raw solution and the results' `x`.
pub fn apply(
    model: &OpfModel,
    algorithm: Algorithm,
    dc: bool,
    raw: &mut SolverDiagnostics,
    results: &mut OpfResults,
) -> Result<(), OpfError> {
    if !needs_patch(model, algorithm) {
        return Ok(());
    }
    let at = split_point(model, dc)?;
    let count = model.userdata().pwl1.len();
    tracing::debug!(at, count, "inserting placeholder PWL cost variables");

    insert_placeholder(&mut raw.xr, at, count);
    insert_placeholder(&mut results.x, at, count);
    Ok(())
}
