//! Expansion of flat solution vectors into per-block named results.

use indexmap::IndexMap;

use opfx_core::SpaceIndex;

use super::model::OpfModel;
use super::types::{BoundDuals, ConstraintResults, NamedBounds, OpfResults, VarResults};
use crate::OpfError;

/// Named results for every index space that declares blocks.
///
/// A space with no declared blocks has no entry at all; a declared block of
/// zero width is left out of its space's maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockResults {
    pub var: Option<VarResults>,
    pub lin: Option<ConstraintResults>,
    pub nln: Option<ConstraintResults>,
    pub cost: Option<IndexMap<String, f64>>,
}

impl BlockResults {
    /// Attach to `results`, replacing whatever a backend put there.
    pub fn apply(self, results: &mut OpfResults) {
        results.var = self.var;
        results.lin = self.lin;
        results.nln = self.nln;
        results.cost = self.cost;
    }
}

/// Slice `x` and the multipliers along the model's block layout.
///
/// Nonlinear constraints only exist for AC runs and are skipped when `dc`.
pub fn expand(model: &OpfModel, dc: bool, results: &OpfResults) -> Result<BlockResults, OpfError> {
    let index = model.index();

    let var = if index.var.is_empty() {
        None
    } else {
        let mut val = IndexMap::new();
        for (name, range) in index.var.iter().filter(|(_, r)| !r.is_empty()) {
            val.insert(name.to_string(), range.slice(&results.x, "x")?.to_vec());
        }
        Some(VarResults {
            val,
            mu: named_bounds(&index.var, &results.mu.var, "mu.var")?,
        })
    };

    let lin = constraint_results(&index.lin, &results.mu.lin, "mu.lin")?;
    let nln = if dc {
        None
    } else {
        constraint_results(&index.nln, &results.mu.nln, "mu.nln")?
    };

    let cost = if index.cost.is_empty() {
        None
    } else {
        let mut cost = IndexMap::new();
        for (name, _) in index.cost.iter().filter(|(_, r)| !r.is_empty()) {
            cost.insert(name.to_string(), model.compute_cost(&results.x, name)?);
        }
        Some(cost)
    };

    Ok(BlockResults {
        var,
        lin,
        nln,
        cost,
    })
}

fn constraint_results(
    space: &SpaceIndex,
    duals: &BoundDuals,
    what: &str,
) -> Result<Option<ConstraintResults>, OpfError> {
    if space.is_empty() {
        return Ok(None);
    }
    Ok(Some(ConstraintResults {
        mu: named_bounds(space, duals, what)?,
    }))
}

fn named_bounds(space: &SpaceIndex, duals: &BoundDuals, what: &str) -> Result<NamedBounds, OpfError> {
    let mut bounds = NamedBounds::default();
    for (name, range) in space.iter().filter(|(_, r)| !r.is_empty()) {
        bounds
            .l
            .insert(name.to_string(), range.slice(&duals.l, &format!("{what}.l"))?.to_vec());
        bounds
            .u
            .insert(name.to_string(), range.slice(&duals.u, &format!("{what}.u"))?.to_vec());
    }
    Ok(bounds)
}
