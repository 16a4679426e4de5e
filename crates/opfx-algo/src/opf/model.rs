//! The OPF model handed to backends and to result assembly.
//!
//! An [`OpfModel`] can only be obtained from [`OpfModelBuilder::build`],
//! which is where blocks are laid out and user cost parameters are
//! materialized. Holding an `OpfModel` therefore means the cost registry is
//! valid.

use indexmap::IndexMap;
use serde::Serialize;

use opfx_core::{BlockIndex, BlockSpace, CaseData};

use super::cost::{CostParams, UserCost};
use crate::OpfError;

/// P and Q coefficients of one sloped capability-curve constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveSlope {
    pub p: f64,
    pub q: f64,
}

/// Sloped PQ capability constraints and the generators they apply to.
///
/// Row `k` of `h` belongs to generator `ipqh[k]` (upper curve), row `k` of `l`
/// to generator `ipql[k]` (lower curve).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapabilityCurveData {
    pub ipqh: Vec<usize>,
    pub ipql: Vec<usize>,
    pub h: Vec<CurveSlope>,
    pub l: Vec<CurveSlope>,
}

/// Side-channel data the model builder attaches for post-processing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserData {
    /// Capability curve data, present when `PQh`/`PQl` blocks exist
    pub apq: Option<CapabilityCurveData>,
    /// Branch rows covered by the `ang` constraint block, in block order
    pub iang: Vec<usize>,
    /// Generators whose single-segment PWL cost was converted to polynomial
    pub pwl1: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpfModel {
    case: CaseData,
    index: BlockIndex,
    userdata: UserData,
    costs: IndexMap<String, UserCost>,
    cost_params: CostParams,
}

impl OpfModel {
    pub fn builder(case: CaseData) -> OpfModelBuilder {
        OpfModelBuilder::new(case)
    }

    /// The unmodified case the model was built from
    pub fn case(&self) -> &CaseData {
        &self.case
    }

    pub fn index(&self) -> &BlockIndex {
        &self.index
    }

    pub fn userdata(&self) -> &UserData {
        &self.userdata
    }

    /// Stacked parameters of every user cost block
    pub fn cost_params(&self) -> &CostParams {
        &self.cost_params
    }

    /// Evaluate the named user cost block at `x`.
    pub fn compute_cost(&self, x: &[f64], name: &str) -> Result<f64, OpfError> {
        let cost = self.costs.get(name).ok_or_else(|| {
            OpfError::Model(opfx_core::OpfxError::UnknownBlock {
                space: BlockSpace::CostTerms,
                name: name.to_string(),
            })
        })?;
        cost.evaluate(x)
    }
}

/// Lays out the blocks of an [`OpfModel`].
///
/// Declarations are recorded in order and laid out by [`build`](Self::build),
/// which also reports duplicates and malformed cost parameters.
pub struct OpfModelBuilder {
    case: CaseData,
    blocks: Vec<(BlockSpace, String, usize)>,
    costs: Vec<(String, UserCost)>,
    userdata: UserData,
}

impl OpfModelBuilder {
    pub fn new(case: CaseData) -> Self {
        Self {
            case,
            blocks: Vec::new(),
            costs: Vec::new(),
            userdata: UserData::default(),
        }
    }

    pub fn add_vars(mut self, name: impl Into<String>, n: usize) -> Self {
        self.blocks.push((BlockSpace::Variables, name.into(), n));
        self
    }

    pub fn add_lin_constraints(mut self, name: impl Into<String>, n: usize) -> Self {
        self.blocks
            .push((BlockSpace::LinearConstraints, name.into(), n));
        self
    }

    pub fn add_nln_constraints(mut self, name: impl Into<String>, n: usize) -> Self {
        self.blocks
            .push((BlockSpace::NonlinearConstraints, name.into(), n));
        self
    }

    /// Add a user cost block; its width is the number of cost rows.
    pub fn add_costs(mut self, name: impl Into<String>, cost: UserCost) -> Self {
        self.costs.push((name.into(), cost));
        self
    }

    pub fn with_capability_curves(mut self, data: CapabilityCurveData) -> Self {
        self.userdata.apq = Some(data);
        self
    }

    pub fn with_angle_rows(mut self, iang: Vec<usize>) -> Self {
        self.userdata.iang = iang;
        self
    }

    pub fn with_pwl1(mut self, pwl1: Vec<usize>) -> Self {
        self.userdata.pwl1 = pwl1;
        self
    }

    /// Lay out all blocks and materialize the user cost parameters.
    pub fn build(self) -> Result<OpfModel, OpfError> {
        let mut index = BlockIndex::new();
        for (space, name, n) in self.blocks {
            index.space_mut(space).add(name, n)?;
        }

        let nx = index.var.total();
        let mut costs = IndexMap::with_capacity(self.costs.len());
        for (name, cost) in self.costs {
            cost.validate(&name, nx)?;
            index.cost.add(name.clone(), cost.rows())?;
            costs.insert(name, cost);
        }
        let cost_params = CostParams::stack(costs.values(), nx);

        Ok(OpfModel {
            case: self.case,
            index,
            userdata: self.userdata,
            costs,
            cost_params,
        })
    }
}
