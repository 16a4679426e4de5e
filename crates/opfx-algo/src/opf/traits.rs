//! Seams to the collaborators this crate drives but does not implement.
//!
//! - [`OpfBackend`]: a numerical solver (DC, interior point, external NLP)
//! - [`DerivativeEvaluator`]: admittance builder plus constraint and cost
//!   evaluators, used to re-derive derivatives at the solved point

use num_complex::Complex64;
use sprs::CsMat;

use opfx_core::CaseData;

use super::algorithm::BackendKind;
use super::model::OpfModel;
use super::options::OpfOptions;
use super::types::BackendOutput;
use crate::OpfError;

/// A solver the dispatcher can route to.
///
/// A failed solve is a `BackendOutput` with `success == false`; `Err` is for
/// contract violations the backend cannot express as a result.
pub trait OpfBackend: Send + Sync {
    /// Unique identifier (e.g., "mips", "ipopt")
    fn id(&self) -> &str;

    /// Backend family this solver serves
    fn kind(&self) -> BackendKind;

    /// Runtime dependency, named in diagnostics when unavailable
    fn requirement(&self) -> Option<&str> {
        None
    }

    /// Check if this backend is available at runtime
    fn is_available(&self) -> bool {
        true
    }

    fn solve(&self, model: &OpfModel, options: &OpfOptions) -> Result<BackendOutput, OpfError>;
}

/// Bus and branch admittance matrices.
#[derive(Debug, Clone)]
pub struct Admittance {
    pub ybus: CsMat<Complex64>,
    pub yf: CsMat<Complex64>,
    pub yt: CsMat<Complex64>,
}

/// Constraint values and gradients at a point.
///
/// Gradient matrices are `nx x n`: column `j` is the gradient of constraint `j`.
#[derive(Debug, Clone)]
pub struct ConstraintEval {
    pub ineq: Vec<f64>,
    pub eq: Vec<f64>,
    pub d_ineq: CsMat<f64>,
    pub d_eq: CsMat<f64>,
}

/// Cost value, gradient and Hessian at a point.
#[derive(Debug, Clone)]
pub struct CostEval {
    pub f: f64,
    pub df: Vec<f64>,
    pub d2f: CsMat<f64>,
}

pub trait DerivativeEvaluator: Send + Sync {
    /// Build the admittance matrices of a case
    fn admittance(&self, case: &CaseData) -> Result<Admittance, OpfError>;

    /// Evaluate nonlinear constraints and their gradients at `x`
    fn constraints(
        &self,
        x: &[f64],
        model: &OpfModel,
        admittance: &Admittance,
        options: &OpfOptions,
    ) -> Result<ConstraintEval, OpfError>;

    /// Evaluate the full cost with gradient and Hessian at `x`
    fn cost(&self, x: &[f64], model: &OpfModel) -> Result<CostEval, OpfError>;
}
