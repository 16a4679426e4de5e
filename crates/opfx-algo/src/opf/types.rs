use indexmap::IndexMap;
use serde::Serialize;
use sprs::CsMat;

use opfx_core::{CaseData, Diagnostics, Table};

/// Lower- and upper-bound multipliers over one flat space.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundDuals {
    pub l: Vec<f64>,
    pub u: Vec<f64>,
}

impl BoundDuals {
    pub fn new(l: Vec<f64>, u: Vec<f64>) -> Self {
        Self { l, u }
    }

    pub fn zeros(n: usize) -> Self {
        Self::new(vec![0.0; n], vec![0.0; n])
    }
}

/// Flat multipliers for the three dual-bearing spaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Multipliers {
    pub var: BoundDuals,
    pub lin: BoundDuals,
    pub nln: BoundDuals,
}

/// Per-block lower/upper multipliers, in block declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NamedBounds {
    pub l: IndexMap<String, Vec<f64>>,
    pub u: IndexMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VarResults {
    pub val: IndexMap<String, Vec<f64>>,
    pub mu: NamedBounds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstraintResults {
    pub mu: NamedBounds,
}

/// Constraint values and Jacobian some backends leave on their results.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintJacobian {
    pub g: Vec<f64>,
    pub dg: CsMat<f64>,
}

/// Structured OPF results layered on the case tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpfResults {
    pub base_mva: f64,
    pub bus: Table,
    pub gen: Table,
    pub branch: Table,

    /// Solved variable vector
    pub x: Vec<f64>,
    pub mu: Multipliers,
    /// Objective value
    pub f: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub var: Option<VarResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lin: Option<ConstraintResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nln: Option<ConstraintResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<IndexMap<String, f64>>,

    /// Legacy derivative material; moved into the raw output and never returned
    #[serde(skip)]
    pub solver_jacobian: Option<ConstraintJacobian>,
}

impl OpfResults {
    /// Start from a copy of the case tables with empty solve vectors.
    pub fn from_case(case: &CaseData) -> Self {
        Self {
            base_mva: case.base_mva,
            bus: case.bus.clone(),
            gen: case.gen.clone(),
            branch: case.branch.clone(),
            x: Vec::new(),
            mu: Multipliers::default(),
            f: 0.0,
            var: None,
            lin: None,
            nln: None,
            cost: None,
            solver_jacobian: None,
        }
    }
}

/// What the solver reported about its own run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolverOutput {
    /// Algorithm code that produced this output
    pub algorithm: Option<u32>,
    pub iterations: Option<usize>,
    pub message: Option<String>,
}

/// Backend diagnostics, the non-derivative half of the raw output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolverDiagnostics {
    pub output: SolverOutput,
    /// Solution vector as the backend produced it
    pub xr: Vec<f64>,
    /// Constraint multipliers as the backend produced them
    pub pimul: Vec<f64>,
    /// Backend exit flag
    pub info: i32,
}

impl SolverDiagnostics {
    /// Record `code` as the producing algorithm unless the backend already did.
    pub fn stamp_algorithm(&mut self, code: u32) {
        if self.output.algorithm.is_none() {
            self.output.algorithm = Some(code);
        }
    }
}

/// Constraint and cost derivatives at the solved point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivativeBundle {
    /// Constraint values, equality rows first
    pub g: Vec<f64>,
    /// Constraint Jacobian: one row per constraint, one column per variable
    pub dg: CsMat<f64>,
    /// Cost gradient
    pub df: Vec<f64>,
    /// Cost Hessian
    pub d2f: CsMat<f64>,
}

impl DerivativeBundle {
    /// All four fields present but empty.
    pub fn empty() -> Self {
        Self {
            g: Vec::new(),
            dg: CsMat::zero((0, 0)),
            df: Vec::new(),
            d2f: CsMat::zero((0, 0)),
        }
    }
}

/// Raw output returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawOutput {
    #[serde(flatten)]
    pub solver: SolverDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivatives: Option<DerivativeBundle>,
}

/// What a backend hands back from one solve.
#[derive(Debug, Clone)]
pub struct BackendOutput {
    pub results: OpfResults,
    pub success: bool,
    pub raw: SolverDiagnostics,
}

/// Final outcome of an OPF execution.
#[derive(Debug, Clone, Serialize)]
pub struct OpfOutput {
    /// `None` when no backend ran
    pub results: Option<OpfResults>,
    pub success: bool,
    pub raw: RawOutput,
    pub diagnostics: Diagnostics,
}
