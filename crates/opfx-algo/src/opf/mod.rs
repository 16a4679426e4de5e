//! OPF execution: dispatch to a solver backend and assemble its results.
//!
//! - **[`OpfDispatcher`]**: resolves the algorithm code and calls one backend
//! - **[`SolverRegistry`]**: holds the registered [`OpfBackend`]s
//! - **[`PostSolveCorrector`]**: generator voltages, capability-curve and
//!   angle multipliers, raw derivatives
//! - **[`expand`]**: per-block named views of the flat solution vectors
//! - **[`pwl`]**: placeholder variables for converted single-segment PWL costs
//!
//! [`execute`] runs all of them in order.

pub mod algorithm;
pub mod backends;
pub mod corrector;
pub mod cost;
pub mod dispatcher;
pub mod execute;
pub mod expand;
pub mod model;
pub mod options;
pub mod pwl;
pub mod registry;
pub mod traits;
pub mod types;

pub use algorithm::{Algorithm, BackendKind};
pub use backends::{BinaryProbe, NativeBackend, IPOPT_REQUIREMENT};
pub use corrector::{copy_voltages, update_mupq, PostSolveCorrector};
pub use cost::{CostParams, CostShape, UserCost};
pub use dispatcher::{DispatchOutcome, OpfDispatcher};
pub use execute::{execute, OpfExecutor};
pub use expand::{expand, BlockResults};
pub use model::{CapabilityCurveData, CurveSlope, OpfModel, OpfModelBuilder, UserData};
pub use options::OpfOptions;
pub use registry::SolverRegistry;
pub use traits::{Admittance, ConstraintEval, CostEval, DerivativeEvaluator, OpfBackend};
pub use types::{
    BackendOutput, BoundDuals, ConstraintJacobian, ConstraintResults, DerivativeBundle,
    Multipliers, NamedBounds, OpfOutput, OpfResults, RawOutput, SolverDiagnostics, SolverOutput,
    VarResults,
};
