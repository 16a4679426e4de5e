//! # opfx-algo: OPF Solver Dispatch and Result Assembly
//!
//! Runs an optimal power flow on a prepared [`opf::OpfModel`] and turns what
//! the solver returns into structured results.
//!
//! ## Algorithm codes
//!
//! | Code | Problem | Backend |
//! |------|---------|---------|
//! | `0` (DC) / `200` | DC | [`opf::BackendKind::Dc`] |
//! | `0` (AC) / `560` / `565` | AC | [`opf::BackendKind::InteriorPoint`] |
//! | `580` | AC | [`opf::BackendKind::ExternalNlp`], needs IPOPT |
//!
//! Legacy AC codes `100`-`260` are remapped to their `3x0` successors, none
//! of which has a backend here.
//!
//! ## Architecture
//!
//! - **[`opf::OpfBackend`]**: a numerical solver
//! - **[`opf::DerivativeEvaluator`]**: admittance, constraint and cost evaluation
//! - **[`opf::SolverRegistry`]**: the registered backends
//! - **[`opf::OpfDispatcher`]**: picks and runs one backend
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use opfx_algo::opf::{OpfExecutor, OpfOptions, SolverRegistry};
//!
//! let registry = SolverRegistry::new().with_backend(Arc::new(MyMips::default()));
//! let executor = OpfExecutor::new(Arc::new(registry), Arc::new(MyEvaluator));
//!
//! let mut options = OpfOptions::load_from(Path::new("opf.toml"))?;
//! let output = executor.execute(&model, &mut options)?;
//! if !output.success {
//!     eprintln!("{}", output.diagnostics.summary());
//! }
//! ```

mod error;
pub mod opf;

pub use error::OpfError;
pub use opf::{execute, OpfExecutor, OpfModel, OpfOptions, OpfOutput};
