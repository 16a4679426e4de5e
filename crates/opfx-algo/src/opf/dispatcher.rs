//! OpfDispatcher routes an OPF model to exactly one backend.
//!
//! The dispatcher:
//! 1. Resolves the requested algorithm code (defaults, legacy remapping)
//! 2. Records the resolved AC code in the options
//! 3. Looks up the backend for the algorithm's kind
//! 4. Checks the backend's runtime dependency and runs it
//!
//! Unknown codes and missing backends are configuration problems: they are
//! recorded as diagnostics and the outcome carries no results, but dispatch
//! itself does not fail.

use std::sync::Arc;

use opfx_core::Diagnostics;

use super::algorithm::Algorithm;
use super::model::OpfModel;
use super::options::OpfOptions;
use super::registry::SolverRegistry;
use super::types::{OpfResults, SolverDiagnostics};
use crate::OpfError;

/// Everything dispatch produced, before post-processing.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub algorithm: Algorithm,
    /// `None` when no backend ran
    pub results: Option<OpfResults>,
    pub success: bool,
    /// Always carries the algorithm stamp
    pub raw: SolverDiagnostics,
    pub diagnostics: Diagnostics,
}

pub struct OpfDispatcher {
    registry: Arc<SolverRegistry>,
}

impl OpfDispatcher {
    pub fn new(registry: Arc<SolverRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve the algorithm and run the matching backend.
    ///
    /// Backend errors propagate; configuration problems end up in
    /// [`DispatchOutcome::diagnostics`].
    pub fn dispatch(
        &self,
        model: &OpfModel,
        options: &mut OpfOptions,
    ) -> Result<DispatchOutcome, OpfError> {
        let algorithm = Algorithm::resolve(options);
        let mut diagnostics = Diagnostics::new();

        if options.verbose > 0 {
            let kind = if options.dc { "DC" } else { "AC" };
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                "opfx -- {} Optimal Power Flow",
                kind
            );
        }

        if !options.dc {
            options.alg_poly = Some(algorithm.code());
        }

        let solved = match algorithm.backend_kind() {
            None => {
                report(
                    &mut diagnostics,
                    algorithm,
                    format!("OPF_ALG {} is not a valid algorithm code", algorithm.code()),
                );
                None
            }
            Some(kind) => match self.registry.backend_for(kind) {
                None => {
                    report(
                        &mut diagnostics,
                        algorithm,
                        format!(
                            "OPF_ALG {} has no registered {} backend",
                            algorithm.code(),
                            kind
                        ),
                    );
                    None
                }
                Some(backend) if !backend.is_available() => {
                    let requirement = backend.requirement().unwrap_or(backend.id());
                    report(
                        &mut diagnostics,
                        algorithm,
                        format!("OPF_ALG {} requires {}", algorithm.code(), requirement),
                    );
                    None
                }
                Some(backend) => {
                    tracing::debug!(
                        backend = backend.id(),
                        code = algorithm.code(),
                        "dispatching OPF"
                    );
                    Some(backend.solve(model, options)?)
                }
            },
        };

        let (results, success, mut raw) = match solved {
            Some(out) => (Some(out.results), out.success, out.raw),
            None => (None, false, SolverDiagnostics::default()),
        };
        raw.stamp_algorithm(algorithm.code());

        Ok(DispatchOutcome {
            algorithm,
            results,
            success,
            raw,
            diagnostics,
        })
    }
}

fn report(diagnostics: &mut Diagnostics, algorithm: Algorithm, message: String) {
    tracing::error!("opf_execute: {}", message);
    diagnostics.add_error_with_entity(
        "config",
        &message,
        &format!("OPF_ALG {}", algorithm.code()),
    );
}
