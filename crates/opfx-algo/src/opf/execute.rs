//! One complete OPF run: dispatch, correct, expand, patch.

use std::sync::Arc;

use super::corrector::PostSolveCorrector;
use super::dispatcher::OpfDispatcher;
use super::expand::expand;
use super::model::OpfModel;
use super::options::OpfOptions;
use super::pwl;
use super::registry::SolverRegistry;
use super::traits::DerivativeEvaluator;
use super::types::{OpfOutput, RawOutput};
use crate::OpfError;

/// Run an OPF on `model` and assemble the caller-facing output.
///
/// `options.alg_poly` is updated with the dispatched AC algorithm code.
/// An unknown code or an unavailable backend still returns `Ok`, with
/// `results: None`, `success: false` and the problem in `diagnostics`.
pub fn execute(
    model: &OpfModel,
    options: &mut OpfOptions,
    dispatcher: &OpfDispatcher,
    evaluator: &dyn DerivativeEvaluator,
) -> Result<OpfOutput, OpfError> {
    let outcome = dispatcher.dispatch(model, options)?;
    let mut results = outcome.results;
    let mut solver = outcome.raw;

    let derivatives = PostSolveCorrector::new(model, options, evaluator)
        .correct(results.as_mut(), outcome.success)?;

    if let Some(results) = results.as_mut() {
        // named blocks index the backend's layout, before any padding
        expand(model, options.dc, results)?.apply(results);
        pwl::apply(model, outcome.algorithm, options.dc, &mut solver, results)?;
    }

    tracing::debug!(
        code = outcome.algorithm.code(),
        success = outcome.success,
        diagnostics = %outcome.diagnostics.summary(),
        "OPF execution finished"
    );

    Ok(OpfOutput {
        results,
        success: outcome.success,
        raw: RawOutput {
            solver,
            derivatives,
        },
        diagnostics: outcome.diagnostics,
    })
}

/// A dispatcher paired with the evaluator used for raw derivatives.
pub struct OpfExecutor {
    dispatcher: OpfDispatcher,
    evaluator: Arc<dyn DerivativeEvaluator>,
}

impl OpfExecutor {
    pub fn new(registry: Arc<SolverRegistry>, evaluator: Arc<dyn DerivativeEvaluator>) -> Self {
        Self {
            dispatcher: OpfDispatcher::new(registry),
            evaluator,
        }
    }

    pub fn execute(&self, model: &OpfModel, options: &mut OpfOptions) -> Result<OpfOutput, OpfError> {
        execute(model, options, &self.dispatcher, self.evaluator.as_ref())
    }
}
