use opfx_core::OpfxError;
use thiserror::Error;

/// Errors raised while executing an OPF.
///
/// Configuration problems (an unknown algorithm code, a backend whose
/// dependency is missing) are not errors: they are reported through
/// [`Diagnostics`](opfx_core::Diagnostics) and a `success == false` outcome.
/// These variants cover broken contracts between the model, the backend and
/// the evaluators.
#[derive(Debug, Error)]
pub enum OpfError {
    /// Model data does not line up with the vectors or tables it describes
    #[error(transparent)]
    Model(#[from] OpfxError),

    /// Input data validation error
    #[error("OPF data validation: {0}")]
    DataValidation(String),

    /// A backend was asked to solve while unavailable
    #[error("OPF backend '{backend}' is unavailable: requires {requirement}")]
    BackendUnavailable { backend: String, requirement: String },

    /// Constraint, cost or admittance evaluation failed
    #[error("OPF evaluation failed: {0}")]
    Evaluation(String),

    /// Options could not be read
    #[error("OPF configuration error: {0}")]
    Config(String),
}
