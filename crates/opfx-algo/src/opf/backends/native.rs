//! Native solver backends gated on a runtime binary probe.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::opf::algorithm::BackendKind;
use crate::opf::model::OpfModel;
use crate::opf::options::OpfOptions;
use crate::opf::traits::OpfBackend;
use crate::opf::types::BackendOutput;
use crate::OpfError;

/// Requirement text reported when the IPOPT solver binary is missing.
pub const IPOPT_REQUIREMENT: &str = "IPOPT (see https://github.com/coin-or/Ipopt)";

/// Looks for a solver binary on this machine.
///
/// Search order:
/// 1. `~/.opfx/solvers/<binary>`
/// 2. System PATH
///
/// The first lookup is remembered for the life of the probe.
#[derive(Debug, Clone)]
pub struct BinaryProbe {
    binary: String,
    found: OnceLock<Option<PathBuf>>,
}

impl BinaryProbe {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            found: OnceLock::new(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn find(&self) -> Option<PathBuf> {
        self.found.get_or_init(|| self.search()).clone()
    }

    #[cfg(feature = "native-dispatch")]
    fn search(&self) -> Option<PathBuf> {
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".opfx").join("solvers").join(&self.binary);
            if path.exists() {
                return Some(path);
            }
        }

        which::which(&self.binary).ok()
    }

    /// Native dispatch disabled: nothing is ever found.
    #[cfg(not(feature = "native-dispatch"))]
    fn search(&self) -> Option<PathBuf> {
        None
    }

    pub fn is_available(&self) -> bool {
        self.find().is_some()
    }
}

/// Wraps a backend whose solver needs a native binary at runtime.
///
/// The wrapped backend is only called once the probe finds its binary.
pub struct NativeBackend {
    inner: Arc<dyn OpfBackend>,
    probe: BinaryProbe,
    requirement: String,
}

impl NativeBackend {
    pub fn new(
        inner: Arc<dyn OpfBackend>,
        probe: BinaryProbe,
        requirement: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            probe,
            requirement: requirement.into(),
        }
    }

    /// IPOPT-backed external NLP solver found as `opfx-ipopt`.
    pub fn ipopt(inner: Arc<dyn OpfBackend>) -> Self {
        Self::new(inner, BinaryProbe::new("opfx-ipopt"), IPOPT_REQUIREMENT)
    }
}

impl OpfBackend for NativeBackend {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn kind(&self) -> BackendKind {
        self.inner.kind()
    }

    fn requirement(&self) -> Option<&str> {
        Some(&self.requirement)
    }

    fn is_available(&self) -> bool {
        self.probe.is_available() && self.inner.is_available()
    }

    fn solve(&self, model: &OpfModel, options: &OpfOptions) -> Result<BackendOutput, OpfError> {
        if !self.is_available() {
            return Err(OpfError::BackendUnavailable {
                backend: self.id().to_string(),
                requirement: self.requirement.clone(),
            });
        }
        tracing::debug!(
            backend = self.id(),
            binary = self.probe.binary(),
            "native solver found"
        );
        self.inner.solve(model, options)
    }
}
