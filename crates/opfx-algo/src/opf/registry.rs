//! Registry for OPF solver backends.
//!
//! The registry holds every registered backend and resolves a
//! [`BackendKind`] to the backend the dispatcher should call.

use std::collections::HashMap;
use std::sync::Arc;

use super::algorithm::BackendKind;
use super::traits::OpfBackend;

/// Holds all registered backends, keyed by ID.
#[derive(Default)]
pub struct SolverRegistry {
    backends: HashMap<String, Arc<dyn OpfBackend>>,
}

impl SolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend, replacing any backend with the same ID.
    pub fn register_backend(&mut self, b: Arc<dyn OpfBackend>) {
        self.backends.insert(b.id().to_string(), b);
    }

    /// Builder-style [`register_backend`](Self::register_backend).
    pub fn with_backend(mut self, b: Arc<dyn OpfBackend>) -> Self {
        self.register_backend(b);
        self
    }

    /// Pick the backend for a kind.
    ///
    /// Prefers an available backend; otherwise returns an unavailable one so
    /// the caller can report what is missing. Ties break on ID.
    pub fn backend_for(&self, kind: BackendKind) -> Option<Arc<dyn OpfBackend>> {
        let mut candidates: Vec<&Arc<dyn OpfBackend>> = self
            .backends
            .values()
            .filter(|b| b.kind() == kind)
            .collect();
        candidates.sort_by(|a, b| a.id().cmp(b.id()));

        candidates
            .iter()
            .find(|b| b.is_available())
            .or_else(|| candidates.first())
            .map(|b| Arc::clone(b))
    }
}
