//! OPF run options.
//!
//! Options can be built in code with the `with_*` setters or read from a
//! TOML file where unspecified keys keep their defaults:
//!
//! ```toml
//! dc = false
//! alg = 560
//! verbose = 1
//! return_raw_der = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::OpfError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpfOptions {
    /// Solve the DC (linearized) problem instead of the AC one
    pub dc: bool,

    /// Requested AC algorithm code; 0 picks the default
    pub alg: u32,

    /// Requested DC algorithm code; 0 picks the default
    pub alg_dc: u32,

    /// 0 = silent, >0 logs a banner and progress at info level
    pub verbose: u8,

    /// Return constraint values, Jacobian, cost gradient and Hessian
    pub return_raw_der: bool,

    /// Algorithm code actually dispatched for an AC run.
    ///
    /// Written by the dispatcher before the backend runs.
    pub alg_poly: Option<u32>,
}

impl Default for OpfOptions {
    fn default() -> Self {
        Self {
            dc: false,
            alg: 0,
            alg_dc: 0,
            verbose: 0,
            return_raw_der: false,
            alg_poly: None,
        }
    }
}

impl OpfOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dc(mut self, dc: bool) -> Self {
        self.dc = dc;
        self
    }

    pub fn with_alg(mut self, alg: u32) -> Self {
        self.alg = alg;
        self
    }

    pub fn with_alg_dc(mut self, alg: u32) -> Self {
        self.alg_dc = alg;
        self
    }

    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_return_raw_der(mut self, enabled: bool) -> Self {
        self.return_raw_der = enabled;
        self
    }

    /// Parse options from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, OpfError> {
        toml::from_str(contents).map_err(|e| OpfError::Config(e.to_string()))
    }

    /// Load options from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, OpfError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| OpfError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, OpfError> {
        toml::to_string_pretty(self).map_err(|e| OpfError::Config(e.to_string()))
    }
}
