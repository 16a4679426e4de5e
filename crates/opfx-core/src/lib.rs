//! # opfx-core: Shared Data Model for OPF Execution
//!
//! Holds the pieces every layer of an OPF run agrees on:
//!
//! - [`CaseData`] / [`Table`] - MATPOWER-style bus, gen and branch tables,
//!   with column indices in [`idx`]
//! - [`BlockIndex`] - the registry mapping block names to `[first, last)`
//!   ranges in the variable, linear, nonlinear and cost spaces
//! - [`units`] - angle and angle-shadow-price newtypes
//! - [`OpfxError`] - the shared error type
//! - [`Diagnostics`] - the sink for non-fatal configuration issues

pub mod case;
pub mod diagnostics;
pub mod error;
pub mod idx;
pub mod index;
pub mod units;

pub use case::{CaseData, Table, TableKind};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{OpfxError, OpfxResult};
pub use index::{BlockIndex, BlockRange, BlockSpace, SpaceIndex};
