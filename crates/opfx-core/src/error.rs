//! Unified error types for the opfx crates
//!
//! [`OpfxError`] covers the failures that can come out of the shared data
//! model: table cells that do not exist and block registries that do not line
//! up with the vectors they describe. Higher layers wrap it in
//! their own error enums with `#[from]`.
//!
//! # Example
//!
//! ```ignore
//! use opfx_core::{OpfxError, OpfxResult};
//!
//! fn vm_at(case: &CaseData, bus: usize) -> OpfxResult<f64> {
//!     case.bus.get(bus, idx::bus::VM)
//! }
//! ```

use thiserror::Error;

use crate::index::BlockSpace;

/// Unified error type for the shared OPF data model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpfxError {
    /// A flat vector is shorter than the block layout requires
    #[error("Dimension error: {what} has length {actual}, expected at least {expected}")]
    Dimension {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// A block name that the registry does not know
    #[error("Unknown block '{name}' in {space} space")]
    UnknownBlock { space: BlockSpace, name: String },

    /// The same block name declared twice in one space
    #[error("Duplicate block '{name}' in {space} space")]
    DuplicateBlock { space: BlockSpace, name: String },

    /// Table cell read outside the stored rows/columns
    #[error("{table} table has no cell ({row}, {col})")]
    CellOutOfRange {
        table: &'static str,
        row: usize,
        col: usize,
    },
}

/// Convenience type alias for Results using OpfxError.
pub type OpfxResult<T> = Result<T, OpfxError>;
