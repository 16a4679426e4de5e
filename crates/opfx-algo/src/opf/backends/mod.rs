//! Backend wrappers.
//!
//! The numerical solvers themselves live outside this crate. What lives here
//! is the plumbing that decides whether a native solver can be used at all.

mod native;

pub use native::{BinaryProbe, NativeBackend, IPOPT_REQUIREMENT};
