//! Column indices for MATPOWER-format case tables (0-based).
//!
//! Only the columns OPF result assembly reads or writes are named here.

/// Bus table columns
pub mod bus {
    /// Voltage magnitude (p.u.)
    pub const VM: usize = 7;
}

/// Generator table columns
pub mod gen {
    /// Internal bus index the generator is connected to
    pub const GEN_BUS: usize = 0;
    /// Voltage magnitude setpoint (p.u.)
    pub const VG: usize = 5;
    pub const MU_PMAX: usize = 21;
    pub const MU_PMIN: usize = 22;
    pub const MU_QMAX: usize = 23;
    pub const MU_QMIN: usize = 24;
}

/// Branch table columns
pub mod branch {
    /// Multiplier on the lower angle-difference limit (per degree)
    pub const MU_ANGMIN: usize = 19;
    /// Multiplier on the upper angle-difference limit (per degree)
    pub const MU_ANGMAX: usize = 20;
}
