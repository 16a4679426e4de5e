//! Algorithm code resolution.
//!
//! OPF runs are configured with MATPOWER-style numeric algorithm codes. This
//! module turns a requested code into a closed [`Algorithm`] choice:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Unset: default for the problem type |
//! | 200 | DC default (interior point) |
//! | 560, 565 | Interior point (MIPS, step-controlled MIPS) |
//! | 580 | IPOPT (external NLP, needs the native solver) |
//! | 545, 550 | SC-PDIPM / TRALM; handle PWL costs natively |
//!
//! Codes 100–260 are deprecated and are remapped to their generalized
//! formulation equivalents (300–360) before routing.

use serde::Serialize;
use std::fmt;

use super::options::OpfOptions;

pub mod codes {
    pub const UNSET: u32 = 0;
    pub const DC_DEFAULT: u32 = 200;
    pub const MIPS: u32 = 560;
    pub const MIPS_SC: u32 = 565;
    pub const IPOPT: u32 = 580;
    pub const SC_PDIPM: u32 = 545;
    pub const TRALM: u32 = 550;
    pub const AC_DEFAULT: u32 = MIPS;
}

/// Deprecated code pairs and the generalized code each pair maps to.
const LEGACY_CODES: [([u32; 2], u32); 4] = [
    ([100, 200], 300), // CONSTR
    ([120, 220], 320), // dense LP
    ([140, 240], 340), // sparse (relaxed) LP
    ([160, 260], 360), // sparse (full) LP
];

/// Map a deprecated AC code to its generalized equivalent.
///
/// Codes outside the table are returned unchanged.
pub fn remap_legacy(code: u32) -> u32 {
    LEGACY_CODES
        .iter()
        .find(|(old, _)| old[0] == code || old[1] == code)
        .map(|&(_, new)| new)
        .unwrap_or(code)
}

/// Which backend family a resolved algorithm runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BackendKind {
    /// Linear DC OPF solver
    Dc,
    /// Nonlinear interior-point solver
    InteriorPoint,
    /// External NLP solver with a runtime dependency
    ExternalNlp,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Dc => write!(f, "dc"),
            BackendKind::InteriorPoint => write!(f, "interior-point"),
            BackendKind::ExternalNlp => write!(f, "external-nlp"),
        }
    }
}

/// A resolved algorithm choice, carrying the numeric code it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Algorithm {
    Dc { code: u32 },
    InteriorPoint { code: u32 },
    ExternalNlp { code: u32 },
    /// Code that no AC backend understands
    Invalid { code: u32 },
}

impl Algorithm {
    /// Resolve the requested code for the problem type in `options`.
    pub fn resolve(options: &OpfOptions) -> Self {
        if options.dc {
            let code = match options.alg_dc {
                codes::UNSET => codes::DC_DEFAULT,
                code => code,
            };
            return Algorithm::Dc { code };
        }

        let requested = match options.alg {
            codes::UNSET => codes::AC_DEFAULT,
            code => code,
        };
        Self::from_ac_code(remap_legacy(requested))
    }

    fn from_ac_code(code: u32) -> Self {
        match code {
            codes::MIPS | codes::MIPS_SC => Algorithm::InteriorPoint { code },
            codes::IPOPT => Algorithm::ExternalNlp { code },
            _ => Algorithm::Invalid { code },
        }
    }

    pub fn code(&self) -> u32 {
        match *self {
            Algorithm::Dc { code }
            | Algorithm::InteriorPoint { code }
            | Algorithm::ExternalNlp { code }
            | Algorithm::Invalid { code } => code,
        }
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        match self {
            Algorithm::Dc { .. } => Some(BackendKind::Dc),
            Algorithm::InteriorPoint { .. } => Some(BackendKind::InteriorPoint),
            Algorithm::ExternalNlp { .. } => Some(BackendKind::ExternalNlp),
            Algorithm::Invalid { .. } => None,
        }
    }

    /// Backends for these codes keep the auxiliary PWL variables themselves.
    pub fn handles_pwl_natively(&self) -> bool {
        matches!(self.code(), codes::SC_PDIPM | codes::TRALM)
    }
}
