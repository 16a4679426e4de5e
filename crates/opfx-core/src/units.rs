//! Unit newtypes for angles and angle-constraint shadow prices.
//!
//! Solvers work in radians, while branch tables report angle limits and their
//! multipliers in degrees. Keeping the two as distinct types makes every
//! conversion explicit at the call site.
//!
//! # Usage
//!
//! ```
//! use opfx_core::units::{Degrees, PerRadian};
//!
//! let angle_rad = Degrees(30.0).to_radians();
//! assert!((angle_rad.value() - std::f64::consts::FRAC_PI_6).abs() < 1e-12);
//!
//! // A multiplier of 180 $/rad is worth pi $/deg
//! let mu = PerRadian(180.0).to_per_degree();
//! assert!((mu.value() - std::f64::consts::PI).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, Mul, Neg, Sub};

/// Implement common arithmetic operations for unit types
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }
        }
    };
}

// =============================================================================
// Angle Units
// =============================================================================

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0 * PI / 180.0)
    }
}

// =============================================================================
// Angle Shadow Prices
// =============================================================================

/// Shadow price on an angle-difference constraint, per radian of angle
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerRadian(pub f64);

impl_unit_ops!(PerRadian, "/rad");

/// Shadow price on an angle-difference constraint, per degree of angle
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerDegree(pub f64);

impl_unit_ops!(PerDegree, "/°");

impl PerRadian {
    /// One degree is pi/180 radians, so the price of a degree scales the same way.
    #[inline]
    pub fn to_per_degree(self) -> PerDegree {
        PerDegree(self.0 * Degrees(1.0).to_radians().value())
    }
}

impl PerDegree {
    #[inline]
    pub fn to_per_radian(self) -> PerRadian {
        PerRadian(self.0 / Degrees(1.0).to_radians().value())
    }
}
