//! Physical constants shared across the dynamical core and physics columns.
//!
//! Values follow the original model's `io_constants` module (dry air
//! thermodynamics, not reproduced numerically in the distributed
//! specification).

use crate::Float;

/// Dry air gas constant, J / (kg K).
pub const R_D: Float = 287.0;
/// Specific heat of dry air at constant pressure, J / (kg K).
pub const C_P: Float = 1005.0;
/// Exner exponent `R_d / c_p`.
pub const KAPPA: Float = R_D / C_P;
/// Reference pressure for the Exner function, Pa.
pub const P_REF: Float = 1.0e5;
/// Gravitational acceleration, m / s^2.
pub const GRAVITY: Float = 9.80665;
/// Latent heat of vaporization, J / kg.
pub const LATENT_HEAT_VAPORIZATION: Float = 2.26e6;
/// Mean Earth radius, m.
pub const EARTH_RADIUS: Float = 6.371e6;
/// Earth's mean angular rotation rate, rad / s.
pub const EARTH_ROTATION_RATE: Float = 7.292e-5;
/// Two pi, used throughout the grid's angular arithmetic.
pub const TWOPI: Float = std::f64::consts::PI as Float * 2.0;
