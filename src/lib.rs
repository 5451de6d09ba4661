//! Dynamical core of a hydrostatic, sigma-coordinate atmospheric general
//! circulation model on a regular latitude/longitude C-grid.
//!
//! The crate is organized leaf-first: grid geometry and the field store sit
//! at the bottom, the per-term tendency kernels (continuity, geopotential,
//! momentum, thermodynamic, tracer) sit in the middle, and the time
//! integrator plus orchestrator tie them together into a stepping
//! simulation. Physics columns (microphysics, surface) are independent of
//! the horizontal dynamics and operate one grid column at a time.

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod consts;
pub mod continuity;
pub mod errors;
pub mod field;
pub mod geopotential;
pub mod grid;
pub mod halo;
pub mod integrator;
pub mod microphysics;
pub mod momentum;
pub mod orchestrator;
pub mod output;
pub mod radiation;
pub mod restart;
pub mod surface;
pub mod thermo;
pub mod topo;
pub mod tracer;

/// Working-precision float type. Selected at compile time via the `single`
/// Cargo feature, mirroring the teacher's own `single` feature switch.
#[cfg(not(feature = "single"))]
pub type Float = f64;
#[cfg(feature = "single")]
pub type Float = f32;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
