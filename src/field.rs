//! The field store: named, halo-including 3D arrays, allocated once and
//! reused for the lifetime of a run.
//!
//! Kernels are expressed as plain functions over `ArrayView`/`ArrayViewMut`
//! borrows rather than methods on a god object, so the same function body
//! can in principle be handed to a different dispatcher (a data-parallel
//! accelerator launch is the "two drivers sharing the same body" design
//! note) without this module knowing about it. `State`, `Diagnostics` and
//! `AuxFluxes` below are the three groups of named arrays spec.md's data
//! model distinguishes: prognostic, diagnostic, and kernel-private
//! auxiliary storage.

use crate::grid::{Grid, Staggering};
use crate::Float;
use ndarray::Array3;
use serde_derive::{Deserialize, Serialize};

/// Allocate a zeroed field at the given staggering and vertical extent
/// (`nz` layer centers or `nz + 1` half-levels; pass `1` for a purely
/// horizontal field such as `COLP`).
pub fn zeros(grid: &Grid, stag: Staggering, nk: usize) -> Array3<Float> {
    let (nx, ny) = grid.desc.shape(stag);
    Array3::zeros((nx, ny, nk))
}

/// Prognostic state: the fields the time integrator advances.
#[derive(Serialize, Deserialize)]
pub struct State {
    /// Column pressure, mass-staggered, `k = 0` only.
    pub colp: Array3<Float>,
    pub uwind: Array3<Float>,
    pub vwind: Array3<Float>,
    pub pott: Array3<Float>,
    pub qv: Array3<Float>,
    pub qc: Array3<Float>,
    pub qr: Array3<Float>,
    /// Soil slab state, mass-staggered, `k = 0` only.
    pub soiltemp: Array3<Float>,
    pub soilmoist: Array3<Float>,
    pub accrain: Array3<Float>,
    pub rainrate: Array3<Float>,
}

impl State {
    pub fn new(grid: &Grid) -> State {
        let nz = grid.nz();
        State {
            colp: zeros(grid, Staggering::Mass, 1),
            uwind: zeros(grid, Staggering::U, nz),
            vwind: zeros(grid, Staggering::V, nz),
            pott: zeros(grid, Staggering::Mass, nz),
            qv: zeros(grid, Staggering::Mass, nz),
            qc: zeros(grid, Staggering::Mass, nz),
            qr: zeros(grid, Staggering::Mass, nz),
            soiltemp: zeros(grid, Staggering::Mass, 1),
            soilmoist: zeros(grid, Staggering::Mass, 1),
            accrain: zeros(grid, Staggering::Mass, 1),
            rainrate: zeros(grid, Staggering::Mass, 1),
        }
    }
}

/// Diagnostic fields: recomputed from the prognostic state every step.
#[derive(Serialize, Deserialize)]
pub struct Diagnostics {
    /// Vertical sigma-velocity on half-levels.
    pub wwind: Array3<Float>,
    pub uflx: Array3<Float>,
    pub vflx: Array3<Float>,
    pub pvtf: Array3<Float>,
    pub pvtfvb: Array3<Float>,
    pub phi: Array3<Float>,
    pub phivb: Array3<Float>,
    pub pottvb: Array3<Float>,
    pub tair: Array3<Float>,
    pub pair: Array3<Float>,
    pub rho: Array3<Float>,
    /// Latent-heating rate reported by the microphysics column, per
    /// spec.md §4.7 step 3's `dPOTTdt_MIC`. Zeroed at the start of every
    /// step and only written where `i_microphysics` runs.
    pub dpottdt_mic: Array3<Float>,
}

impl Diagnostics {
    pub fn new(grid: &Grid) -> Diagnostics {
        let nz = grid.nz();
        let nzs = grid.desc.nzs();
        Diagnostics {
            wwind: zeros(grid, Staggering::Mass, nzs),
            uflx: zeros(grid, Staggering::U, nz),
            vflx: zeros(grid, Staggering::V, nz),
            pvtf: zeros(grid, Staggering::Mass, nz),
            pvtfvb: zeros(grid, Staggering::Mass, nzs),
            phi: zeros(grid, Staggering::Mass, nz),
            phivb: zeros(grid, Staggering::Mass, nzs),
            pottvb: zeros(grid, Staggering::Mass, nzs),
            tair: zeros(grid, Staggering::Mass, nz),
            pair: zeros(grid, Staggering::Mass, nz),
            rho: zeros(grid, Staggering::Mass, nz),
            dpottdt_mic: zeros(grid, Staggering::Mass, nz),
        }
    }
}

/// Auxiliary flux arrays owned by the momentum-tendency component and
/// reused across steps: no per-step allocation in steady state.
///
/// All eight fields share the mass grid's halo-included shape, following
/// the single shared buffer extent the originating implementation uses
/// for every one of `BFLX, CFLX, DFLX, EFLX, RFLX, QFLX, SFLX, TFLX`
/// (`wind_cuda.py`'s `run_UWIND`/`run_VWIND` source, which indexes all
/// eight at the same `nx + 2, ny + 2` buffer regardless of the notional
/// mass/U/V/corner position each interpolates onto).
pub struct AuxFluxes {
    pub bflx: Array3<Float>,
    pub rflx: Array3<Float>,
    pub sflx: Array3<Float>,
    pub tflx: Array3<Float>,
    pub dflx: Array3<Float>,
    pub eflx: Array3<Float>,
    pub cflx: Array3<Float>,
    pub qflx: Array3<Float>,
    pub flxdiv: Array3<Float>,
    pub wwind_uwind: Array3<Float>,
    pub wwind_vwind: Array3<Float>,
}

impl AuxFluxes {
    pub fn new(grid: &Grid) -> AuxFluxes {
        let nz = grid.nz();
        let nzs = grid.desc.nzs();
        AuxFluxes {
            bflx: zeros(grid, Staggering::Mass, nz),
            rflx: zeros(grid, Staggering::Mass, nz),
            sflx: zeros(grid, Staggering::Mass, nz),
            tflx: zeros(grid, Staggering::Mass, nz),
            dflx: zeros(grid, Staggering::Mass, nz),
            eflx: zeros(grid, Staggering::Mass, nz),
            cflx: zeros(grid, Staggering::Mass, nz),
            qflx: zeros(grid, Staggering::Mass, nz),
            flxdiv: zeros(grid, Staggering::Mass, nz),
            wwind_uwind: zeros(grid, Staggering::U, nzs),
            wwind_vwind: zeros(grid, Staggering::V, nzs),
        }
    }
}

/// Fields that persist across a full run but are neither stepped nor
/// recomputed each step: static boundary/surface descriptors.
#[derive(Serialize, Deserialize)]
pub struct Boundary {
    pub hsurf: Array3<Float>,
    pub oceanmask: Array3<bool>,
}

impl Boundary {
    pub fn new(grid: &Grid) -> Boundary {
        let (nx, ny) = grid.desc.shape(Staggering::Mass);
        Boundary {
            hsurf: zeros(grid, Staggering::Mass, 1),
            oceanmask: Array3::from_elem((nx, ny, 1), false),
        }
    }
}
