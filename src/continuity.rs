//! Continuity equation and diagnostic vertical velocity.
//!
//! Grounded on `dyn_continuity.py`'s `calc_UFLX_py` / `calc_VFLX_py` /
//! `calc_FLXDIV_py` and its CPU launcher: mass fluxes first, their layer
//! divergence second, the column-pressure tendency as the vertical sum of
//! that divergence, and `WWIND` as a serial prefix sum of the same field.
//! The original offers a power-of-two shared-memory reduction for the
//! vertical sum and explicitly abandons it ("Removed vertical reduction
//! restriction of nz = 2**x") in favor of the serial scan kept here.

use crate::grid::Grid;
use crate::Float;
use ndarray::{Array3, Zip};

/// Mass flux through U-interfaces: `(COLP_im1 + COLP)/2 * UWIND * dyis`.
pub fn calc_uflx(uwind: &Array3<Float>, colp: &Array3<Float>, dyis: &ndarray::Array2<Float>, uflx: &mut Array3<Float>) {
    let (nxu, nyu, nz) = uflx.dim();
    for i in 0..nxu {
        let im1 = if i == 0 { 0 } else { i - 1 };
        for j in 0..nyu {
            let colp_avg = 0.5 * (colp[[im1, j, 0]] + colp[[i.min(colp.dim().0 - 1), j, 0]]);
            for k in 0..nz {
                uflx[[i, j, k]] = colp_avg * uwind[[i, j, k]] * dyis[[i, j]];
            }
        }
    }
}

/// Mass flux through V-interfaces: `(COLP_jm1 + COLP)/2 * VWIND * dxjs`.
pub fn calc_vflx(vwind: &Array3<Float>, colp: &Array3<Float>, dxjs: &ndarray::Array2<Float>, vflx: &mut Array3<Float>) {
    let (nxv, nyv, nz) = vflx.dim();
    for i in 0..nxv {
        for j in 0..nyv {
            let jm1 = if j == 0 { 0 } else { j - 1 };
            let colp_avg = 0.5 * (colp[[i, jm1, 0]] + colp[[i, j.min(colp.dim().1 - 1), 0]]);
            for k in 0..nz {
                vflx[[i, j, k]] = colp_avg * vwind[[i, j, k]] * dxjs[[i, j]];
            }
        }
    }
}

/// Result of a continuity step: everything the rest of the tendency
/// kernels need as input for the same timestep.
pub struct ContinuityOutput {
    pub colp_new: Array3<Float>,
    pub dcolpdt: Array3<Float>,
}

/// Advance `COLP` one step and diagnose `WWIND`, given mass fluxes already
/// written into `diag.uflx` / `diag.vflx` by [`calc_uflx`] / [`calc_vflx`].
///
/// `flxdiv` is an nz-deep scratch buffer owned by the caller (reused across
/// steps); `wwind` is written in place at `nz + 1` half-levels, with the
/// model-top and surface interfaces left at zero.
pub fn step(
    grid: &Grid,
    colp_old: &Array3<Float>,
    uflx: &Array3<Float>,
    vflx: &Array3<Float>,
    dt: Float,
    flxdiv: &mut Array3<Float>,
    wwind: &mut Array3<Float>,
) -> ContinuityOutput {
    let nb = grid.nb();
    let nx = grid.nx();
    let ny = grid.ny();
    let nz = grid.nz();

    for i in nb..nx + nb {
        for j in nb..ny + nb {
            for k in 0..nz {
                let div = (uflx[[i + 1, j, k]] - uflx[[i, j, k]] + vflx[[i, j + 1, k]] - vflx[[i, j, k]])
                    * grid.dsigma[k]
                    / grid.area[[i, j]];
                flxdiv[[i, j, k]] = div;
            }
        }
    }

    let (nxm, nym) = (colp_old.dim().0, colp_old.dim().1);
    let mut dcolpdt = Array3::zeros((nxm, nym, 1));
    let mut colp_new = colp_old.clone();
    for i in nb..nx + nb {
        for j in nb..ny + nb {
            let sum: Float = (0..nz).map(|k| flxdiv[[i, j, k]]).sum();
            dcolpdt[[i, j, 0]] = -sum;
            colp_new[[i, j, 0]] = colp_old[[i, j, 0]] + dt * dcolpdt[[i, j, 0]];
        }
    }

    // Zero WWIND at the two closed boundaries, then fill the interior
    // half-levels with the prefix sum of FLXDIV, executed strictly in
    // ascending k so that S_k is the sum over all layers above it.
    Zip::from(wwind.genrows_mut()).for_each(|mut col| col.fill(0.0));
    for i in nb..nx + nb {
        for j in nb..ny + nb {
            let mut prefix = 0.0;
            for k in 1..nz {
                prefix += flxdiv[[i, j, k - 1]];
                wwind[[i, j, k]] = -prefix / colp_new[[i, j, 0]]
                    - grid.sigma_vb[k] * dcolpdt[[i, j, 0]] / colp_new[[i, j, 0]];
            }
        }
    }

    ContinuityOutput { colp_new, dcolpdt }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridDescriptor, Staggering};

    fn grid() -> Grid {
        Grid::new(GridDescriptor {
            nx: 6,
            ny: 4,
            nz: 3,
            nb: 1,
            dlat_deg: 10.0,
            lon0_deg: 0.0,
            lon1_deg: 360.0,
            pair_top: 10000.0,
        })
        .unwrap()
    }

    #[test]
    fn zero_wind_holds_colp_steady() {
        let g = grid();
        let (nxm, nym) = g.desc.shape(Staggering::Mass);
        let (nxu, nyu) = g.desc.shape(Staggering::U);
        let (nxv, nyv) = g.desc.shape(Staggering::V);
        let colp_old = Array3::from_elem((nxm, nym, 1), 1.0e5 as Float);
        let uwind = Array3::zeros((nxu, nyu, g.nz()));
        let vwind = Array3::zeros((nxv, nyv, g.nz()));
        let mut uflx = Array3::zeros((nxu, nyu, g.nz()));
        let mut vflx = Array3::zeros((nxv, nyv, g.nz()));
        calc_uflx(&uwind, &colp_old, &g.dyis, &mut uflx);
        calc_vflx(&vwind, &colp_old, &g.dxjs, &mut vflx);
        let mut flxdiv = Array3::zeros((nxm, nym, g.nz()));
        let mut wwind = Array3::zeros((nxm, nym, g.desc.nzs()));
        let out = step(&g, &colp_old, &uflx, &vflx, 30.0, &mut flxdiv, &mut wwind);
        for i in g.nb()..g.nx() + g.nb() {
            for j in g.nb()..g.ny() + g.nb() {
                assert!((out.colp_new[[i, j, 0]] - 1.0e5).abs() < 1e-6);
                assert_eq!(out.dcolpdt[[i, j, 0]], 0.0);
            }
        }
    }

    #[test]
    fn dry_mass_conserved_to_machine_precision() {
        let g = grid();
        let (nxm, nym) = g.desc.shape(Staggering::Mass);
        let (nxu, nyu) = g.desc.shape(Staggering::U);
        let (nxv, nyv) = g.desc.shape(Staggering::V);
        let colp_old = Array3::from_elem((nxm, nym, 1), 1.0e5 as Float);
        let mut uwind = Array3::zeros((nxu, nyu, g.nz()));
        for v in uwind.iter_mut() {
            *v = 5.0;
        }
        let vwind = Array3::zeros((nxv, nyv, g.nz()));
        let mut uflx = Array3::zeros((nxu, nyu, g.nz()));
        let mut vflx = Array3::zeros((nxv, nyv, g.nz()));
        calc_uflx(&uwind, &colp_old, &g.dyis, &mut uflx);
        calc_vflx(&vwind, &colp_old, &g.dxjs, &mut vflx);
        crate::halo::exchange(&mut uflx, g.nx(), g.nb(), Staggering::U);
        crate::halo::exchange(&mut vflx, g.nx(), g.nb(), Staggering::V);
        let mut flxdiv = Array3::zeros((nxm, nym, g.nz()));
        let mut wwind = Array3::zeros((nxm, nym, g.desc.nzs()));
        let out = step(&g, &colp_old, &uflx, &vflx, 30.0, &mut flxdiv, &mut wwind);

        let mut mass_before = 0.0;
        let mut mass_after = 0.0;
        for i in g.nb()..g.nx() + g.nb() {
            for j in g.nb()..g.ny() + g.nb() {
                mass_before += colp_old[[i, j, 0]] * g.area[[i, j]];
                mass_after += out.colp_new[[i, j, 0]] * g.area[[i, j]];
            }
        }
        // uniform zonal flow on a periodic-x domain: every column sees
        // matching inflow and outflow, so total mass is unchanged.
        assert!((mass_after - mass_before).abs() / mass_before < 1e-10);
    }
}
