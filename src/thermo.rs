//! Thermodynamic (and, via [`scalar_tendency`], tracer) tendency: flux-form
//! horizontal advection, vertical advection against the diagnosed
//! `WWIND`, Laplacian horizontal diffusion, and a physics source term.
//!
//! Grounded on spec.md §4.5. The horizontal term mirrors
//! `dyn_continuity.py`'s `calc_FLXDIV_py` pattern (same area-normalized
//! flux-divergence shape), generalized from the flux fields themselves to
//! flux times an interface-averaged scalar; `tracer.rs` reuses this
//! kernel unchanged for `QV, QC, QR` since spec.md gives one shared
//! contract for `X ∈ {POTT, QV, QC, QR}`.

use crate::grid::Grid;
use crate::Float;
use ndarray::Array3;

/// Half-level interpolant of a mass-centered field, zero at both
/// endpoints ("endpoints zero flux").
fn half_level(x: &Array3<Float>, i: usize, j: usize, k: usize, nz: usize) -> Float {
    if k == 0 || k == nz {
        0.0
    } else {
        0.5 * (x[[i, j, k - 1]] + x[[i, j, k]])
    }
}

/// Tendency of `COLP * X`, for any mass-staggered scalar `X`, written into
/// `out`. `phys_source` is the physics tendency `dX/dt` (not yet
/// density-weighted); pass a zeroed array when no physics term applies.
#[allow(clippy::too_many_arguments)]
pub fn scalar_tendency(
    grid: &Grid,
    x: &Array3<Float>,
    colp: &Array3<Float>,
    colp_new: &Array3<Float>,
    uflx: &Array3<Float>,
    vflx: &Array3<Float>,
    wwind: &Array3<Float>,
    dif_coef: Float,
    phys_source: &Array3<Float>,
    out: &mut Array3<Float>,
) {
    let nb = grid.nb();
    let nx = grid.nx();
    let ny = grid.ny();
    let nz = grid.nz();

    for i in nb..nx + nb {
        for j in nb..ny + nb {
            for k in 0..nz {
                let xu_w = 0.5 * (x[[i - 1, j, k]] + x[[i, j, k]]);
                let xu_e = 0.5 * (x[[i, j, k]] + x[[i + 1, j, k]]);
                let xv_s = 0.5 * (x[[i, j - 1, k]] + x[[i, j, k]]);
                let xv_n = 0.5 * (x[[i, j, k]] + x[[i, j + 1, k]]);
                let adv_h = -(uflx[[i + 1, j, k]] * xu_e - uflx[[i, j, k]] * xu_w
                    + vflx[[i, j + 1, k]] * xv_n
                    - vflx[[i, j, k]] * xv_s)
                    / grid.area[[i, j]];

                let xvb_lo = half_level(x, i, j, k, nz);
                let xvb_hi = half_level(x, i, j, k + 1, nz);
                let adv_v = (wwind[[i, j, k]] * colp_new[[i, j, 0]] * xvb_lo
                    - wwind[[i, j, k + 1]] * colp_new[[i, j, 0]] * xvb_hi)
                    / grid.dsigma[k];

                let mut dif = 0.0;
                if dif_coef > 0.0 {
                    dif = dif_coef
                        * ((colp[[i - 1, j, 0]] * x[[i - 1, j, k]] - colp[[i, j, 0]] * x[[i, j, k]])
                            + (colp[[i + 1, j, 0]] * x[[i + 1, j, k]] - colp[[i, j, 0]] * x[[i, j, k]])
                            + (colp[[i, j - 1, 0]] * x[[i, j - 1, k]] - colp[[i, j, 0]] * x[[i, j, k]])
                            + (colp[[i, j + 1, 0]] * x[[i, j + 1, k]] - colp[[i, j, 0]] * x[[i, j, k]]));
                }

                out[[i, j, k]] = adv_h + adv_v + dif + phys_source[[i, j, k]] * colp[[i, j, 0]];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridDescriptor, Staggering};

    fn grid() -> Grid {
        Grid::new(GridDescriptor {
            nx: 5,
            ny: 5,
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
    fn uniform_field_and_zero_wind_has_zero_tendency() {
        let g = grid();
        let (nxm, nym) = g.desc.shape(Staggering::Mass);
        let (nxu, nyu) = g.desc.shape(Staggering::U);
        let (nxv, nyv) = g.desc.shape(Staggering::V);
        let x = Array3::from_elem((nxm, nym, g.nz()), 300.0 as Float);
        let colp = Array3::from_elem((nxm, nym, 1), 1.0e5 as Float);
        let uflx = Array3::zeros((nxu, nyu, g.nz()));
        let vflx = Array3::zeros((nxv, nyv, g.nz()));
        let wwind = Array3::zeros((nxm, nym, g.desc.nzs()));
        let phys = Array3::zeros((nxm, nym, g.nz()));
        let mut out = Array3::zeros((nxm, nym, g.nz()));
        scalar_tendency(&g, &x, &colp, &colp, &uflx, &vflx, &wwind, 0.0, &phys, &mut out);
        for i in g.nb()..g.nx() + g.nb() {
            for j in g.nb()..g.ny() + g.nb() {
                for k in 0..g.nz() {
                    assert_eq!(out[[i, j, k]], 0.0);
                }
            }
        }
    }
}
