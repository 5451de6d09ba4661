//! Geopotential diagnosis: Exner-function factors and hydrostatic
//! integration from the surface upward.
//!
//! Grounded on spec.md §4.3; the original's analogous routine lives
//! outside the retrieved file set, so the integration order (surface
//! first, then upward) and the half-level extrapolation at the model top
//! are taken directly from the specification text.

use crate::consts::{C_P, KAPPA, P_REF};
use crate::grid::Grid;
use crate::Float;
use ndarray::Array3;

/// Compute `PVTF` (full levels) and `PVTFVB` (half levels) from `COLP` and
/// the grid's sigma coordinate.
pub fn calc_pvtf(grid: &Grid, colp: &Array3<Float>, pvtf: &mut Array3<Float>, pvtfvb: &mut Array3<Float>) {
    let (nx, ny, nz) = pvtf.dim();
    let top = grid.desc.pair_top;
    for i in 0..nx {
        for j in 0..ny {
            let colp_ij = colp[[i, j, 0]];
            for k in 0..nz {
                let p = grid.sigma[k] * colp_ij + top;
                pvtf[[i, j, k]] = (p / P_REF).powf(KAPPA);
            }
            for k in 0..=nz {
                let p = grid.sigma_vb[k] * colp_ij + top;
                pvtfvb[[i, j, k]] = (p / P_REF).powf(KAPPA);
            }
        }
    }
}

/// Hydrostatic integration of `PHI`/`PHIVB` from the surface (`k = nz`)
/// upward to the model top, plus the half-level potential temperature
/// `POTTVB` used by the pressure-gradient and vertical-advection terms.
pub fn calc_phi(
    grid: &Grid,
    hsurf: &Array3<Float>,
    pott: &Array3<Float>,
    pvtf: &Array3<Float>,
    pvtfvb: &Array3<Float>,
    phi: &mut Array3<Float>,
    phivb: &mut Array3<Float>,
    pottvb: &mut Array3<Float>,
) {
    use crate::consts::GRAVITY;
    let (nx, ny, nz) = phi.dim();
    for i in 0..nx {
        for j in 0..ny {
            phivb[[i, j, nz]] = GRAVITY * hsurf[[i, j, 0]];
            for k in (0..nz).rev() {
                let pott_k = pott[[i, j, k]];
                phi[[i, j, k]] = phivb[[i, j, k + 1]] + C_P * pott_k * (pvtfvb[[i, j, k + 1]] - pvtf[[i, j, k]]);
                phivb[[i, j, k]] = phi[[i, j, k]] + C_P * pott_k * (pvtf[[i, j, k]] - pvtfvb[[i, j, k]]);
            }
            // Interior half-levels: Exner-weighted average of the two
            // bracketing centers, not a plain arithmetic mean, so POTTVB
            // is consistent with the PVTF/PVTFVB used elsewhere to form
            // PHI at that same half-level.
            for k in 1..nz {
                let pvtf_lo = pvtf[[i, j, k - 1]];
                let pvtf_hi = pvtf[[i, j, k]];
                let pvtfvb_k = pvtfvb[[i, j, k]];
                pottvb[[i, j, k]] = (pott[[i, j, k - 1]] * (pvtfvb_k - pvtf_hi) + pott[[i, j, k]] * (pvtf_lo - pvtfvb_k)) / (pvtf_lo - pvtf_hi);
            }
            // Model top and surface: linear extrapolation in the same
            // Exner-function coordinate as the interior average, using
            // the slope between the outermost layer center and its
            // adjacent interior half-level. Falls back to the single
            // layer center when nz == 1, where no interior half-level
            // exists to extrapolate from.
            pottvb[[i, j, 0]] = if nz > 1 {
                let pvtf0 = pvtf[[i, j, 0]];
                let slope = (pottvb[[i, j, 1]] - pott[[i, j, 0]]) / (pvtfvb[[i, j, 1]] - pvtf0);
                pott[[i, j, 0]] + slope * (pvtfvb[[i, j, 0]] - pvtf0)
            } else {
                pott[[i, j, 0]]
            };
            pottvb[[i, j, nz]] = if nz > 1 {
                let pvtf_last = pvtf[[i, j, nz - 1]];
                let slope = (pottvb[[i, j, nz - 1]] - pott[[i, j, nz - 1]]) / (pvtfvb[[i, j, nz - 1]] - pvtf_last);
                pott[[i, j, nz - 1]] + slope * (pvtfvb[[i, j, nz]] - pvtf_last)
            } else {
                pott[[i, j, nz - 1]]
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridDescriptor, Staggering};

    fn grid() -> Grid {
        Grid::new(GridDescriptor {
            nx: 4,
            ny: 4,
            nz: 5,
            nb: 1,
            dlat_deg: 10.0,
            lon0_deg: 0.0,
            lon1_deg: 360.0,
            pair_top: 10000.0,
        })
        .unwrap()
    }

    #[test]
    fn flat_surface_isothermal_atmosphere_decreases_phi_with_height() {
        let g = grid();
        let (nxm, nym) = g.desc.shape(Staggering::Mass);
        let hsurf = Array3::zeros((nxm, nym, 1));
        let pott = Array3::from_elem((nxm, nym, g.nz()), 288.0 as Float);
        let colp = Array3::from_elem((nxm, nym, 1), 1.0e5 as Float);
        let mut pvtf = Array3::zeros((nxm, nym, g.nz()));
        let mut pvtfvb = Array3::zeros((nxm, nym, g.desc.nzs()));
        calc_pvtf(&g, &colp, &mut pvtf, &mut pvtfvb);
        let mut phi = Array3::zeros((nxm, nym, g.nz()));
        let mut phivb = Array3::zeros((nxm, nym, g.desc.nzs()));
        let mut pottvb = Array3::zeros((nxm, nym, g.desc.nzs()));
        calc_phi(&g, &hsurf, &pott, &pvtf, &pvtfvb, &mut phi, &mut phivb, &mut pottvb);
        let i = g.nb();
        let j = g.nb();
        for k in 1..g.nz() {
            assert!(phi[[i, j, k - 1]] > phi[[i, j, k]]);
        }
        assert!(phivb[[i, j, g.nz()]] >= 0.0);
    }

    #[test]
    fn pottvb_interior_is_exner_weighted_not_a_plain_arithmetic_mean() {
        let g = grid();
        let (nxm, nym) = g.desc.shape(Staggering::Mass);
        let hsurf = Array3::zeros((nxm, nym, 1));
        let mut pott = Array3::from_elem((nxm, nym, g.nz()), 288.0 as Float);
        let i = g.nb();
        let j = g.nb();
        // A non-uniform column so an arithmetic mean and an
        // Exner-weighted average at the same half-level disagree.
        for k in 0..g.nz() {
            pott[[i, j, k]] = 280.0 + 4.0 * k as Float;
        }
        let colp = Array3::from_elem((nxm, nym, 1), 1.0e5 as Float);
        let mut pvtf = Array3::zeros((nxm, nym, g.nz()));
        let mut pvtfvb = Array3::zeros((nxm, nym, g.desc.nzs()));
        calc_pvtf(&g, &colp, &mut pvtf, &mut pvtfvb);
        let mut phi = Array3::zeros((nxm, nym, g.nz()));
        let mut phivb = Array3::zeros((nxm, nym, g.desc.nzs()));
        let mut pottvb = Array3::zeros((nxm, nym, g.desc.nzs()));
        calc_phi(&g, &hsurf, &pott, &pvtf, &pvtfvb, &mut phi, &mut phivb, &mut pottvb);

        let k = 2;
        let arithmetic_mean = 0.5 * (pott[[i, j, k - 1]] + pott[[i, j, k]]);
        assert!((pottvb[[i, j, k]] - arithmetic_mean).abs() > 1e-6);
        // still bracketed between the two layer centers
        assert!(pottvb[[i, j, k]] > pott[[i, j, k - 1]] && pottvb[[i, j, k]] < pott[[i, j, k]]);
    }

    #[test]
    fn pottvb_endpoints_extrapolate_past_the_outermost_layer_centers() {
        let g = grid();
        let (nxm, nym) = g.desc.shape(Staggering::Mass);
        let hsurf = Array3::zeros((nxm, nym, 1));
        let mut pott = Array3::from_elem((nxm, nym, g.nz()), 288.0 as Float);
        let i = g.nb();
        let j = g.nb();
        for k in 0..g.nz() {
            pott[[i, j, k]] = 280.0 + 4.0 * k as Float;
        }
        let colp = Array3::from_elem((nxm, nym, 1), 1.0e5 as Float);
        let mut pvtf = Array3::zeros((nxm, nym, g.nz()));
        let mut pvtfvb = Array3::zeros((nxm, nym, g.desc.nzs()));
        calc_pvtf(&g, &colp, &mut pvtf, &mut pvtfvb);
        let mut phi = Array3::zeros((nxm, nym, g.nz()));
        let mut phivb = Array3::zeros((nxm, nym, g.desc.nzs()));
        let mut pottvb = Array3::zeros((nxm, nym, g.desc.nzs()));
        calc_phi(&g, &hsurf, &pott, &pvtf, &pvtfvb, &mut phi, &mut phivb, &mut pottvb);

        // pott increases monotonically downward, so a linear extrapolation
        // past the top layer center must undershoot it, and past the
        // bottom layer center must overshoot it.
        assert!(pottvb[[i, j, 0]] < pott[[i, j, 0]]);
        assert!(pottvb[[i, j, g.nz()]] > pott[[i, j, g.nz() - 1]]);
    }
}
