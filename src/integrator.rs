//! Time integration: the density-weighted explicit Euler step, its
//! `COLPA` area-weighted interpolation for wind points, and the
//! tendency-combination step of the four-stage Runge-Kutta variant.
//!
//! Grounded on spec.md §4.6 and `jacobson.py::interp_COLPA` for the exact
//! `COLPA` stencil weights, which spec.md itself only describes as
//! "area-weighted COLP at U/V points".

use crate::grid::Grid;
use crate::Float;
use ndarray::{Array2, Array3};

/// Area-weighted `COLP` interpolated onto U-points: a 6-point stencil in
/// the interior, falling back to a one-sided 4-point stencil at the two
/// meridional domain edges (`jacobson.py`'s `COLPA_is`).
pub fn colpa_u(grid: &Grid, colp: &Array3<Float>) -> Array2<Float> {
    let nb = grid.nb();
    let nx = grid.nx();
    let ny = grid.ny();
    let (nxu, nyu) = grid.desc.shape(crate::grid::Staggering::U);
    let mut out = Array2::zeros((nxu, nyu));
    let a = &grid.area;
    let south_edge = nb;
    let north_edge = ny + nb - 1;
    for i in nb..nx + 1 + nb {
        for j in nb..ny + nb {
            let cw = |ii: usize, jj: usize| colp[[ii, jj, 0]] * a[[ii, jj]];
            out[[i, j]] = if j == south_edge {
                0.25 * (cw(i - 1, j) + cw(i, j) + cw(i - 1, j + 1) + cw(i, j + 1))
            } else if j == north_edge {
                0.25 * (cw(i - 1, j) + cw(i, j) + cw(i - 1, j - 1) + cw(i, j - 1))
            } else {
                (1.0 / 8.0)
                    * (cw(i - 1, j + 1) + cw(i, j + 1) + 2.0 * cw(i - 1, j) + 2.0 * cw(i, j) + cw(i - 1, j - 1) + cw(i, j - 1))
            };
        }
    }
    out
}

/// Area-weighted `COLP` interpolated onto V-points (`jacobson.py`'s
/// `COLPA_js`): the same 6-point stencil, transposed, with no edge
/// special-case since the V grid has no periodic-direction edge.
pub fn colpa_v(grid: &Grid, colp: &Array3<Float>) -> Array2<Float> {
    let nb = grid.nb();
    let nx = grid.nx();
    let ny = grid.ny();
    let (nxv, nyv) = grid.desc.shape(crate::grid::Staggering::V);
    let mut out = Array2::zeros((nxv, nyv));
    let a = &grid.area;
    for i in nb..nx + nb {
        for j in nb..ny + 1 + nb {
            let cw = |ii: usize, jj: usize| colp[[ii, jj, 0]] * a[[ii, jj]];
            out[[i, j]] = (1.0 / 8.0)
                * (cw(i + 1, j - 1) + cw(i + 1, j) + 2.0 * cw(i, j - 1) + 2.0 * cw(i, j) + cw(i - 1, j - 1) + cw(i - 1, j));
        }
    }
    out
}

/// Density-weighted Euler step for a mass-staggered scalar:
/// `X_new = (X_old * COLP_old + dt * F_X) / COLP_new`.
pub fn step_scalar(grid: &Grid, x_old: &Array3<Float>, colp_old: &Array3<Float>, colp_new: &Array3<Float>, tendency: &Array3<Float>, dt: Float, x_new: &mut Array3<Float>) {
    let nb = grid.nb();
    let nx = grid.nx();
    let ny = grid.ny();
    let nz = grid.nz();
    for i in nb..nx + nb {
        for j in nb..ny + nb {
            for k in 0..nz {
                x_new[[i, j, k]] =
                    (x_old[[i, j, k]] * colp_old[[i, j, 0]] + dt * tendency[[i, j, k]]) / colp_new[[i, j, 0]];
            }
        }
    }
}

/// Density-weighted Euler step for a wind component, using `COLPA` in
/// place of `COLP` on both sides of the update.
pub fn step_wind(nx_range: (usize, usize), ny_range: (usize, usize), wind_old: &Array3<Float>, colpa_old: &Array2<Float>, colpa_new: &Array2<Float>, tendency: &Array3<Float>, dt: Float, wind_new: &mut Array3<Float>) {
    let nz = wind_old.dim().2;
    for i in nx_range.0..nx_range.1 {
        for j in ny_range.0..ny_range.1 {
            for k in 0..nz {
                wind_new[[i, j, k]] =
                    (wind_old[[i, j, k]] * colpa_old[[i, j]] + dt * tendency[[i, j, k]]) / colpa_new[[i, j]];
            }
        }
    }
}

/// Combine the four Runge-Kutta stage tendencies into the averaged
/// tendency used for the final update: `(k1 + 2 k2 + 2 k3 + k4) / 6`. The
/// caller is responsible for evaluating `k1..k4` at the appropriate
/// fractional-`dt` states — per spec.md this path is out of scope for
/// bit-reproducibility, so only the combination step lives here.
pub fn rk4_combine(k1: &Array3<Float>, k2: &Array3<Float>, k3: &Array3<Float>, k4: &Array3<Float>, out: &mut Array3<Float>) {
    ndarray::Zip::from(out)
        .and(k1)
        .and(k2)
        .and(k3)
        .and(k4)
        .for_each(|o, &a, &b, &c, &d| *o = (a + 2.0 * b + 2.0 * c + d) / 6.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDescriptor;

    fn grid() -> Grid {
        Grid::new(GridDescriptor {
            nx: 6,
            ny: 6,
            nz: 2,
            nb: 1,
            dlat_deg: 8.0,
            lon0_deg: 0.0,
            lon1_deg: 360.0,
            pair_top: 10000.0,
        })
        .unwrap()
    }

    #[test]
    fn colpa_u_reduces_to_colp_on_uniform_field() {
        let g = grid();
        let (nxm, nym) = g.desc.shape(crate::grid::Staggering::Mass);
        let colp = Array3::from_elem((nxm, nym, 1), 1.0e5 as Float);
        let colpa = colpa_u(&g, &colp);
        let i = g.nb() + 2;
        let j = g.nb() + 2;
        // area is independent of i, so the 6-point stencil collapses to a
        // vertical (j-direction) weighted average of the three rows.
        let expected = 1.0e5 * 0.25 * (g.area[[i, j + 1]] + 2.0 * g.area[[i, j]] + g.area[[i, j - 1]]);
        assert!((colpa[[i, j]] - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn step_scalar_holds_steady_under_zero_tendency_and_steady_colp() {
        let g = grid();
        let (nxm, nym) = g.desc.shape(crate::grid::Staggering::Mass);
        let colp = Array3::from_elem((nxm, nym, 1), 1.0e5 as Float);
        let x = Array3::from_elem((nxm, nym, g.nz()), 300.0 as Float);
        let tendency = Array3::zeros((nxm, nym, g.nz()));
        let mut x_new = Array3::zeros((nxm, nym, g.nz()));
        step_scalar(&g, &x, &colp, &colp, &tendency, 30.0, &mut x_new);
        let i = g.nb() + 1;
        let j = g.nb() + 1;
        assert!((x_new[[i, j, 0]] - 300.0).abs() < 1e-9);
    }
}
