//! Tracer tendencies (`QV, QC, QR`): the same flux-form contract as
//! potential temperature, per spec.md §4.5 ("For `X ∈ {POTT, QV, QC,
//! QR}`"), plus the clip-to-nonnegative step the time integrator applies
//! after stepping a tracer forward.

use crate::grid::Grid;
use crate::thermo::scalar_tendency;
use crate::Float;
use ndarray::Array3;

/// Tendency of `COLP * Q` for one tracer, identical in shape to
/// [`scalar_tendency`]; kept as a thin named wrapper so call sites read
/// `tracer::tendency(...)` rather than reaching into `thermo` directly.
#[allow(clippy::too_many_arguments)]
pub fn tendency(
    grid: &Grid,
    q: &Array3<Float>,
    colp: &Array3<Float>,
    colp_new: &Array3<Float>,
    uflx: &Array3<Float>,
    vflx: &Array3<Float>,
    wwind: &Array3<Float>,
    dif_coef: Float,
    phys_source: &Array3<Float>,
    out: &mut Array3<Float>,
) {
    scalar_tendency(grid, q, colp, colp_new, uflx, vflx, wwind, dif_coef, phys_source, out);
}

/// Clip a tracer to non-negative values in place, after the Euler update.
pub fn clip_nonnegative(q: &mut Array3<Float>) {
    for v in q.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
        }
    }
}
