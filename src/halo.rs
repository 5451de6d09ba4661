//! Periodic-x and rigid-y halo exchange.
//!
//! Every field in the store is kept as a 3D array (even purely horizontal
//! fields such as `COLP`, which carry a singleton vertical axis) so that a
//! single pair of functions services every prognostic and diagnostic
//! field. The exchange is called whenever a newly-written field is about
//! to be read by a stencil that reaches into the halo — callers invoke
//! [`exchange`] right after writing, not lazily before reading.

use crate::grid::Staggering;
use crate::Float;
use ndarray::Array3;

/// Fill the `i < nb` and `i >= nx + nb` halo columns by wrapping around the
/// `nx` interior columns, regardless of staggering: U-staggered fields
/// share the same wrap offset `nx` as mass/V fields because the physical
/// period is the same even though the interface grid carries one extra
/// point.
pub fn periodic_x(field: &mut Array3<Float>, nx: usize, nb: usize) {
    let (_, ny, nz) = field.dim();
    for j in 0..ny {
        for k in 0..nz {
            for b in 0..nb {
                let west = field[[b + nx, j, k]];
                field[[b, j, k]] = west;
                let east = field[[nb + b, j, k]];
                field[[nx + nb + b, j, k]] = east;
            }
        }
    }
}

/// Fill the `j < nb` and `j >= ny_total - nb` halo rows.
///
/// Mass-, U- and corner-staggered fields mirror about the boundary
/// (`2*nb - 1 - j` at the south edge, the symmetric reflection at the
/// north edge). V-staggered fields instead copy the outermost interior
/// row, since the meridional velocity component vanishes through the pole
/// line rather than reflecting.
pub fn rigid_y(field: &mut Array3<Float>, nb: usize, stag: Staggering) {
    let (nxt, ny_total, nz) = field.dim();
    for i in 0..nxt {
        for k in 0..nz {
            for b in 0..nb {
                let (south_src, north_src) = match stag {
                    Staggering::V => (nb, ny_total - 1 - nb),
                    Staggering::Mass | Staggering::U => (2 * nb - 1 - b, ny_total - nb - 1 - b),
                };
                field[[i, b, k]] = field[[i, south_src, k]];
                field[[i, ny_total - nb + b, k]] = field[[i, north_src, k]];
            }
        }
    }
}

/// Full halo exchange: periodic in x, rigid in y.
pub fn exchange(field: &mut Array3<Float>, nx: usize, nb: usize, stag: Staggering) {
    periodic_x(field, nx, nb);
    rigid_y(field, nb, stag);
}
