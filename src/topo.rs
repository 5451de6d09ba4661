//! Topography ingestion: bilinear interpolation of a gridded elevation
//! raster onto the model's lat/lon mesh, clamped to sea level, then
//! smoothed with repeated passes of the 5-point Laplacian.
//!
//! The concrete raster file format is kept behind [`RasterSource`] so this
//! module never depends on a particular format, matching spec.md's
//! "external collaborator with specified interface only" framing for I/O
//! shims.

use crate::grid::{Grid, Staggering};
use crate::halo::exchange;
use crate::Float;
use lerp::Lerp;
use ndarray::{Array2, Array3};

/// A source raster: a regular lat/lon grid of elevations in meters, with
/// its own (generally coarser or differently spaced) coordinate axes.
pub trait RasterSource {
    fn lons_deg(&self) -> &[Float];
    fn lats_deg(&self) -> &[Float];
    /// Elevation at raster index `(ilon, ilat)`, meters.
    fn elevation(&self, ilon: usize, ilat: usize) -> Float;
}

fn locate(axis: &[Float], value: Float) -> (usize, Float) {
    if value <= axis[0] {
        return (0, 0.0);
    }
    let last = axis.len() - 1;
    if value >= axis[last] {
        return (last.saturating_sub(1), 1.0);
    }
    let mut lo = 0;
    while lo + 1 < axis.len() && axis[lo + 1] < value {
        lo += 1;
    }
    let frac = (value - axis[lo]) / (axis[lo + 1] - axis[lo]);
    (lo, frac)
}

/// Bilinearly sample `raster` at one model lat/lon point.
fn sample<R: RasterSource>(raster: &R, lon_deg: Float, lat_deg: Float) -> Float {
    let lons = raster.lons_deg();
    let lats = raster.lats_deg();
    let (ilon, flon) = locate(lons, lon_deg);
    let (ilat, flat) = locate(lats, lat_deg);
    let ilon1 = (ilon + 1).min(lons.len() - 1);
    let ilat1 = (ilat + 1).min(lats.len() - 1);

    let bottom = raster.elevation(ilon, ilat).lerp(raster.elevation(ilon1, ilat), flon);
    let top = raster.elevation(ilon, ilat1).lerp(raster.elevation(ilon1, ilat1), flon);
    bottom.lerp(top, flat)
}

/// Interpolate `raster` onto the model's mass grid, clamped to `>= 0`
/// (sea level), then apply `n_smooth` passes of the 5-point Laplacian
/// smoother with a halo exchange between passes.
pub fn interpolate<R: RasterSource>(grid: &Grid, raster: &R, n_smooth: usize) -> Array3<Float> {
    let (nx, ny) = grid.desc.shape(Staggering::Mass);
    let mut hsurf = Array3::zeros((nx, ny, 1));
    let lon0 = grid.desc.lon0_deg;
    let dlon_deg = (grid.desc.lon1_deg - grid.desc.lon0_deg) / grid.desc.nx as Float;

    for i in 0..nx {
        let lon_deg = lon0 + (i as Float - grid.nb() as Float + 0.5) * dlon_deg;
        for j in 0..ny {
            let lat_deg = grid.lat_rad[[i, j]].to_degrees();
            hsurf[[i, j, 0]] = sample(raster, lon_deg, lat_deg).max(0.0);
        }
    }

    for _ in 0..n_smooth {
        exchange(&mut hsurf, grid.nx(), grid.nb(), Staggering::Mass);
        smooth_once(grid, &mut hsurf);
    }
    exchange(&mut hsurf, grid.nx(), grid.nb(), Staggering::Mass);
    hsurf
}

fn smooth_once(grid: &Grid, hsurf: &mut Array3<Float>) {
    let nb = grid.nb();
    let nx = grid.nx();
    let ny = grid.ny();
    let mut next: Array2<Float> = Array2::zeros((hsurf.dim().0, hsurf.dim().1));
    for i in nb..nx + nb {
        for j in nb..ny + nb {
            next[[i, j]] = 0.25
                * (hsurf[[i - 1, j, 0]] + hsurf[[i + 1, j, 0]] + hsurf[[i, j - 1, 0]] + hsurf[[i, j + 1, 0]]);
        }
    }
    for i in nb..nx + nb {
        for j in nb..ny + nb {
            hsurf[[i, j, 0]] = next[[i, j]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridDescriptor;

    struct FlatRaster {
        lons: Vec<Float>,
        lats: Vec<Float>,
        elevation: Float,
    }

    impl RasterSource for FlatRaster {
        fn lons_deg(&self) -> &[Float] {
            &self.lons
        }
        fn lats_deg(&self) -> &[Float] {
            &self.lats
        }
        fn elevation(&self, _ilon: usize, _ilat: usize) -> Float {
            self.elevation
        }
    }

    fn grid() -> Grid {
        Grid::new(GridDescriptor {
            nx: 6,
            ny: 6,
            nz: 2,
            nb: 1,
            dlat_deg: 10.0,
            lon0_deg: 0.0,
            lon1_deg: 360.0,
            pair_top: 10000.0,
        })
        .unwrap()
    }

    #[test]
    fn flat_raster_interpolates_to_uniform_hsurf() {
        let g = grid();
        let raster = FlatRaster {
            lons: (0..36).map(|i| i as Float * 10.0).collect(),
            lats: (-90..=90).step_by(10).map(|i| i as Float).collect(),
            elevation: 123.0,
        };
        let hsurf = interpolate(&g, &raster, 2);
        let i = g.nb() + 2;
        let j = g.nb() + 2;
        assert!((hsurf[[i, j, 0]] - 123.0).abs() < 1e-9);
    }

    #[test]
    fn negative_elevation_is_clamped_to_sea_level() {
        let g = grid();
        let raster = FlatRaster {
            lons: (0..36).map(|i| i as Float * 10.0).collect(),
            lats: (-90..=90).step_by(10).map(|i| i as Float).collect(),
            elevation: -50.0,
        };
        let hsurf = interpolate(&g, &raster, 0);
        let i = g.nb() + 2;
        let j = g.nb() + 2;
        assert_eq!(hsurf[[i, j, 0]], 0.0);
    }
}
