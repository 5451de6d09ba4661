//! Grid geometry: cell centers, the three coexisting staggerings (mass,
//! U, V), and the metric terms (area, interface lengths, Coriolis
//! parameter) that the flux and tendency kernels read every step.
//!
//! Horizontal indices always include the halo: an array of `nx` interior
//! cells and `nb` halo cells on each side has a global index range
//! `0 .. nx + 2*nb`, with the interior occupying `nb .. nb + nx`. This is
//! the same convention the teacher's `Distribution` uses for its periodic
//! grid (`src/simulation/distribution.rs`), generalized here to a
//! lat/lon mesh with a second, rigid boundary in latitude.

use crate::consts::{EARTH_RADIUS, EARTH_ROTATION_RATE};
use crate::errors::*;
use crate::Float;
use ndarray::Array2;

/// One of the three coexisting horizontal staggerings of the Arakawa
/// C-grid. Carried as plain data on field descriptors (rather than encoded
/// in the type system) per the design notes: kernels verify operand
/// compatibility at construction time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Staggering {
    /// Cell centers; mass, pressure and tracers live here.
    Mass,
    /// East-west cell interfaces; `UWIND` and `UFLX` live here.
    U,
    /// North-south cell interfaces; `VWIND` and `VFLX` live here.
    V,
}

/// Compile-time-fixed description of the domain's size, used to build a
/// [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDescriptor {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub nb: usize,
    pub dlat_deg: Float,
    pub lon0_deg: Float,
    pub lon1_deg: Float,
    pub pair_top: Float,
}

impl GridDescriptor {
    /// Number of vertical half-levels (`nz + 1`).
    pub fn nzs(&self) -> usize {
        self.nz + 1
    }

    /// Horizontal shape `(nx, ny)` of a mass-staggered field, halos
    /// included.
    pub fn shape(&self, stag: Staggering) -> (usize, usize) {
        let nb2 = 2 * self.nb;
        match stag {
            Staggering::Mass => (self.nx + nb2, self.ny + nb2),
            Staggering::U => (self.nx + 1 + nb2, self.ny + nb2),
            Staggering::V => (self.nx + nb2, self.ny + 1 + nb2),
        }
    }
}

/// Precomputed grid geometry: metric terms that never change during a run.
///
/// All 2D arrays are stored at full (halo-included) shape, even where the
/// underlying quantity only depends on latitude, so that stencil code can
/// index them uniformly as `geom.area[[i, j]]` without special-casing
/// broadcast.
#[derive(Debug, Clone)]
pub struct Grid {
    pub desc: GridDescriptor,

    /// Longitude step, radians.
    pub dlon_rad: Float,
    /// Latitude step, radians.
    pub dlat_rad: Float,

    /// Cell area, mass-staggered, m^2.
    pub area: Array2<Float>,
    /// U-interface (meridional) length `dyis`, U-staggered, m.
    pub dyis: Array2<Float>,
    /// V-interface (zonal) length `dxjs`, V-staggered, m. Shrinks with
    /// `cos(lat)` towards the poles.
    pub dxjs: Array2<Float>,

    /// Coriolis parameter at mass/U latitude rows, mass-staggered.
    pub corf: Array2<Float>,
    /// Coriolis parameter at V latitude rows, V-staggered.
    pub corf_v: Array2<Float>,

    /// Latitude, radians, mass/U-staggered (same rows).
    pub lat_rad: Array2<Float>,
    /// Latitude, radians, V-staggered.
    pub lat_v_rad: Array2<Float>,

    /// Sigma coordinate at layer centers, length `nz`.
    pub sigma: Vec<Float>,
    /// Sigma coordinate at half-level interfaces, length `nz + 1`.
    pub sigma_vb: Vec<Float>,
    /// Layer thickness in sigma space, length `nz`.
    pub dsigma: Vec<Float>,
}

impl Grid {
    pub fn new(desc: GridDescriptor) -> Result<Grid> {
        validate_descriptor(&desc)?;

        let dlon_rad = (desc.lon1_deg - desc.lon0_deg).to_radians() / desc.nx as Float;
        let dlat_rad = desc.dlat_deg.to_radians();

        let (nxm, nym) = desc.shape(Staggering::Mass);
        let (nxu, nyu) = desc.shape(Staggering::U);
        let (nxv, nyv) = desc.shape(Staggering::V);
        let nb = desc.nb as isize;
        let ny = desc.ny as isize;

        // Latitude of mass row j (global index, halo included), domain
        // centered on the equator.
        let mass_lat = |j: isize| -> Float {
            let j_int = j - nb;
            (-0.5 * ny as Float + (j_int as Float + 0.5)) * dlat_rad
        };
        // Latitude of V-interface row j (one more row than mass; located
        // at cell edges rather than centers).
        let v_lat = |j: isize| -> Float {
            let j_int = j - nb;
            (-0.5 * ny as Float + j_int as Float) * dlat_rad
        };

        let mut area = Array2::zeros((nxm, nym));
        let mut lat_rad = Array2::zeros((nxm, nym));
        let mut corf = Array2::zeros((nxm, nym));
        for j in 0..nym {
            let lat = mass_lat(j as isize);
            let a = EARTH_RADIUS * EARTH_RADIUS * dlon_rad * dlat_rad * lat.cos();
            let f = 2.0 * EARTH_ROTATION_RATE * lat.sin();
            for i in 0..nxm {
                area[[i, j]] = a;
                lat_rad[[i, j]] = lat;
                corf[[i, j]] = f;
            }
        }

        let mut dyis = Array2::zeros((nxu, nyu));
        let dy = EARTH_RADIUS * dlat_rad;
        for j in 0..nyu {
            for i in 0..nxu {
                dyis[[i, j]] = dy;
            }
        }

        let mut dxjs = Array2::zeros((nxv, nyv));
        let mut lat_v_rad = Array2::zeros((nxv, nyv));
        let mut corf_v = Array2::zeros((nxv, nyv));
        for j in 0..nyv {
            let lat = v_lat(j as isize);
            let dx = EARTH_RADIUS * dlon_rad * lat.cos();
            let f = 2.0 * EARTH_ROTATION_RATE * lat.sin();
            for i in 0..nxv {
                dxjs[[i, j]] = dx;
                lat_v_rad[[i, j]] = lat;
                corf_v[[i, j]] = f;
            }
        }

        let nz = desc.nz;
        let sigma_vb: Vec<Float> = (0..=nz).map(|k| k as Float / nz as Float).collect();
        let sigma: Vec<Float> = (0..nz)
            .map(|k| 0.5 * (sigma_vb[k] + sigma_vb[k + 1]))
            .collect();
        let dsigma: Vec<Float> = (0..nz).map(|k| sigma_vb[k + 1] - sigma_vb[k]).collect();

        Ok(Grid {
            desc,
            dlon_rad,
            dlat_rad,
            area,
            dyis,
            dxjs,
            corf,
            corf_v,
            lat_rad,
            lat_v_rad,
            sigma,
            sigma_vb,
            dsigma,
        })
    }

    pub fn nx(&self) -> usize {
        self.desc.nx
    }
    pub fn ny(&self) -> usize {
        self.desc.ny
    }
    pub fn nz(&self) -> usize {
        self.desc.nz
    }
    pub fn nb(&self) -> usize {
        self.desc.nb
    }
}

fn validate_descriptor(desc: &GridDescriptor) -> Result<()> {
    if desc.nx == 0 || desc.ny == 0 || desc.nz == 0 {
        bail!(ErrorKind::Config("nx, ny and nz must be positive".into()));
    }
    if desc.nb != 1 {
        bail!(ErrorKind::Config(
            "nb > 1 is not implemented; fix nb = 1".into()
        ));
    }
    if desc.lon0_deg != 0.0 || desc.lon1_deg != 360.0 {
        bail!(ErrorKind::Config(
            "only global longitude domains (lon0_deg = 0, lon1_deg = 360) support periodic-x boundaries".into()
        ));
    }
    if desc.pair_top <= 0.0 {
        bail!(ErrorKind::Config("pair_top must be positive".into()));
    }
    Ok(())
}
