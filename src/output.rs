//! Self-describing dimensioned output dataset.
//!
//! No NetCDF crate sits in the teacher's or pack's dependency set, so
//! this module builds the same dimension/variable layout the original's
//! `io_nc_output.py` would write to a `.nc` file, and serializes it with
//! `serde`+`bincode` instead. [`OutputSink`] is the seam a real NetCDF
//! backend would implement; everything upstream of it only knows about
//! [`Frame`] values.

use crate::errors::*;
use crate::field::{Boundary, Diagnostics, State};
use crate::grid::Grid;
use crate::Float;
use ndarray::Array3;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Coordinate axes of the output dataset: `time` is implicit (one
/// [`Frame`] per write), the rest mirror spec.md §6's
/// `level(nz), levels(nzs), lat(ny), lats(nys), lon(nx), lons(nxs)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimensions {
    pub lon_rad: Vec<Float>,
    pub lons_rad: Vec<Float>,
    pub lat_rad: Vec<Float>,
    pub lats_rad: Vec<Float>,
    pub level: Vec<Float>,
    pub levels: Vec<Float>,
}

impl Dimensions {
    pub fn new(grid: &Grid) -> Dimensions {
        let nb = grid.nb();
        let nx = grid.nx();
        let ny = grid.ny();
        let dlon = grid.dlon_rad;

        Dimensions {
            lon_rad: (0..nx)
                .map(|i| grid.desc.lon0_deg.to_radians() + (i as Float + 0.5) * dlon)
                .collect(),
            lons_rad: (0..=nx)
                .map(|i| grid.desc.lon0_deg.to_radians() + i as Float * dlon)
                .collect(),
            lat_rad: (nb..nb + ny).map(|j| grid.lat_rad[[nb, j]]).collect(),
            lats_rad: (nb..=nb + ny).map(|j| grid.lat_v_rad[[nb, j]]).collect(),
            level: grid.sigma.clone(),
            levels: grid.sigma_vb.clone(),
        }
    }
}

/// One time-slice of the dataset: every requested field, halo-stripped
/// and transposed from the kernels' `(i, j, k)` storage order to the
/// dataset's `(level, lat, lon)` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub timestep: usize,
    pub time_seconds: Float,
    pub fields: HashMap<String, Array3<Float>>,
}

/// Written once, at start-up: the static fields spec.md §6 pulls out of
/// the per-step loop (`HSURF, OCEANMASK`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantsFrame {
    pub hsurf: Array3<Float>,
    pub oceanmask: Array3<bool>,
}

/// Halo-stripped, `(k, j, i)`-ordered copy of a halo-included `(i, j, k)`
/// field.
fn strip_halo(field: &Array3<Float>, nb: usize) -> Array3<Float> {
    let (nx, ny, nk) = field.dim();
    let mut out = Array3::zeros((nk, ny - 2 * nb, nx - 2 * nb));
    for k in 0..nk {
        for j in nb..ny - nb {
            for i in nb..nx - nb {
                out[[k, j - nb, i - nb]] = field[[i, j, k]];
            }
        }
    }
    out
}

/// Zonal (longitude) mean of a halo-stripped, `(level, lat, lon)`-ordered
/// field, collapsing the last axis to length 1. Grounded on
/// `io_nc_output.py`'s `UWINDprof`/`POTTprof`/... variables, each a
/// `np.mean(..., axis=0)` over the longitude index.
fn zonal_mean(field: &Array3<Float>) -> Array3<Float> {
    let (nk, nj, ni) = field.dim();
    let mut out = Array3::zeros((nk, nj, 1));
    for k in 0..nk {
        for j in 0..nj {
            let sum: Float = (0..ni).map(|i| field[[k, j, i]]).sum();
            out[[k, j, 0]] = sum / ni as Float;
        }
    }
    out
}

fn field_by_name<'a>(state: &'a State, diag: &'a Diagnostics, name: &str) -> Option<&'a Array3<Float>> {
    match name {
        "COLP" => Some(&state.colp),
        "UWIND" => Some(&state.uwind),
        "VWIND" => Some(&state.vwind),
        "POTT" => Some(&state.pott),
        "QV" => Some(&state.qv),
        "QC" => Some(&state.qc),
        "QR" => Some(&state.qr),
        "SOILTEMP" => Some(&state.soiltemp),
        "SOILMOIST" => Some(&state.soilmoist),
        "ACCRAIN" => Some(&state.accrain),
        "RAINRATE" => Some(&state.rainrate),
        "WWIND" => Some(&diag.wwind),
        "UFLX" => Some(&diag.uflx),
        "VFLX" => Some(&diag.vflx),
        "PVTF" => Some(&diag.pvtf),
        "PVTFVB" => Some(&diag.pvtfvb),
        "PHI" => Some(&diag.phi),
        "PHIVB" => Some(&diag.phivb),
        "POTTVB" => Some(&diag.pottvb),
        "TAIR" => Some(&diag.tair),
        "PAIR" => Some(&diag.pair),
        "RHO" => Some(&diag.rho),
        "DPOTTDT_MIC" => Some(&diag.dpottdt_mic),
        _ => None,
    }
}

/// Build a [`Frame`] from the current state for the fields named in
/// `output_fields`; unknown names are dropped silently (the settings
/// validator is not the place to know the full field catalogue, but a
/// typo here should not abort a run mid-flight). A level of `0` skips the
/// field; `1` writes the full interior field; `2` additionally writes a
/// `{name}PROF` zonal-mean profile, per `io_nc_output.py`'s
/// `output_fields[name] > 1` checks.
pub fn collect_frame(
    grid: &Grid,
    state: &State,
    diag: &Diagnostics,
    timestep: usize,
    time_seconds: Float,
    output_fields: &HashMap<String, u8>,
) -> Frame {
    let nb = grid.nb();
    let mut fields = HashMap::new();
    for (name, level) in output_fields {
        if *level == 0 {
            continue;
        }
        if let Some(arr) = field_by_name(state, diag, name) {
            let stripped = strip_halo(arr, nb);
            if *level >= 2 {
                fields.insert(format!("{}PROF", name), zonal_mean(&stripped));
            }
            fields.insert(name.clone(), stripped);
        }
    }
    Frame {
        timestep,
        time_seconds,
        fields,
    }
}

/// Destination for a dataset's dimensions, constants and per-step
/// frames. The concrete format (here, bincode) is kept behind this
/// trait so a NetCDF-backed implementation could replace it without
/// touching the orchestrator or CLI front-end.
pub trait OutputSink {
    fn write_dimensions(&mut self, dims: &Dimensions) -> Result<()>;
    fn write_constants(&mut self, constants: &ConstantsFrame) -> Result<()>;
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;
}

/// Appends bincode-serialized values to a single file: dimensions first,
/// then the constants frame, then one [`Frame`] per call thereafter.
pub struct BincodeSink {
    writer: BufWriter<File>,
}

impl BincodeSink {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<BincodeSink> {
        let f = File::create(path)?;
        Ok(BincodeSink {
            writer: BufWriter::new(f),
        })
    }
}

impl OutputSink for BincodeSink {
    fn write_dimensions(&mut self, dims: &Dimensions) -> Result<()> {
        bincode::serialize_into(&mut self.writer, dims).map_err(Error::from)
    }

    fn write_constants(&mut self, constants: &ConstantsFrame) -> Result<()> {
        bincode::serialize_into(&mut self.writer, constants).map_err(Error::from)
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        bincode::serialize_into(&mut self.writer, frame).map_err(Error::from)
    }
}

impl ConstantsFrame {
    pub fn from_boundary(boundary: &Boundary, nb: usize) -> ConstantsFrame {
        ConstantsFrame {
            hsurf: strip_halo(&boundary.hsurf, nb),
            oceanmask: {
                let (nx, ny, nk) = boundary.oceanmask.dim();
                let mut out = Array3::from_elem((nk, ny - 2 * nb, nx - 2 * nb), false);
                for k in 0..nk {
                    for j in nb..ny - nb {
                        for i in nb..nx - nb {
                            out[[k, j - nb, i - nb]] = boundary.oceanmask[[i, j, k]];
                        }
                    }
                }
                out
            },
        }
    }
}
