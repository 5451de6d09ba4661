//! TOML settings file, deserialized the way the teacher's `settings/si.rs`
//! deserializes `SettingsSI`: nested `#[derive(Serialize, Deserialize)]`
//! records with `#[serde(deny_unknown_fields)]`, validated once at
//! start-up before any field is allocated.

use crate::errors::*;
use crate::grid::GridDescriptor;
use crate::Float;
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub grid: GridSettings,
    pub time: TimeSettings,
    pub switches: SwitchSettings,
    pub diffusion: DiffusionSettings,
    pub output: OutputSettings,
    #[serde(default)]
    pub working_precision: WorkingPrecision,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkingPrecision {
    Float32,
    Float64,
}

impl Default for WorkingPrecision {
    fn default() -> Self {
        WorkingPrecision::Float64
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GridSettings {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub nb: usize,
    pub dlat_deg: Float,
    pub lon0_deg: Float,
    pub lon1_deg: Float,
    pub pair_top: Float,
}

impl From<GridSettings> for GridDescriptor {
    fn from(g: GridSettings) -> GridDescriptor {
        GridDescriptor {
            nx: g.nx,
            ny: g.ny,
            nz: g.nz,
            nb: g.nb,
            dlat_deg: g.dlat_deg,
            lon0_deg: g.lon0_deg,
            lon1_deg: g.lon1_deg,
            pair_top: g.pair_top,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeStepping {
    Euler,
    Rk4,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TimeSettings {
    pub dt: Float,
    pub num_steps: usize,
    pub i_time_stepping: TimeStepping,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SwitchSettings {
    pub i_uvflx_main_switch: bool,
    pub i_uvflx_hor_adv: bool,
    pub i_uvflx_vert_adv: bool,
    pub i_uvflx_coriolis: bool,
    pub i_uvflx_pre_grad: bool,
    pub i_uvflx_dif: bool,
    pub i_colp_main_switch: bool,
    pub i_radiation: bool,
    pub i_microphysics: bool,
    pub i_surface_scheme: bool,
    pub i_moist_microphys: bool,
    pub i_pott_microphys: bool,
    pub i_pott_radiation: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DiffusionSettings {
    pub uvflx_dif_coef: Float,
    pub pott_dif_coef: Float,
    pub colp_dif_coef: Float,
}

/// `output_fields{name -> 0|1|2}`: `0` (or absent) skips the field, `1`
/// writes its full interior field, `2` additionally writes a zonal-mean
/// profile, per `io_nc_output.py`'s `output_fields[name] > 1` checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    pub output_path: String,
    pub output_interval: usize,
    pub output_fields: HashMap<String, u8>,
}

impl Settings {
    pub fn read_parameter_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let mut f = File::open(path)?;
        let mut content = String::new();
        f.read_to_string(&mut content)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every configuration-error case spec.md §7 names, before any
    /// field is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.grid.lon0_deg != 0.0 || self.grid.lon1_deg != 360.0 {
            bail!(ErrorKind::Config(
                "only global longitude domains (lon0_deg = 0, lon1_deg = 360) are supported".into()
            ));
        }
        if self.grid.nb != 1 {
            bail!(ErrorKind::Config("nb > 1 is not implemented; fix nb = 1".into()));
        }
        if self.grid.nx == 0 || self.grid.ny == 0 || self.grid.nz == 0 {
            bail!(ErrorKind::Config("nx, ny and nz must be positive".into()));
        }
        if self.time.dt <= 0.0 {
            bail!(ErrorKind::Config("dt must be positive".into()));
        }
        if self.switches.i_radiation && !self.switches.i_surface_scheme {
            bail!(ErrorKind::Config(
                "i_radiation requires i_surface_scheme (radiative fluxes couple through the surface column)".into()
            ));
        }
        if self.time.i_time_stepping == TimeStepping::Rk4 {
            bail!(ErrorKind::Config(
                "i_time_stepping = RK4 is not available: only the tendency-combination step is implemented, not full substep orchestration".into()
            ));
        }
        if self.diffusion.colp_dif_coef > 0.0 {
            bail!(ErrorKind::Config("COLP_dif_coef > 0 is not implemented; pressure diffusion is unsupported".into()));
        }
        for (name, level) in &self.output.output_fields {
            if *level > 2 {
                bail!(ErrorKind::Config(format!("output_fields[{}] = {} is out of range: must be 0, 1 or 2", name, level)));
            }
        }
        Ok(())
    }
}
