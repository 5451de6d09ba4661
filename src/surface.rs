//! One-layer soil/surface slab column.
//!
//! Grounded on `srfc_timestep.py`: `calc_albedo_py` for the piecewise
//! albedo rule, `calc_srfc_fluxes_py` for stress/sensible/latent heat,
//! and `tendency_SOILTEMP_py`/`timestep_SOILTEMP_py` for the prognostic
//! soil temperature. `max_moisture_soil`, `desert_moisture_thresh` and
//! `land_evap_resist` are read from a `srfc_namelist` module outside the
//! retrieved file set; the values below are representative defaults
//! (documented as such, not a rediscovery of the original's tuning).

use crate::consts::{C_P, LATENT_HEAT_VAPORIZATION as L_H};
use crate::microphysics::saturation_specific_humidity;
use crate::Float;

pub const MAX_MOISTURE_SOIL: Float = 0.5;
pub const DESERT_MOISTURE_THRESH: Float = 0.1;
pub const LAND_EVAP_RESIST: Float = 0.7;

const FREEZING: Float = 273.15;

/// Shortwave/longwave surface albedo, per [`calc_albedo_py`].
pub fn albedo(ocean: bool, soiltemp: Float, soilmoist: Float) -> (Float, Float) {
    if ocean {
        let sw = if soiltemp <= FREEZING { 0.5 } else { 0.05 };
        (sw, 0.0)
    } else {
        let sw = if soilmoist < DESERT_MOISTURE_THRESH {
            0.3
        } else if soiltemp <= FREEZING {
            0.6
        } else {
            0.2
        };
        (sw, 0.0)
    }
}

/// Drag coefficients for momentum and heat/moisture exchange. Spec.md
/// does not specify values beyond naming `C_M, C_H`; these follow typical
/// bulk-aerodynamic magnitudes for a sigma-coordinate GCM's lowest layer.
pub const DRAG_CM: Float = 2.0e-3;
pub const DRAG_CH: Float = 1.5e-3;

pub struct SurfaceFluxes {
    pub tau_x: Float,
    pub tau_y: Float,
    pub sensible: Float,
    pub latent: Float,
}

/// Surface stress, sensible and latent heat flux at one column, per
/// `calc_srfc_fluxes_py`.
#[allow(clippy::too_many_arguments)]
pub fn surface_fluxes(
    ocean: bool,
    soiltemp: Float,
    soilmoist: Float,
    tair: Float,
    qv: Float,
    windx: Float,
    windy: Float,
    rho: Float,
    psurf: Float,
    colp: Float,
    area: Float,
    dt: Float,
) -> SurfaceFluxes {
    let wind = (windx * windx + windy * windy).sqrt();
    let tau_x = -DRAG_CM * wind * windx * colp * area;
    let tau_y = -DRAG_CM * wind * windy * colp * area;
    let sensible = -DRAG_CH * wind * (tair - soiltemp) * rho * C_P;

    let qv_soil = saturation_specific_humidity(soiltemp, 0.6, psurf);
    let mut latent = -DRAG_CH * wind * (qv - qv_soil) * rho * L_H;
    if !ocean {
        latent *= LAND_EVAP_RESIST;
    }
    latent = latent.max(0.0);
    if !ocean && dt * latent / L_H > soilmoist {
        latent = soilmoist * L_H / dt;
    }

    SurfaceFluxes {
        tau_x,
        tau_y,
        sensible,
        latent,
    }
}

/// Soil temperature tendency, per `tendency_SOILTEMP_py`.
pub fn soiltemp_tendency(lw_net: Float, sw_net: Float, fluxes: &SurfaceFluxes, soil_cp: Float, soil_rho: Float, soil_depth: Float) -> Float {
    let denom = soil_cp * soil_rho * soil_depth;
    (lw_net + sw_net - fluxes.sensible - fluxes.latent) / denom
}

/// Advance soil temperature and moisture one step in place. `rain` is the
/// column-integrated rain mass accumulated by the microphysics column.
pub fn step_soil(soiltemp: &mut Float, soilmoist: &mut Float, dsoiltempdt: Float, fluxes: &SurfaceFluxes, rain: Float, dt: Float) {
    *soiltemp += dt * dsoiltempdt;
    *soilmoist = (*soilmoist + rain - dt * fluxes.latent / L_H).max(0.0).min(MAX_MOISTURE_SOIL);
}
