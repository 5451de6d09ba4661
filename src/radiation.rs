//! Simple column radiation: net shortwave and longwave surface fluxes,
//! and an atmospheric heating tendency on `POTT`.
//!
//! Spec.md treats radiation only as two switches (`i_radiation`,
//! `i_POTT_radiation`) feeding the surface and thermodynamic tendencies;
//! the scheme that actually produces `LWFLXNET_srfc`/`SWFLXNET_srfc`
//! (consumed by `srfc_timestep.py::tendency_SOILTEMP_py`) sits in a
//! module outside the retrieved file set. What follows is a standard
//! single-layer gray-atmosphere approximation, not a port: a fixed solar
//! constant attenuated by the cosine solar zenith angle for shortwave,
//! and a Stefan-Boltzmann balance between the soil and an effective sky
//! temperature for longwave.

use crate::consts::GRAVITY;
use crate::Float;

const SOLAR_CONSTANT: Float = 1361.0;
const STEFAN_BOLTZMANN: Float = 5.670374e-8;
/// Effective atmospheric emission temperature, a crude stand-in for a
/// real vertical radiative-transfer integration.
const SKY_TEMPERATURE: Float = 255.0;
const ATMOSPHERIC_EMISSIVITY: Float = 0.8;

/// Cosine of the solar zenith angle for a column at latitude `lat_rad`,
/// given a fixed zero-declination (equinox) sun directly over the
/// equator — enough to produce an equator-to-pole insolation gradient
/// without modeling orbital geometry.
pub fn cos_zenith(lat_rad: Float) -> Float {
    lat_rad.cos().max(0.0)
}

pub struct RadiationFluxes {
    pub sw_net_srfc: Float,
    pub lw_net_srfc: Float,
    /// Atmospheric heating rate applied to the lowest model layer only;
    /// spec.md's §4.5 physics-source term folds this into `dPOTTdt`.
    pub pott_heating_lowest_layer: Float,
}

/// Compute net surface radiative fluxes and the lowest-layer atmospheric
/// heating rate for one column.
pub fn column_fluxes(lat_rad: Float, albedo_sw: Float, albedo_lw: Float, soiltemp: Float, lowest_layer_mass: Float) -> RadiationFluxes {
    let insolation = SOLAR_CONSTANT * cos_zenith(lat_rad);
    let sw_net_srfc = insolation * (1.0 - albedo_sw);

    let down = ATMOSPHERIC_EMISSIVITY * STEFAN_BOLTZMANN * SKY_TEMPERATURE.powi(4);
    let up = (1.0 - albedo_lw) * STEFAN_BOLTZMANN * soiltemp.powi(4);
    let lw_net_srfc = down - up;

    // A fraction of the absorbed shortwave warms the lowest atmospheric
    // layer directly (clear-sky absorption); the rest reaches the
    // surface accounted for above.
    let absorbed_fraction = 0.1;
    let pott_heating_lowest_layer = absorbed_fraction * insolation / (lowest_layer_mass * GRAVITY);

    RadiationFluxes {
        sw_net_srfc,
        lw_net_srfc,
        pott_heating_lowest_layer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polar_column_receives_less_insolation_than_equatorial() {
        let equator = column_fluxes(0.0, 0.2, 0.0, 290.0, 1.0e4);
        let pole = column_fluxes(1.4, 0.2, 0.0, 250.0, 1.0e4);
        assert!(equator.sw_net_srfc > pole.sw_net_srfc);
    }

    #[test]
    fn hot_soil_radiates_more_than_cold_soil() {
        let hot = column_fluxes(0.5, 0.2, 0.0, 310.0, 1.0e4);
        let cold = column_fluxes(0.5, 0.2, 0.0, 260.0, 1.0e4);
        assert!(hot.lw_net_srfc < cold.lw_net_srfc);
    }
}
