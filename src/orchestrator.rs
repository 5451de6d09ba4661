//! Per-step sequencing: the topological order spec.md §4 lays out —
//! continuity, geopotential diagnosis, momentum tendency, thermodynamic
//! and tracer tendencies, microphysics column, surface column, explicit
//! update, halo exchange, diagnostic refresh — tied together behind one
//! `step()` call. Kernels themselves stay pure functions over borrows;
//! this module owns the field store and the scratch buffers and drives
//! them in the fixed order §5 calls a "strict barrier" DAG.
//!
//! Microphysics and the surface column run as a sequential operator
//! split *after* the dynamical Euler update, mutating the new state
//! directly (per spec.md §4.7's "Move mass: QV -= Q_cond" phrasing,
//! which reads as an in-place column update, not a tendency to blend
//! into the dynamical advection term).
//!
//! Per-term momentum switches (`i_uvflx_hor_adv/vert_adv/coriolis/
//! pre_grad/dif`) are forwarded into [`momentum::TermSwitches`] each step;
//! `i_uvflx_main_switch` remains the coarser all-or-nothing gate that
//! skips [`Orchestrator::momentum_tendencies`] entirely.

use crate::config::Settings;
use crate::consts::{GRAVITY, KAPPA, P_REF, R_D};
use crate::continuity;
use crate::errors::*;
use crate::field::{AuxFluxes, Boundary, Diagnostics, State};
use crate::geopotential;
use crate::grid::{Grid, Staggering};
use crate::halo;
use crate::integrator;
use crate::microphysics;
use crate::momentum;
use crate::radiation;
use crate::surface;
use crate::thermo;
use crate::tracer;
use crate::Float;
use log::info;
use ndarray::{Array2, Array3};

const SOIL_CP: Float = 1200.0;
const SOIL_RHO: Float = 1500.0;
const SOIL_DEPTH: Float = 0.1;

/// Scratch buffers reused across steps so stepping is allocation-free in
/// steady state, per spec.md §3's "no per-step allocations" lifetime note.
struct Scratch {
    colp_new: Array3<Float>,
    duflxdt: Array3<Float>,
    dvflxdt: Array3<Float>,
    dpottdt: Array3<Float>,
    dqvdt: Array3<Float>,
    dqcdt: Array3<Float>,
    dqrdt: Array3<Float>,
    zero_mass: Array3<Float>,
    rain: Array3<Float>,
    pott_new: Array3<Float>,
    qv_new: Array3<Float>,
    qc_new: Array3<Float>,
    qr_new: Array3<Float>,
    uwind_new: Array3<Float>,
    vwind_new: Array3<Float>,
    colpa_u_old: Array2<Float>,
    colpa_v_old: Array2<Float>,
    colpa_u_new: Array2<Float>,
    colpa_v_new: Array2<Float>,
    flxdiv: Array3<Float>,
}

impl Scratch {
    fn new(grid: &Grid) -> Scratch {
        let nz = grid.nz();
        Scratch {
            colp_new: crate::field::zeros(grid, Staggering::Mass, 1),
            duflxdt: crate::field::zeros(grid, Staggering::U, nz),
            dvflxdt: crate::field::zeros(grid, Staggering::V, nz),
            dpottdt: crate::field::zeros(grid, Staggering::Mass, nz),
            dqvdt: crate::field::zeros(grid, Staggering::Mass, nz),
            dqcdt: crate::field::zeros(grid, Staggering::Mass, nz),
            dqrdt: crate::field::zeros(grid, Staggering::Mass, nz),
            zero_mass: crate::field::zeros(grid, Staggering::Mass, nz),
            rain: crate::field::zeros(grid, Staggering::Mass, 1),
            pott_new: crate::field::zeros(grid, Staggering::Mass, nz),
            qv_new: crate::field::zeros(grid, Staggering::Mass, nz),
            qc_new: crate::field::zeros(grid, Staggering::Mass, nz),
            qr_new: crate::field::zeros(grid, Staggering::Mass, nz),
            uwind_new: crate::field::zeros(grid, Staggering::U, nz),
            vwind_new: crate::field::zeros(grid, Staggering::V, nz),
            colpa_u_old: Array2::zeros(grid.desc.shape(Staggering::U)),
            colpa_v_old: Array2::zeros(grid.desc.shape(Staggering::V)),
            colpa_u_new: Array2::zeros(grid.desc.shape(Staggering::U)),
            colpa_v_new: Array2::zeros(grid.desc.shape(Staggering::V)),
            flxdiv: crate::field::zeros(grid, Staggering::Mass, nz),
        }
    }
}

pub struct Orchestrator {
    pub grid: Grid,
    pub settings: Settings,
    pub state: State,
    pub diag: Diagnostics,
    pub aux: AuxFluxes,
    pub boundary: Boundary,
    pub timestep: usize,
    scratch: Scratch,
}

impl Orchestrator {
    pub fn new(settings: Settings, boundary: Boundary) -> Result<Orchestrator> {
        settings.validate()?;
        let grid = Grid::new(settings.grid.into())?;
        let state = State::new(&grid);
        let diag = Diagnostics::new(&grid);
        let aux = AuxFluxes::new(&grid);
        let scratch = Scratch::new(&grid);
        Ok(Orchestrator {
            grid,
            settings,
            state,
            diag,
            aux,
            boundary,
            timestep: 0,
            scratch,
        })
    }

    pub fn from_snapshot(settings: Settings, snapshot: crate::restart::Snapshot) -> Result<Orchestrator> {
        settings.validate()?;
        let grid = Grid::new(snapshot.grid)?;
        let scratch = Scratch::new(&grid);
        Ok(Orchestrator {
            grid,
            settings,
            state: snapshot.state,
            diag: snapshot.diagnostics,
            aux: AuxFluxes::new(&grid),
            boundary: snapshot.boundary,
            timestep: snapshot.timestep,
            scratch,
        })
    }

    pub fn to_snapshot(self) -> crate::restart::Snapshot {
        crate::restart::Snapshot {
            grid: self.grid.desc,
            timestep: self.timestep,
            state: self.state,
            diagnostics: self.diag,
            boundary: self.boundary,
        }
    }

    /// Advance the simulation by one timestep, returning an error if the
    /// post-step sanity scan finds a non-finite or non-physical value.
    pub fn step(&mut self) -> Result<()> {
        let dt = self.settings.time.dt;
        self.diagnose_fluxes_and_continuity(dt);
        self.diagnose_geopotential_and_air();

        if self.settings.switches.i_uvflx_main_switch {
            self.momentum_tendencies();
        } else {
            self.scratch.duflxdt.fill(0.0);
            self.scratch.dvflxdt.fill(0.0);
        }
        self.thermo_and_tracer_tendencies();
        self.explicit_update(dt);

        if self.settings.switches.i_microphysics {
            self.step_microphysics(dt);
        } else {
            self.scratch.rain.fill(0.0);
            self.diag.dpottdt_mic.fill(0.0);
        }
        if self.settings.switches.i_surface_scheme {
            self.step_surface(dt);
        }

        tracer::clip_nonnegative(&mut self.state.qv);
        tracer::clip_nonnegative(&mut self.state.qc);
        tracer::clip_nonnegative(&mut self.state.qr);

        self.exchange_all();
        self.sanity_scan()?;

        self.timestep += 1;
        let interval = self.settings.output.output_interval.max(1);
        if self.timestep % interval == 0 {
            self.state.rainrate.fill(0.0);
            info!("timestep {}: output interval reached, RAINRATE reset", self.timestep);
        }

        Ok(())
    }

    fn diagnose_fluxes_and_continuity(&mut self, dt: Float) {
        if !self.settings.switches.i_colp_main_switch {
            self.scratch.colp_new.assign(&self.state.colp);
            return;
        }
        continuity::calc_uflx(&self.state.uwind, &self.state.colp, &self.grid.dyis, &mut self.diag.uflx);
        continuity::calc_vflx(&self.state.vwind, &self.state.colp, &self.grid.dxjs, &mut self.diag.vflx);
        halo::exchange(&mut self.diag.uflx, self.grid.nx(), self.grid.nb(), Staggering::U);
        halo::exchange(&mut self.diag.vflx, self.grid.nx(), self.grid.nb(), Staggering::V);

        let out = continuity::step(
            &self.grid,
            &self.state.colp,
            &self.diag.uflx,
            &self.diag.vflx,
            dt,
            &mut self.scratch.flxdiv,
            &mut self.diag.wwind,
        );
        self.scratch.colp_new = out.colp_new;
        halo::exchange(&mut self.scratch.colp_new, self.grid.nx(), self.grid.nb(), Staggering::Mass);
        halo::exchange(&mut self.diag.wwind, self.grid.nx(), self.grid.nb(), Staggering::Mass);
    }

    fn diagnose_geopotential_and_air(&mut self) {
        geopotential::calc_pvtf(&self.grid, &self.scratch.colp_new, &mut self.diag.pvtf, &mut self.diag.pvtfvb);
        geopotential::calc_phi(
            &self.grid,
            &self.boundary.hsurf,
            &self.state.pott,
            &self.diag.pvtf,
            &self.diag.pvtfvb,
            &mut self.diag.phi,
            &mut self.diag.phivb,
            &mut self.diag.pottvb,
        );
        let (nx, ny, nz) = self.diag.tair.dim();
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let pvtf = self.diag.pvtf[[i, j, k]];
                    let tair = self.state.pott[[i, j, k]] * pvtf;
                    let pair = P_REF * pvtf.powf(1.0 / KAPPA);
                    self.diag.tair[[i, j, k]] = tair;
                    self.diag.pair[[i, j, k]] = pair;
                    self.diag.rho[[i, j, k]] = pair / (R_D * tair);
                }
            }
        }
    }

    fn momentum_tendencies(&mut self) {
        momentum::interpolate_aux_fluxes(&self.grid, &self.diag.uflx, &self.diag.vflx, &mut self.aux);
        let aux_fields: Vec<&mut Array3<Float>> = vec![
            &mut self.aux.bflx,
            &mut self.aux.rflx,
            &mut self.aux.sflx,
            &mut self.aux.tflx,
            &mut self.aux.dflx,
            &mut self.aux.eflx,
            &mut self.aux.cflx,
            &mut self.aux.qflx,
        ];
        for f in aux_fields {
            halo::exchange(f, self.grid.nx(), self.grid.nb(), Staggering::Mass);
        }

        let dif_uv = self.settings.diffusion.uvflx_dif_coef;
        let sw = &self.settings.switches;
        let switches = momentum::TermSwitches {
            hor_adv: sw.i_uvflx_hor_adv,
            vert_adv: sw.i_uvflx_vert_adv,
            coriolis: sw.i_uvflx_coriolis,
            pre_grad: sw.i_uvflx_pre_grad,
            num_dif: sw.i_uvflx_dif,
        };
        let inputs = momentum::inputs(
            &self.grid,
            &self.state.uwind,
            &self.state.vwind,
            &self.state.colp,
            &self.scratch.colp_new,
            &self.diag.phi,
            &self.state.pott,
            &self.diag.pvtf,
            &self.diag.pvtfvb,
            &self.diag.wwind,
            &self.aux,
            dif_uv,
            switches,
        );
        momentum::tendency_uflx(&inputs, &self.diag.uflx, &mut self.scratch.duflxdt);
        momentum::tendency_vflx(&inputs, &self.diag.vflx, &mut self.scratch.dvflxdt);
    }

    fn thermo_and_tracer_tendencies(&mut self) {
        let dif_pott = self.settings.diffusion.pott_dif_coef;
        thermo::scalar_tendency(
            &self.grid,
            &self.state.pott,
            &self.state.colp,
            &self.scratch.colp_new,
            &self.diag.uflx,
            &self.diag.vflx,
            &self.diag.wwind,
            dif_pott,
            &self.scratch.zero_mass,
            &mut self.scratch.dpottdt,
        );
        tracer::tendency(
            &self.grid,
            &self.state.qv,
            &self.state.colp,
            &self.scratch.colp_new,
            &self.diag.uflx,
            &self.diag.vflx,
            &self.diag.wwind,
            0.0,
            &self.scratch.zero_mass,
            &mut self.scratch.dqvdt,
        );
        tracer::tendency(
            &self.grid,
            &self.state.qc,
            &self.state.colp,
            &self.scratch.colp_new,
            &self.diag.uflx,
            &self.diag.vflx,
            &self.diag.wwind,
            0.0,
            &self.scratch.zero_mass,
            &mut self.scratch.dqcdt,
        );
        tracer::tendency(
            &self.grid,
            &self.state.qr,
            &self.state.colp,
            &self.scratch.colp_new,
            &self.diag.uflx,
            &self.diag.vflx,
            &self.diag.wwind,
            0.0,
            &self.scratch.zero_mass,
            &mut self.scratch.dqrdt,
        );
    }

    fn explicit_update(&mut self, dt: Float) {
        integrator::step_scalar(&self.grid, &self.state.pott, &self.state.colp, &self.scratch.colp_new, &self.scratch.dpottdt, dt, &mut self.scratch.pott_new);
        integrator::step_scalar(&self.grid, &self.state.qv, &self.state.colp, &self.scratch.colp_new, &self.scratch.dqvdt, dt, &mut self.scratch.qv_new);
        integrator::step_scalar(&self.grid, &self.state.qc, &self.state.colp, &self.scratch.colp_new, &self.scratch.dqcdt, dt, &mut self.scratch.qc_new);
        integrator::step_scalar(&self.grid, &self.state.qr, &self.state.colp, &self.scratch.colp_new, &self.scratch.dqrdt, dt, &mut self.scratch.qr_new);
        self.state.pott.assign(&self.scratch.pott_new);
        self.state.qv.assign(&self.scratch.qv_new);
        self.state.qc.assign(&self.scratch.qc_new);
        self.state.qr.assign(&self.scratch.qr_new);

        self.scratch.colpa_u_old = integrator::colpa_u(&self.grid, &self.state.colp);
        self.scratch.colpa_v_old = integrator::colpa_v(&self.grid, &self.state.colp);
        self.scratch.colpa_u_new = integrator::colpa_u(&self.grid, &self.scratch.colp_new);
        self.scratch.colpa_v_new = integrator::colpa_v(&self.grid, &self.scratch.colp_new);

        let (nxu, nyu) = self.grid.desc.shape(Staggering::U);
        let (nxv, nyv) = self.grid.desc.shape(Staggering::V);
        let nb = self.grid.nb();
        integrator::step_wind(
            (nb, nxu - nb),
            (nb, nyu - nb),
            &self.state.uwind,
            &self.scratch.colpa_u_old,
            &self.scratch.colpa_u_new,
            &self.scratch.duflxdt,
            dt,
            &mut self.scratch.uwind_new,
        );
        integrator::step_wind(
            (nb, nxv - nb),
            (nb, nyv - nb),
            &self.state.vwind,
            &self.scratch.colpa_v_old,
            &self.scratch.colpa_v_new,
            &self.scratch.dvflxdt,
            dt,
            &mut self.scratch.vwind_new,
        );
        self.state.uwind.assign(&self.scratch.uwind_new);
        self.state.vwind.assign(&self.scratch.vwind_new);

        self.state.colp.assign(&self.scratch.colp_new);
    }

    fn step_microphysics(&mut self, dt: Float) {
        if !self.settings.switches.i_moist_microphys {
            self.diag.dpottdt_mic.fill(0.0);
            return;
        }
        let nb = self.grid.nb();
        let nx = self.grid.nx();
        let ny = self.grid.ny();
        let nz = self.grid.nz();
        for i in nb..nx + nb {
            for j in nb..ny + nb {
                let mut qv: Vec<Float> = self.state.qv.slice(ndarray::s![i, j, ..]).to_vec();
                let mut qc: Vec<Float> = self.state.qc.slice(ndarray::s![i, j, ..]).to_vec();
                let mut qr: Vec<Float> = self.state.qr.slice(ndarray::s![i, j, ..]).to_vec();
                let mut pott: Vec<Float> = self.state.pott.slice(ndarray::s![i, j, ..]).to_vec();
                let tair: Vec<Float> = self.diag.tair.slice(ndarray::s![i, j, ..]).to_vec();
                let pair: Vec<Float> = self.diag.pair.slice(ndarray::s![i, j, ..]).to_vec();
                let rho: Vec<Float> = self.diag.rho.slice(ndarray::s![i, j, ..]).to_vec();
                let mut dpottdt_mic = vec![0.0; nz];

                let rain = {
                    let mut col = microphysics::Column {
                        qv: &mut qv,
                        qc: &mut qc,
                        qr: &mut qr,
                        pott: &mut pott,
                        tair: &tair,
                        pair: &pair,
                        rho: &rho,
                        dpottdt_mic: &mut dpottdt_mic,
                    };
                    microphysics::step_column(&mut col, dt)
                };

                for k in 0..nz {
                    self.state.qv[[i, j, k]] = qv[k];
                    self.state.qc[[i, j, k]] = qc[k];
                    self.state.qr[[i, j, k]] = qr[k];
                    if self.settings.switches.i_pott_microphys {
                        self.state.pott[[i, j, k]] = pott[k];
                    }
                    self.diag.dpottdt_mic[[i, j, k]] = dpottdt_mic[k];
                }
                self.state.accrain[[i, j, 0]] += rain;
                self.state.rainrate[[i, j, 0]] += rain;
                self.scratch.rain[[i, j, 0]] = rain;
            }
        }
    }

    fn step_surface(&mut self, dt: Float) {
        let nb = self.grid.nb();
        let nx = self.grid.nx();
        let ny = self.grid.ny();
        let nz = self.grid.nz();
        for i in nb..nx + nb {
            for j in nb..ny + nb {
                let ocean = self.boundary.oceanmask[[i, j, 0]];
                let soiltemp = self.state.soiltemp[[i, j, 0]];
                let soilmoist = self.state.soilmoist[[i, j, 0]];
                let (albedo_sw, albedo_lw) = surface::albedo(ocean, soiltemp, soilmoist);

                let mut lw_net = 0.0;
                let mut sw_net = 0.0;
                if self.settings.switches.i_radiation {
                    let lowest_mass = self.grid.dsigma[nz - 1] * self.scratch.colp_new[[i, j, 0]] / GRAVITY;
                    let fluxes = radiation::column_fluxes(self.grid.lat_rad[[i, j]], albedo_sw, albedo_lw, soiltemp, lowest_mass);
                    lw_net = fluxes.lw_net_srfc;
                    sw_net = fluxes.sw_net_srfc;
                    if self.settings.switches.i_pott_radiation {
                        self.state.pott[[i, j, nz - 1]] += dt * fluxes.pott_heating_lowest_layer;
                    }
                }

                let tair = self.diag.tair[[i, j, nz - 1]];
                let qv = self.state.qv[[i, j, nz - 1]];
                let windx = self.state.uwind[[i, j, nz - 1]];
                let windy = self.state.vwind[[i, j, nz - 1]];
                let rho = self.diag.rho[[i, j, nz - 1]];
                let psurf = self.diag.pair[[i, j, nz - 1]];
                let colp = self.scratch.colp_new[[i, j, 0]];
                let area = self.grid.area[[i, j]];
                let fluxes = surface::surface_fluxes(ocean, soiltemp, soilmoist, tair, qv, windx, windy, rho, psurf, colp, area, dt);

                let dsoiltempdt = surface::soiltemp_tendency(lw_net, sw_net, &fluxes, SOIL_CP, SOIL_RHO, SOIL_DEPTH);
                let rain = self.scratch.rain[[i, j, 0]];
                let mut soiltemp_mut = soiltemp;
                let mut soilmoist_mut = soilmoist;
                surface::step_soil(&mut soiltemp_mut, &mut soilmoist_mut, dsoiltempdt, &fluxes, rain, dt);
                self.state.soiltemp[[i, j, 0]] = soiltemp_mut;
                self.state.soilmoist[[i, j, 0]] = soilmoist_mut;
            }
        }
    }

    fn exchange_all(&mut self) {
        let nx = self.grid.nx();
        let nb = self.grid.nb();
        halo::exchange(&mut self.state.colp, nx, nb, Staggering::Mass);
        halo::exchange(&mut self.state.uwind, nx, nb, Staggering::U);
        halo::exchange(&mut self.state.vwind, nx, nb, Staggering::V);
        halo::exchange(&mut self.state.pott, nx, nb, Staggering::Mass);
        halo::exchange(&mut self.state.qv, nx, nb, Staggering::Mass);
        halo::exchange(&mut self.state.qc, nx, nb, Staggering::Mass);
        halo::exchange(&mut self.state.qr, nx, nb, Staggering::Mass);
        halo::exchange(&mut self.state.soiltemp, nx, nb, Staggering::Mass);
        halo::exchange(&mut self.state.soilmoist, nx, nb, Staggering::Mass);
    }

    /// Post-step sanity scan: `COLP <= 0`, `POTT <= 0` or any non-finite
    /// value is a fatal numerical breakdown, named with its first
    /// offending cell, per spec.md §7.
    fn sanity_scan(&self) -> Result<()> {
        let nb = self.grid.nb();
        let nx = self.grid.nx();
        let ny = self.grid.ny();
        for i in nb..nx + nb {
            for j in nb..ny + nb {
                let colp = self.state.colp[[i, j, 0]];
                if !colp.is_finite() || colp <= 0.0 {
                    bail!(ErrorKind::NumericalBreakdown("COLP".into(), i, j, 0, colp.to_string()));
                }
                for k in 0..self.grid.nz() {
                    let pott = self.state.pott[[i, j, k]];
                    if !pott.is_finite() || pott <= 0.0 {
                        bail!(ErrorKind::NumericalBreakdown("POTT".into(), i, j, k, pott.to_string()));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiffusionSettings, GridSettings, OutputSettings, SwitchSettings, TimeSettings, TimeStepping, WorkingPrecision};

    fn settings() -> Settings {
        Settings {
            grid: GridSettings {
                nx: 6,
                ny: 6,
                nz: 3,
                nb: 1,
                dlat_deg: 8.0,
                lon0_deg: 0.0,
                lon1_deg: 360.0,
                pair_top: 10000.0,
            },
            time: TimeSettings {
                dt: 30.0,
                num_steps: 1,
                i_time_stepping: TimeStepping::Euler,
            },
            switches: SwitchSettings {
                i_uvflx_main_switch: true,
                i_uvflx_hor_adv: true,
                i_uvflx_vert_adv: true,
                i_uvflx_coriolis: true,
                i_uvflx_pre_grad: true,
                i_uvflx_dif: false,
                i_colp_main_switch: true,
                i_radiation: false,
                i_microphysics: false,
                i_surface_scheme: false,
                i_moist_microphys: false,
                i_pott_microphys: false,
                i_pott_radiation: false,
            },
            diffusion: DiffusionSettings {
                uvflx_dif_coef: 0.0,
                pott_dif_coef: 0.0,
                colp_dif_coef: 0.0,
            },
            output: OutputSettings {
                output_path: "output".into(),
                output_interval: 1000,
                output_fields: std::collections::HashMap::new(),
            },
            working_precision: WorkingPrecision::Float64,
        }
    }

    #[test]
    fn resting_uniform_atmosphere_keeps_colp_and_pott_steady() {
        let grid = Grid::new(settings().grid.into()).unwrap();
        let mut orch = Orchestrator::new(settings(), Boundary::new(&grid)).unwrap();
        for v in orch.state.colp.iter_mut() {
            *v = 1.0e5;
        }
        for v in orch.state.pott.iter_mut() {
            *v = 288.0;
        }
        orch.step().unwrap();
        let nb = orch.grid.nb();
        let i = nb + 2;
        let j = nb + 2;
        assert!((orch.state.colp[[i, j, 0]] - 1.0e5).abs() < 1e-6);
        assert!((orch.state.pott[[i, j, 0]] - 288.0).abs() < 1e-6);
    }

    #[test]
    fn step_increments_timestep_counter() {
        let grid = Grid::new(settings().grid.into()).unwrap();
        let mut orch = Orchestrator::new(settings(), Boundary::new(&grid)).unwrap();
        for v in orch.state.colp.iter_mut() {
            *v = 1.0e5;
        }
        for v in orch.state.pott.iter_mut() {
            *v = 288.0;
        }
        orch.step().unwrap();
        assert_eq!(orch.timestep, 1);
    }
}
