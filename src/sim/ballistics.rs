use log::{debug, info, warn};
use serde::Serialize;

use super::integrator::rk4_scalar;
use crate::error::{ensure_positive, SimError};
use crate::propulsion::SolidMotor;
use crate::report::BallisticsSummary;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Fixed configuration of a standalone or embedded motor run.
#[derive(Debug, Clone, PartialEq)]
pub struct BallisticsParams {
    pub d_t: f64,               // s
    pub igniter_pressure: f64,  // Pa, chamber pressure at t = 0
    pub external_pressure: f64, // Pa, ambient for standalone runs
    /// Chamber pressure below which combustion is considered over.
    pub min_pressure: f64,
    /// How long pressure may sit below `min_pressure` with propellant left
    /// before the motor is declared extinguished.
    pub tail_off_grace: f64,
    pub max_time: f64,
}

impl BallisticsParams {
    /// Parameters with the default thresholds: twice the external pressure
    /// as the minimum, 0.5 s grace and a 60 s ceiling.
    pub fn new(d_t: f64, igniter_pressure: f64, external_pressure: f64) -> Result<Self, SimError> {
        let p = Self {
            d_t,
            igniter_pressure,
            external_pressure,
            min_pressure: 2.0 * external_pressure,
            tail_off_grace: 0.5,
            max_time: 60.0,
        };
        p.validate()?;
        Ok(p)
    }

    pub fn with_min_pressure(mut self, min_pressure: f64) -> Result<Self, SimError> {
        self.min_pressure = min_pressure;
        self.validate()?;
        Ok(self)
    }

    pub fn with_tail_off_grace(mut self, grace: f64) -> Result<Self, SimError> {
        self.tail_off_grace = grace;
        self.validate()?;
        Ok(self)
    }

    pub fn with_max_time(mut self, max_time: f64) -> Result<Self, SimError> {
        self.max_time = max_time;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("d_t", self.d_t)?;
        ensure_positive("igniter pressure", self.igniter_pressure)?;
        ensure_positive("external pressure", self.external_pressure)?;
        ensure_positive("tail-off grace", self.tail_off_grace)?;
        ensure_positive("max time", self.max_time)?;
        if !(self.min_pressure.is_finite() && self.min_pressure > self.external_pressure) {
            return Err(SimError::config(format!(
                "minimum pressure {} Pa must exceed external pressure {} Pa",
                self.min_pressure, self.external_pressure
            )));
        }
        if self.igniter_pressure <= self.external_pressure {
            return Err(SimError::config(format!(
                "igniter pressure {} Pa does not exceed external pressure {} Pa",
                self.igniter_pressure, self.external_pressure
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Combustion state
// ---------------------------------------------------------------------------

/// One snapshot of the chamber.
///
/// `mass_generation_rate` is the rate used to advance *from* this snapshot;
/// on the newest snapshot it is the rate the next step would start with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombustionState {
    pub time: f64,
    pub chamber_pressure: f64,     // Pa
    pub burned_web: f64,           // m
    pub propellant_mass: f64,      // kg
    pub mass_generation_rate: f64, // kg/s
    pub nozzle_mass_flow: f64,     // kg/s
    pub burn_area: f64,            // m^2
    pub burn_rate: f64,            // m/s
    pub free_volume: f64,          // m^3
    pub exit_pressure: f64,        // Pa
    pub thrust: f64,               // N
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    /// Propellant exhausted and the chamber blown down.
    Burnout,
    /// Pressure stayed below the minimum with propellant left.
    Extinguished,
    TimeLimit,
    /// A caller-supplied stop condition ended the run.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombustionStatus {
    Burning,
    /// No propellant left; the chamber is emptying through the nozzle.
    TailOff,
    Finished(EndReason),
}

// ---------------------------------------------------------------------------
// Propulsion seam consumed by the flight engine
// ---------------------------------------------------------------------------

/// Instantaneous propulsion output handed to the rigid-body integrator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PropulsionOutput {
    pub thrust: f64,          // N, along body +Z
    pub mass_flow: f64,       // kg/s, through the nozzle
    pub propellant_mass: f64, // kg
}

/// Anything that can push the vehicle and be advanced in lock-step with it.
pub trait Propulsion {
    fn output(&self) -> PropulsionOutput;

    /// True while the source still produces (or may produce) thrust.
    fn is_active(&self) -> bool;

    fn advance(&mut self, dt: f64, ambient_pressure: f64) -> Result<(), SimError>;
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Lumped-parameter chamber model advanced at a fixed time step.
#[derive(Debug, Clone)]
pub struct InternalBallistics {
    motor: SolidMotor,
    params: BallisticsParams,
    state: CombustionState,
    history: Vec<CombustionState>,
    status: CombustionStatus,
    low_pressure_since: Option<f64>,
    fault: Option<SimError>,
}

impl InternalBallistics {
    /// Ignite the motor: the chamber starts at the igniter pressure with the
    /// full grain loaded.
    pub fn new(motor: SolidMotor, params: BallisticsParams) -> Result<Self, SimError> {
        motor.validate()?;
        params.validate()?;

        let state = snapshot(
            &motor,
            0.0,
            params.igniter_pressure,
            0.0,
            motor.initial_propellant_mass(),
            params.external_pressure,
        );
        info!(
            "ignition: {:.3} kg of {} at {:.2} MPa",
            state.propellant_mass,
            motor.propellant.name,
            state.chamber_pressure / 1e6
        );

        Ok(Self {
            motor,
            params,
            history: vec![state.clone()],
            state,
            status: CombustionStatus::Burning,
            low_pressure_since: None,
            fault: None,
        })
    }

    pub fn motor(&self) -> &SolidMotor {
        &self.motor
    }

    pub fn params(&self) -> &BallisticsParams {
        &self.params
    }

    pub fn state(&self) -> &CombustionState {
        &self.state
    }

    pub fn history(&self) -> &[CombustionState] {
        &self.history
    }

    /// Performance figures of the history so far.
    pub fn summary(&self) -> BallisticsSummary {
        BallisticsSummary {
            motor_mass: self.motor.total_mass(),
            characteristic_velocity: self.motor.characteristic_velocity(),
            ..BallisticsSummary::from_history(&self.history)
        }
    }

    pub fn status(&self) -> CombustionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, CombustionStatus::Finished(_))
    }

    /// Run at the configured external pressure until the motor finishes.
    pub fn run(&mut self) -> Result<&[CombustionState], SimError> {
        self.run_until(|_| false)
    }

    /// Like [`run`](Self::run), with a stop condition checked after every
    /// step.
    pub fn run_until<F>(&mut self, mut stop: F) -> Result<&[CombustionState], SimError>
    where
        F: FnMut(&CombustionState) -> bool,
    {
        let ambient = self.params.external_pressure;
        while !self.is_finished() {
            self.step(ambient)?;
            if !self.is_finished() && stop(&self.state) {
                self.status = CombustionStatus::Finished(EndReason::Stopped);
                info!("run stopped by caller at t={:.3} s", self.state.time);
            }
        }
        Ok(&self.history)
    }

    /// Advance one configured time step against `external_pressure`.
    pub fn step(&mut self, external_pressure: f64) -> Result<&CombustionState, SimError> {
        self.step_by(self.params.d_t, external_pressure)
    }

    fn step_by(&mut self, dt: f64, ambient: f64) -> Result<&CombustionState, SimError> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }
        if self.is_finished() {
            return Ok(&self.state);
        }
        match self.advance_state(dt, ambient) {
            Ok(next) => {
                self.state = next;
                self.history.push(self.state.clone());
                self.update_status();
                Ok(&self.state)
            }
            Err(err) => {
                self.fault = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Compute the next snapshot and record the generation rate actually
    /// used on the current one.
    fn advance_state(&mut self, dt: f64, ambient: f64) -> Result<CombustionState, SimError> {
        let motor = &self.motor;
        let grain = &motor.grain;
        let prop = &motor.propellant;
        let s = &self.state;
        let burning = self.status == CombustionStatus::Burning;

        // Burning area averaged over the web burned during the step, so the
        // generated mass matches the grain volume exactly.
        let (rate, avg_area, mdot_gen) = if burning {
            let area = grain.surface_area(s.burned_web);
            if area <= 0.0 && s.propellant_mass > 0.0 {
                return Err(SimError::InvalidGeometryState {
                    time: s.time,
                    area,
                    propellant_mass: s.propellant_mass,
                });
            }
            let rate = prop.burn_rate(s.chamber_pressure);
            let dw = rate * dt;
            let burned = grain.propellant_volume(s.burned_web)
                - grain.propellant_volume(s.burned_web + dw);
            let avg_area = if dw > 0.0 { burned / dw } else { area };
            (rate, avg_area, prop.density * burned / dt)
        } else {
            (0.0, 0.0, 0.0)
        };

        let free_volume = motor.structure.chamber_free_volume(grain.propellant_volume(s.burned_web));
        let rt = prop.gas_constant() * prop.flame_temperature;
        let density = prop.density;
        let dpdt = |p: f64| {
            let r = if burning { prop.burn_rate(p) } else { 0.0 };
            let gen = density * avg_area * r;
            let outflow = motor.nozzle_mass_flow(p, ambient);
            (rt * (gen - outflow) - p * avg_area * r) / free_volume
        };

        // Keep each pressure sub-step within half the chamber emptying time.
        let tau = free_volume / (motor.nozzle_mass_flow(1.0, 0.0) * rt);
        let substeps = ((dt / (0.5 * tau)).ceil() as usize).clamp(1, 10_000);
        if substeps > 1 && self.history.len() == 1 {
            debug!("chamber time constant {:.4} s: {} pressure sub-steps per step", tau, substeps);
        }
        let h = dt / substeps as f64;
        let mut pressure = s.chamber_pressure;
        for _ in 0..substeps {
            pressure = rk4_scalar(pressure, h, &dpdt);
        }

        let time = s.time + dt;
        if !pressure.is_finite() || pressure < 0.0 {
            return Err(SimError::NumericalDivergence {
                time,
                quantity: "chamber pressure",
                value: pressure,
            });
        }

        let web = s.burned_web + rate * dt;
        let mut mass = (s.propellant_mass - mdot_gen * dt).max(0.0);
        if web >= grain.web_thickness() {
            mass = 0.0;
        }

        if let Some(last) = self.history.last_mut() {
            last.mass_generation_rate = mdot_gen;
        }

        Ok(snapshot(motor, time, pressure, web, mass, ambient))
    }

    fn update_status(&mut self) {
        let s = &self.state;
        let min_p = self.params.min_pressure;

        match self.status {
            CombustionStatus::Burning if s.propellant_mass <= 0.0 => {
                info!("propellant exhausted at t={:.3} s, tail-off begins", s.time);
                self.status = CombustionStatus::TailOff;
                self.low_pressure_since = None;
            }
            CombustionStatus::Burning if s.chamber_pressure < min_p => {
                let since = *self.low_pressure_since.get_or_insert(s.time);
                if s.time - since > self.params.tail_off_grace {
                    warn!(
                        "combustion extinguished at t={:.3} s with {:.3} kg of propellant left",
                        s.time, s.propellant_mass
                    );
                    self.status = CombustionStatus::Finished(EndReason::Extinguished);
                }
            }
            CombustionStatus::Burning => self.low_pressure_since = None,
            CombustionStatus::TailOff if s.chamber_pressure <= min_p => {
                info!("burnout: chamber blown down at t={:.3} s", s.time);
                self.status = CombustionStatus::Finished(EndReason::Burnout);
            }
            _ => {}
        }

        if !self.is_finished() && s.time >= self.params.max_time - 1e-9 {
            warn!("motor run hit the {:.1} s time limit", self.params.max_time);
            self.status = CombustionStatus::Finished(EndReason::TimeLimit);
        }
    }
}

impl Propulsion for InternalBallistics {
    fn output(&self) -> PropulsionOutput {
        if self.is_finished() {
            return PropulsionOutput {
                propellant_mass: self.state.propellant_mass,
                ..Default::default()
            };
        }
        PropulsionOutput {
            thrust: self.state.thrust,
            mass_flow: self.state.nozzle_mass_flow,
            propellant_mass: self.state.propellant_mass,
        }
    }

    fn is_active(&self) -> bool {
        !self.is_finished()
    }

    fn advance(&mut self, dt: f64, ambient_pressure: f64) -> Result<(), SimError> {
        self.step_by(dt, ambient_pressure).map(|_| ())
    }
}

/// Full snapshot at a given pressure, web and mass.
fn snapshot(
    motor: &SolidMotor,
    time: f64,
    chamber_pressure: f64,
    burned_web: f64,
    propellant_mass: f64,
    ambient: f64,
) -> CombustionState {
    let grain = &motor.grain;
    let (burn_area, burn_rate) = if propellant_mass > 0.0 {
        (
            grain.surface_area(burned_web),
            motor.propellant.burn_rate(chamber_pressure),
        )
    } else {
        (0.0, 0.0)
    };
    let nozzle = motor.nozzle_output(chamber_pressure, ambient);

    CombustionState {
        time,
        chamber_pressure,
        burned_web,
        propellant_mass,
        mass_generation_rate: motor.propellant.density * burn_area * burn_rate,
        nozzle_mass_flow: nozzle.mass_flow,
        burn_area,
        burn_rate,
        free_volume: motor
            .structure
            .chamber_free_volume(grain.propellant_volume(burned_web)),
        exit_pressure: nozzle.exit_pressure,
        thrust: nozzle.thrust,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
