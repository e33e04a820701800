use log::{debug, info, warn};
use nalgebra::{UnitQuaternion, Vector3};

use super::ballistics::{BallisticsParams, InternalBallistics, Propulsion};
use super::event::{ApogeeDetector, EventDetector, FlightEvent, FlightEventKind};
use super::integrator::rk4_step;
use super::phase::FlightPhase;
use crate::dynamics::{sixdof, MassModel, RigidBodyState};
use crate::error::{ensure_positive, SimError};
use crate::physics::aerodynamics::{AerodynamicsModel, RocketAerodynamics};
use crate::physics::atmosphere::{AtmosphereModel, Isa1976};
use crate::recovery::Recovery;
use crate::report::FlightSummary;
use crate::vehicle::Rocket;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FlightParams {
    pub d_t: f64,
    /// Launch site elevation above mean sea level, m.
    pub initial_elevation: f64,
    pub rail_length: f64,
    /// Rail elevation above the horizon, degrees in (0, 90].
    pub launch_angle: f64,
    /// Rail azimuth, degrees clockwise from north in [0, 360).
    pub heading_angle: f64,
    pub igniter_pressure: f64,
    pub max_time: f64,
    /// Largest accepted deviation of the attitude quaternion norm from 1.
    pub attitude_tolerance: f64,
}

impl FlightParams {
    pub fn new(
        d_t: f64,
        initial_elevation: f64,
        rail_length: f64,
        launch_angle: f64,
        heading_angle: f64,
        igniter_pressure: f64,
    ) -> Result<Self, SimError> {
        let p = Self {
            d_t,
            initial_elevation,
            rail_length,
            launch_angle,
            heading_angle,
            igniter_pressure,
            max_time: 600.0,
            attitude_tolerance: 1e-9,
        };
        p.validate()?;
        Ok(p)
    }

    pub fn with_max_time(mut self, max_time: f64) -> Result<Self, SimError> {
        self.max_time = max_time;
        self.validate()?;
        Ok(self)
    }

    pub fn with_attitude_tolerance(mut self, tolerance: f64) -> Result<Self, SimError> {
        self.attitude_tolerance = tolerance;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("d_t", self.d_t)?;
        ensure_positive("rail length", self.rail_length)?;
        ensure_positive("igniter pressure", self.igniter_pressure)?;
        ensure_positive("max time", self.max_time)?;
        ensure_positive("attitude tolerance", self.attitude_tolerance)?;
        if !self.initial_elevation.is_finite() {
            return Err(SimError::config("initial elevation must be finite"));
        }
        if !(self.launch_angle > 0.0 && self.launch_angle <= 90.0) {
            return Err(SimError::config(format!(
                "launch angle must lie in (0, 90] degrees, got {}",
                self.launch_angle
            )));
        }
        if !(self.heading_angle >= 0.0 && self.heading_angle < 360.0) {
            return Err(SimError::config(format!(
                "heading angle must lie in [0, 360) degrees, got {}",
                self.heading_angle
            )));
        }
        Ok(())
    }

    /// Unit vector along the rail in ENU.
    pub fn rail_direction(&self) -> Vector3<f64> {
        let el = self.launch_angle.to_radians();
        let hd = self.heading_angle.to_radians();
        Vector3::new(el.cos() * hd.sin(), el.cos() * hd.cos(), el.sin())
    }
}

// ---------------------------------------------------------------------------
// Recorded trajectory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSnapshot {
    pub state: RigidBodyState,
    pub phase: FlightPhase,
    pub thrust: f64, // N
    pub mach: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightEnd {
    Landed,
    TimeLimit,
    /// A caller-supplied stop condition ended the run.
    Stopped,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Fixed-step 6DOF flight from the rail to the ground.
pub struct FlightSimulation {
    params: FlightParams,
    rail: Vector3<f64>,
    mass_model: MassModel,
    propulsion: Box<dyn Propulsion + Send>,
    atmosphere: Box<dyn AtmosphereModel + Send>,
    aerodynamics: Box<dyn AerodynamicsModel + Send>,
    recovery: Recovery,
    apogee: ApogeeDetector,
    state: RigidBodyState,
    phase: FlightPhase,
    history: Vec<FlightSnapshot>,
    events: Vec<FlightEvent>,
    end: Option<FlightEnd>,
    fault: Option<SimError>,
}

impl FlightSimulation {
    /// Flight of `rocket` with its own motor, the ISA 1976 atmosphere and
    /// Barrowman aerodynamics.
    pub fn new(rocket: &Rocket, params: FlightParams) -> Result<Self, SimError> {
        params.validate()?;
        rocket.validate()?;

        let atmosphere = Isa1976;
        let ambient = atmosphere.at(params.initial_elevation).pressure;
        let motor_params = BallisticsParams::new(params.d_t, params.igniter_pressure, ambient)?
            .with_max_time(params.max_time)?;
        let motor = InternalBallistics::new(rocket.motor.clone(), motor_params)?;
        let aero = RocketAerodynamics::new(&rocket.fuselage);
        info!(
            "{}: {:.2} kg at launch, static margin {:.3} m",
            rocket.name,
            rocket.launch_mass(),
            aero.static_margin()
        );

        Self::with_models(
            rocket,
            params,
            Box::new(motor),
            Box::new(atmosphere),
            Box::new(aero),
        )
    }

    /// Flight with caller-supplied propulsion, atmosphere and aerodynamics.
    /// The rocket provides mass properties and recovery events.
    pub fn with_models(
        rocket: &Rocket,
        params: FlightParams,
        propulsion: Box<dyn Propulsion + Send>,
        atmosphere: Box<dyn AtmosphereModel + Send>,
        aerodynamics: Box<dyn AerodynamicsModel + Send>,
    ) -> Result<Self, SimError> {
        params.validate()?;
        rocket.fuselage.validate()?;
        let mass_model = rocket.mass_model();
        let propellant = propulsion.output().propellant_mass;
        let rail = params.rail_direction();
        let quat = UnitQuaternion::rotation_between(&Vector3::z(), &rail)
            .unwrap_or_else(UnitQuaternion::identity);

        let state = RigidBodyState {
            time: 0.0,
            pos: Vector3::zeros(),
            vel: Vector3::zeros(),
            quat,
            omega: Vector3::zeros(),
            mass: mass_model.mass(propellant),
            inertia: mass_model.inertia(propellant),
        };
        let first = FlightSnapshot {
            state: state.clone(),
            phase: FlightPhase::OnRail,
            thrust: propulsion.output().thrust,
            mach: 0.0,
        };
        info!(
            "launch from {:.0} m: {:.1} m rail at {:.1} deg, heading {:.1} deg",
            params.initial_elevation, params.rail_length, params.launch_angle, params.heading_angle
        );

        Ok(Self {
            params,
            rail,
            mass_model,
            propulsion,
            atmosphere,
            aerodynamics,
            recovery: rocket.recovery.clone(),
            apogee: ApogeeDetector::default(),
            events: vec![FlightEvent::at(&state, FlightEventKind::Ignition)],
            state,
            phase: FlightPhase::OnRail,
            history: vec![first],
            end: None,
            fault: None,
        })
    }

    pub fn params(&self) -> &FlightParams {
        &self.params
    }

    pub fn state(&self) -> &RigidBodyState {
        &self.state
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn history(&self) -> &[FlightSnapshot] {
        &self.history
    }

    pub fn events(&self) -> &[FlightEvent] {
        &self.events
    }

    pub fn recovery(&self) -> &Recovery {
        &self.recovery
    }

    pub fn end(&self) -> Option<FlightEnd> {
        self.end
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    pub fn summary(&self) -> FlightSummary {
        FlightSummary::from_flight(&self.history, &self.events)
    }

    /// Run until landing or the time limit.
    pub fn run(&mut self) -> Result<&[FlightSnapshot], SimError> {
        self.run_until(|_| false)
    }

    /// Like [`run`](Self::run), with a stop condition checked after every
    /// step.
    pub fn run_until<F>(&mut self, mut stop: F) -> Result<&[FlightSnapshot], SimError>
    where
        F: FnMut(&FlightSnapshot) -> bool,
    {
        while !self.is_finished() {
            self.step()?;
            if !self.is_finished() && self.history.last().is_some_and(&mut stop) {
                self.end = Some(FlightEnd::Stopped);
                info!("flight stopped by caller at t={:.3} s", self.state.time);
            }
        }
        Ok(&self.history)
    }

    /// Advance one `d_t`. Finished flights are frozen; a fault is sticky and
    /// leaves the last valid state in place.
    pub fn step(&mut self) -> Result<(), SimError> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }
        if self.is_finished() {
            return Ok(());
        }
        self.advance().map_err(|err| {
            self.fault = Some(err.clone());
            err
        })
    }

    fn advance(&mut self) -> Result<(), SimError> {
        let dt = self.params.d_t;
        let elevation = self.params.initial_elevation;
        let prev = self.state.clone();

        // Thrust sampled at the start of the step, held over it.
        let thrust = self.propulsion.output().thrust;
        let atmosphere = self.atmosphere.as_ref();
        let aero = self.aerodynamics.as_ref();
        let deployed = self.recovery.deployed_parachutes();

        let mut next = if self.phase == FlightPhase::OnRail {
            let rail = self.rail;
            rk4_step(&prev, dt, |s| {
                let atm = atmosphere.at(elevation + s.pos.z);
                let loads = aero.forces(s, &atm, deployed);
                Ok(sixdof::on_rail(s, &rail, thrust, &loads, atm.gravity))
            })?
        } else {
            rk4_step(&prev, dt, |s| {
                let atm = atmosphere.at(elevation + s.pos.z);
                let loads = aero.forces(s, &atm, deployed);
                sixdof::free_flight(s, thrust, &loads, atm.gravity)
            })?
        };

        if self.phase == FlightPhase::OnRail && next.pos.dot(&self.rail) < 0.0 {
            next.pos = Vector3::zeros();
            next.vel = Vector3::zeros();
        }

        // A rejected step must leave the motor and recovery untouched.
        self.check_numerics(&next)?;
        self.check_ground(&next)?;

        let ambient = self.atmosphere.at(elevation + prev.pos.z).pressure;
        self.propulsion.advance(dt, ambient)?;
        let propellant = self.propulsion.output().propellant_mass;
        next.mass = self.mass_model.mass(propellant);
        next.inertia = self.mass_model.inertia(propellant);

        if self.phase.is_airborne() {
            for i in self.recovery.evaluate(next.time, next.pos.z, next.vel.z) {
                let parachute = self.recovery.events()[i].parachute;
                self.events.push(FlightEvent::at(
                    &next,
                    FlightEventKind::Deployment { event: i, parachute },
                ));
            }
            if let Some(kind) = self.apogee.check(&prev, &next) {
                info!("apogee at t={:.2} s: {:.1} m above the launch site", next.time, next.pos.z);
                self.events.push(FlightEvent::at(&next, kind));
            }
        }

        let phase = self.transition(&prev, &mut next)?;
        if phase != self.phase {
            debug!("t={:.3} s: {} -> {}", next.time, self.phase, phase);
            self.phase = phase;
        }

        let atm = self.atmosphere.at(elevation + next.pos.z);
        self.history.push(FlightSnapshot {
            state: next.clone(),
            phase,
            thrust: self.propulsion.output().thrust,
            mach: next.vel.norm() / atm.sound_speed,
        });
        self.state = next;

        if self.end.is_none() && self.state.time >= self.params.max_time - 1e-9 {
            warn!(
                "flight hit the {:.0} s time limit in phase '{}'",
                self.params.max_time, self.phase
            );
            self.end = Some(FlightEnd::TimeLimit);
        }
        Ok(())
    }

    fn check_numerics(&self, next: &RigidBodyState) -> Result<(), SimError> {
        if let Some((quantity, value)) = next.non_finite() {
            return Err(SimError::NumericalDivergence {
                time: next.time,
                quantity,
                value,
            });
        }
        let norm_error = (next.quat.quaternion().norm() - 1.0).abs();
        if norm_error > self.params.attitude_tolerance {
            return Err(SimError::NumericalDivergence {
                time: next.time,
                quantity: "attitude norm error",
                value: norm_error,
            });
        }
        let det = next.inertia.determinant();
        if !(det.is_finite() && det.abs() > 1e-12) {
            return Err(SimError::NumericalDivergence {
                time: next.time,
                quantity: "inertia determinant",
                value: det,
            });
        }
        Ok(())
    }

    /// Below the launch elevation is only legal on the way down.
    fn check_ground(&self, next: &RigidBodyState) -> Result<(), SimError> {
        let (z, vz) = (next.pos.z, next.vel.z);
        if self.phase.is_airborne() && z < 0.0 && vz >= 0.0 {
            return Err(SimError::SimulationFault {
                time: next.time,
                reason: format!(
                    "vehicle {:.3} m below ground while not descending (vz = {:.3} m/s)",
                    -z, vz
                ),
            });
        }
        Ok(())
    }

    /// Phase after this step. At most one transition per step; landing may
    /// rewrite `next` to the interpolated touchdown state.
    fn transition(
        &mut self,
        prev: &RigidBodyState,
        next: &mut RigidBodyState,
    ) -> Result<FlightPhase, SimError> {
        let vz = next.vel.z;
        match self.phase {
            FlightPhase::OnRail => {
                if next.pos.dot(&self.rail) >= self.params.rail_length {
                    let velocity = next.vel.norm();
                    info!("rail exit at t={:.3} s, {:.2} m/s", next.time, velocity);
                    self.recovery.arm();
                    self.events
                        .push(FlightEvent::at(next, FlightEventKind::RailExit { velocity }));
                    Ok(FlightPhase::PoweredFlight)
                } else {
                    Ok(FlightPhase::OnRail)
                }
            }
            FlightPhase::Landed => Ok(FlightPhase::Landed),
            airborne => {
                if next.pos.z <= 0.0 && vz < 0.0 {
                    *next = touchdown(prev, next);
                    let velocity = next.vel.norm();
                    info!("landed at t={:.2} s, {:.2} m/s", next.time, velocity);
                    self.events
                        .push(FlightEvent::at(next, FlightEventKind::Landing { velocity }));
                    self.end = Some(FlightEnd::Landed);
                    return Ok(FlightPhase::Landed);
                }
                let phase = match airborne {
                    FlightPhase::PoweredFlight if !self.propulsion.is_active() => {
                        info!("motor burnout at t={:.3} s, {:.1} m", next.time, next.pos.z);
                        self.events.push(FlightEvent::at(next, FlightEventKind::Burnout));
                        if vz > 0.0 {
                            FlightPhase::BallisticAscent
                        } else {
                            FlightPhase::BallisticDescent
                        }
                    }
                    FlightPhase::BallisticAscent | FlightPhase::BallisticDescent
                        if self.recovery.any_fired() =>
                    {
                        FlightPhase::RecoveryDeployed
                    }
                    FlightPhase::BallisticAscent if vz <= 0.0 => FlightPhase::BallisticDescent,
                    FlightPhase::BallisticDescent if vz > 0.0 => FlightPhase::BallisticAscent,
                    other => other,
                };
                Ok(phase)
            }
        }
    }
}

/// Interpolate linearly between the last two states to the instant the
/// vehicle reaches the launch elevation.
fn touchdown(prev: &RigidBodyState, next: &RigidBodyState) -> RigidBodyState {
    let drop = prev.pos.z - next.pos.z;
    let f = if drop > 0.0 {
        (prev.pos.z / drop).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let mut pos = prev.pos.lerp(&next.pos, f);
    pos.z = 0.0;
    RigidBodyState {
        time: prev.time + f * (next.time - prev.time),
        pos,
        vel: prev.vel.lerp(&next.vel, f),
        quat: prev
            .quat
            .try_slerp(&next.quat, f, 1e-9)
            .unwrap_or(next.quat),
        omega: prev.omega.lerp(&next.omega, f),
        mass: next.mass,
        inertia: next.inertia,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
