//! Run summaries derived from recorded histories.

use std::fmt;

use serde::Serialize;

use crate::physics::G0;
use crate::sim::{CombustionState, FlightEvent, FlightEventKind, FlightSnapshot};

// ---------------------------------------------------------------------------
// Motor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BallisticsSummary {
    pub propellant_mass: f64,    // kg
    /// Loaded motor at ignition, kg. Zero when built from a bare history.
    pub motor_mass: f64,
    /// Ideal c* of the propellant, m/s. Zero when built from a bare history.
    pub characteristic_velocity: f64,
    pub peak_pressure: f64,      // Pa
    pub peak_pressure_time: f64, // s
    /// Time-averaged over the thrust time.
    pub mean_pressure: f64,
    pub total_impulse: f64,    // N·s
    pub specific_impulse: f64, // s
    /// Time at which the propellant ran out, if it did.
    pub burn_time: Option<f64>,
    pub thrust_time: f64,
    pub peak_thrust: f64,
    pub mean_thrust: f64,
}

impl BallisticsSummary {
    pub fn from_history(history: &[CombustionState]) -> Self {
        let Some(first) = history.first() else {
            return Self::default();
        };

        let mut summary = Self {
            propellant_mass: first.propellant_mass,
            ..Self::default()
        };
        let mut pressure_integral = 0.0;
        let mut thrust_start = None;
        let mut thrust_end = first.time;

        for s in history {
            if s.chamber_pressure > summary.peak_pressure {
                summary.peak_pressure = s.chamber_pressure;
                summary.peak_pressure_time = s.time;
            }
            summary.peak_thrust = summary.peak_thrust.max(s.thrust);
            if s.thrust > 0.0 {
                thrust_start.get_or_insert(s.time);
                thrust_end = s.time;
            }
            if summary.burn_time.is_none() && s.propellant_mass <= 0.0 {
                summary.burn_time = Some(s.time);
            }
        }

        // Trapezoidal integrals.
        for w in history.windows(2) {
            let dt = w[1].time - w[0].time;
            summary.total_impulse += 0.5 * (w[0].thrust + w[1].thrust) * dt;
            if w[0].thrust > 0.0 || w[1].thrust > 0.0 {
                pressure_integral += 0.5 * (w[0].chamber_pressure + w[1].chamber_pressure) * dt;
            }
        }

        summary.thrust_time = thrust_start.map_or(0.0, |t0| thrust_end - t0);
        if summary.thrust_time > 0.0 {
            summary.mean_thrust = summary.total_impulse / summary.thrust_time;
            summary.mean_pressure = pressure_integral / summary.thrust_time;
        }
        if summary.propellant_mass > 0.0 {
            summary.specific_impulse = summary.total_impulse / (summary.propellant_mass * G0);
        }
        summary
    }
}

impl fmt::Display for BallisticsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Motor Performance")?;
        writeln!(f, "  {}", "─".repeat(66))?;
        writeln!(
            f,
            "  Propellant:    {:>8.3} kg    Isp:          {:>8.1} s",
            self.propellant_mass, self.specific_impulse
        )?;
        writeln!(
            f,
            "  Motor mass:    {:>8.3} kg    c*:           {:>8.1} m/s",
            self.motor_mass, self.characteristic_velocity
        )?;
        writeln!(
            f,
            "  Total impulse: {:>8.0} N·s   Thrust time:  {:>8.2} s",
            self.total_impulse, self.thrust_time
        )?;
        writeln!(
            f,
            "  Peak thrust:   {:>8.0} N     Mean thrust:  {:>8.0} N",
            self.peak_thrust, self.mean_thrust
        )?;
        writeln!(
            f,
            "  Peak pressure: {:>8.3} MPa at t={:.2} s, mean {:.3} MPa",
            self.peak_pressure * 1e-6,
            self.peak_pressure_time,
            self.mean_pressure * 1e-6
        )?;
        match self.burn_time {
            Some(t) => writeln!(f, "  Burn time:     {t:>8.2} s"),
            None => writeln!(f, "  Burn time:     propellant not exhausted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Flight
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deployment {
    pub event: usize,
    pub parachute: &'static str,
    pub diameter: f64,
    pub time: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightSummary {
    pub apogee_altitude: f64, // m above the launch site
    pub apogee_time: f64,
    pub max_velocity: f64,
    pub max_mach: f64,
    pub max_acceleration: f64, // m/s², finite differences of the history
    pub rail_exit_velocity: Option<f64>,
    pub burnout_time: Option<f64>,
    pub landing_time: Option<f64>,
    pub landing_velocity: Option<f64>,
    pub flight_time: f64,
    pub deployments: Vec<Deployment>,
}

impl FlightSummary {
    pub fn from_flight(history: &[FlightSnapshot], events: &[FlightEvent]) -> Self {
        let mut summary = Self::default();

        for s in history {
            if s.state.pos.z > summary.apogee_altitude {
                summary.apogee_altitude = s.state.pos.z;
                summary.apogee_time = s.state.time;
            }
            summary.max_velocity = summary.max_velocity.max(s.state.vel.norm());
            summary.max_mach = summary.max_mach.max(s.mach);
        }
        summary.max_acceleration = history
            .windows(2)
            .map(|w| {
                let dt = w[1].state.time - w[0].state.time;
                if dt > 0.0 {
                    (w[1].state.vel - w[0].state.vel).norm() / dt
                } else {
                    0.0
                }
            })
            .fold(0.0_f64, f64::max);
        summary.flight_time = history.last().map_or(0.0, |s| s.state.time);

        for e in events {
            match &e.kind {
                FlightEventKind::RailExit { velocity } => {
                    summary.rail_exit_velocity = Some(*velocity)
                }
                FlightEventKind::Burnout => summary.burnout_time = Some(e.time),
                FlightEventKind::Landing { velocity } => {
                    summary.landing_time = Some(e.time);
                    summary.landing_velocity = Some(*velocity);
                }
                FlightEventKind::Deployment { event, parachute } => {
                    summary.deployments.push(Deployment {
                        event: *event,
                        parachute: parachute.label(),
                        diameter: parachute.diameter(),
                        time: e.time,
                        altitude: e.altitude,
                    })
                }
                FlightEventKind::Ignition | FlightEventKind::Apogee { .. } => {}
            }
        }
        summary
    }
}

fn optional(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2} {unit}"))
}

impl fmt::Display for FlightSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Flight Performance")?;
        writeln!(f, "  {}", "─".repeat(66))?;
        writeln!(
            f,
            "  Apogee:        {:>8.1} m     at t={:.2} s",
            self.apogee_altitude, self.apogee_time
        )?;
        writeln!(
            f,
            "  Max velocity:  {:>8.1} m/s   (Mach {:.3})",
            self.max_velocity, self.max_mach
        )?;
        writeln!(
            f,
            "  Max accel:     {:>8.1} m/s^2 ({:.1} g)",
            self.max_acceleration,
            self.max_acceleration / G0
        )?;
        writeln!(f, "  Rail exit:     {}", optional(self.rail_exit_velocity, "m/s"))?;
        writeln!(f, "  Burnout:       {}", optional(self.burnout_time, "s"))?;
        writeln!(
            f,
            "  Landing:       {} at {}",
            optional(self.landing_velocity, "m/s"),
            optional(self.landing_time, "s")
        )?;
        writeln!(f, "  Flight time:   {:>8.2} s", self.flight_time)?;
        for d in &self.deployments {
            writeln!(
                f,
                "  Deployment {}:  {} {:.2} m at t={:.2} s, {:.1} m",
                d.event, d.parachute, d.diameter, d.time, d.altitude
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::RigidBodyState;
    use crate::recovery::Parachute;
    use crate::sim::FlightPhase;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, UnitQuaternion, Vector3};

    fn combustion(time: f64, pressure: f64, thrust: f64, propellant_mass: f64) -> CombustionState {
        CombustionState {
            time,
            chamber_pressure: pressure,
            burned_web: 0.0,
            propellant_mass,
            mass_generation_rate: 0.0,
            nozzle_mass_flow: 0.0,
            burn_area: 0.0,
            burn_rate: 0.0,
            free_volume: 0.0,
            exit_pressure: 0.0,
            thrust,
        }
    }

    fn snapshot(time: f64, z: f64, vz: f64) -> FlightSnapshot {
        FlightSnapshot {
            state: RigidBodyState {
                time,
                pos: Vector3::new(0.0, 0.0, z),
                vel: Vector3::new(0.0, 0.0, vz),
                quat: UnitQuaternion::identity(),
                omega: Vector3::zeros(),
                mass: 10.0,
                inertia: Matrix3::identity(),
            },
            phase: FlightPhase::BallisticAscent,
            thrust: 0.0,
            mach: vz.abs() / 340.0,
        }
    }

    #[test]
    fn square_thrust_profile() {
        // 1000 N for 2 s from 1 kg of propellant.
        let history = vec![
            combustion(0.0, 2e6, 1000.0, 1.0),
            combustion(1.0, 3e6, 1000.0, 0.5),
            combustion(2.0, 2e6, 1000.0, 0.0),
            combustion(3.0, 1e5, 0.0, 0.0),
        ];
        let s = BallisticsSummary::from_history(&history);
        assert_relative_eq!(s.total_impulse, 2500.0);
        assert_relative_eq!(s.thrust_time, 2.0);
        assert_relative_eq!(s.mean_thrust, 1250.0);
        assert_relative_eq!(s.specific_impulse, 2500.0 / G0);
        assert_eq!(s.burn_time, Some(2.0));
        assert_eq!(s.peak_pressure, 3e6);
        assert_eq!(s.peak_pressure_time, 1.0);
    }

    #[test]
    fn empty_history_is_all_zero() {
        assert_eq!(BallisticsSummary::from_history(&[]), BallisticsSummary::default());
    }

    #[test]
    fn flight_summary_reads_events() {
        let history = vec![
            snapshot(0.0, 0.0, 0.0),
            snapshot(1.0, 50.0, 100.0),
            snapshot(2.0, 120.0, 0.0),
            snapshot(3.0, 0.0, -20.0),
        ];
        let chute = Parachute::Hemispherical { diameter: 1.25 };
        let events = vec![
            FlightEvent {
                time: 0.2,
                altitude: 5.0,
                kind: FlightEventKind::RailExit { velocity: 25.0 },
            },
            FlightEvent {
                time: 2.0,
                altitude: 120.0,
                kind: FlightEventKind::Deployment {
                    event: 0,
                    parachute: chute,
                },
            },
            FlightEvent {
                time: 3.0,
                altitude: 0.0,
                kind: FlightEventKind::Landing { velocity: 20.0 },
            },
        ];
        let s = FlightSummary::from_flight(&history, &events);
        assert_eq!(s.apogee_altitude, 120.0);
        assert_eq!(s.apogee_time, 2.0);
        assert_eq!(s.max_velocity, 100.0);
        assert_relative_eq!(s.max_acceleration, 100.0);
        assert_eq!(s.rail_exit_velocity, Some(25.0));
        assert_eq!(s.burnout_time, None);
        assert_eq!(s.landing_velocity, Some(20.0));
        assert_eq!(s.deployments.len(), 1);
        assert_eq!(s.deployments[0].parachute, "hemispherical");
        assert!(s.to_string().contains("Apogee"));
    }
}
