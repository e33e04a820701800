use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::sim::{CombustionState, FlightSnapshot};

/// Write the combustion history, one row per snapshot, columns named after
/// the [`CombustionState`] fields (SI units).
pub fn write_combustion<W: Write>(writer: W, history: &[CombustionState]) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for s in history {
        out.serialize(s)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_combustion_file(path: impl AsRef<Path>, history: &[CombustionState]) -> csv::Result<()> {
    write_combustion(std::fs::File::create(path)?, history)
}

#[derive(Debug, Serialize)]
struct FlightRow {
    time: f64,
    phase: &'static str,
    pos_x: f64,
    pos_y: f64,
    pos_z: f64,
    vel_x: f64,
    vel_y: f64,
    vel_z: f64,
    quat_w: f64,
    quat_x: f64,
    quat_y: f64,
    quat_z: f64,
    omega_x: f64,
    omega_y: f64,
    omega_z: f64,
    mass: f64,
    thrust: f64,
    mach: f64,
    pitch_deg: f64,
    alpha_deg: f64,
}

impl From<&FlightSnapshot> for FlightRow {
    fn from(snap: &FlightSnapshot) -> Self {
        let s = &snap.state;
        let q = s.quat.quaternion();
        Self {
            time: s.time,
            phase: snap.phase.label(),
            pos_x: s.pos.x,
            pos_y: s.pos.y,
            pos_z: s.pos.z,
            vel_x: s.vel.x,
            vel_y: s.vel.y,
            vel_z: s.vel.z,
            quat_w: q.w,
            quat_x: q.i,
            quat_y: q.j,
            quat_z: q.k,
            omega_x: s.omega.x,
            omega_y: s.omega.y,
            omega_z: s.omega.z,
            mass: s.mass,
            thrust: snap.thrust,
            mach: snap.mach,
            pitch_deg: s.pitch().to_degrees(),
            alpha_deg: s.alpha().to_degrees(),
        }
    }
}

/// Write the flight history. Position is ENU from the rail foot; the
/// quaternion rotates body to world.
pub fn write_flight<W: Write>(writer: W, history: &[FlightSnapshot]) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for snap in history {
        out.serialize(FlightRow::from(snap))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_flight_file(path: impl AsRef<Path>, history: &[FlightSnapshot]) -> csv::Result<()> {
    write_flight(std::fs::File::create(path)?, history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::RigidBodyState;
    use crate::sim::FlightPhase;
    use nalgebra::{Matrix3, UnitQuaternion, Vector3};

    fn snapshot(time: f64, z: f64) -> FlightSnapshot {
        FlightSnapshot {
            state: RigidBodyState {
                time,
                pos: Vector3::new(0.0, 0.0, z),
                vel: Vector3::new(0.0, 0.0, 50.0),
                quat: UnitQuaternion::identity(),
                omega: Vector3::zeros(),
                mass: 60.0,
                inertia: Matrix3::identity(),
            },
            phase: FlightPhase::PoweredFlight,
            thrust: 5000.0,
            mach: 0.15,
        }
    }

    #[test]
    fn flight_csv_has_header_and_rows() {
        let mut buf = Vec::new();
        write_flight(&mut buf, &[snapshot(0.0, 0.0), snapshot(0.005, 0.25)]).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,phase,pos_x"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[1].contains("powered flight"));
    }

    #[test]
    fn combustion_csv_round_trips_through_a_file() {
        let state = CombustionState {
            time: 0.0,
            chamber_pressure: 1e6,
            burned_web: 0.0,
            propellant_mass: 20.0,
            mass_generation_rate: 2.0,
            nozzle_mass_flow: 1.5,
            burn_area: 0.3,
            burn_rate: 5e-3,
            free_volume: 1e-3,
            exit_pressure: 9e4,
            thrust: 2500.0,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motor.csv");
        write_combustion_file(&path, &[state]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[1], "chamber_pressure");
        let row = reader.records().next().unwrap().unwrap();
        let thrust: f64 = row[headers.len() - 1].parse().unwrap();
        assert_eq!(thrust, 2500.0);
    }
}
