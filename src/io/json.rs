use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::report::{BallisticsSummary, FlightSummary};
use crate::sim::FlightEvent;

#[derive(Debug, Serialize)]
struct MotorReport<'a> {
    scenario: &'a str,
    motor: &'a BallisticsSummary,
}

#[derive(Debug, Serialize)]
struct FlightReport<'a> {
    scenario: &'a str,
    motor: &'a BallisticsSummary,
    flight: &'a FlightSummary,
    events: &'a [FlightEvent],
}

/// Pretty-printed JSON summary of a static motor run.
pub fn write_motor_summary<W: Write>(
    writer: W,
    scenario: &str,
    motor: &BallisticsSummary,
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &MotorReport { scenario, motor })
}

/// Pretty-printed JSON summary of a flight, including its event log.
pub fn write_flight_summary<W: Write>(
    writer: W,
    scenario: &str,
    motor: &BallisticsSummary,
    flight: &FlightSummary,
    events: &[FlightEvent],
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(
        writer,
        &FlightReport {
            scenario,
            motor,
            flight,
            events,
        },
    )
}

pub fn write_motor_summary_file(
    path: impl AsRef<Path>,
    scenario: &str,
    motor: &BallisticsSummary,
) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    Ok(write_motor_summary(io::BufWriter::new(file), scenario, motor)?)
}

pub fn write_flight_summary_file(
    path: impl AsRef<Path>,
    scenario: &str,
    motor: &BallisticsSummary,
    flight: &FlightSummary,
    events: &[FlightEvent],
) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    Ok(write_flight_summary(
        io::BufWriter::new(file),
        scenario,
        motor,
        flight,
        events,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::FlightEventKind;

    #[test]
    fn motor_summary_is_valid_json() {
        let summary = BallisticsSummary {
            propellant_mass: 20.0,
            total_impulse: 25_000.0,
            burn_time: Some(4.2),
            ..Default::default()
        };
        let mut buf = Vec::new();
        write_motor_summary(&mut buf, "Olympus", &summary).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["scenario"], "Olympus");
        assert_eq!(value["motor"]["total_impulse"], 25_000.0);
        assert_eq!(value["motor"]["burn_time"], 4.2);
    }

    #[test]
    fn flight_summary_file_lists_events() {
        let events = vec![FlightEvent {
            time: 0.4,
            altitude: 5.0,
            kind: FlightEventKind::RailExit { velocity: 27.5 },
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flight.json");
        write_flight_summary_file(
            &path,
            "Concorde",
            &BallisticsSummary::default(),
            &FlightSummary::default(),
            &events,
        )
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["events"][0]["kind"]["RailExit"]["velocity"], 27.5);
        assert!(value["flight"]["landing_time"].is_null());
    }
}
