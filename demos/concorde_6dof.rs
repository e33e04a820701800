use srm_sim::io::{csv, json};
use srm_sim::sim::{BallisticsParams, FlightParams, FlightSimulation, InternalBallistics};
use srm_sim::vehicle::presets;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let rocket = presets::concorde()?;
    let params = FlightParams::new(0.001, 636.0, 5.0, 90.0, 85.0, 1e6)?;

    // Static firing at the launch site pressure, for the motor summary.
    let mut motor = InternalBallistics::new(
        rocket.motor.clone(),
        BallisticsParams::new(0.001, 1e6, srm_sim::physics::isa(636.0).pressure)?,
    )?;
    motor.run()?;
    let motor_summary = motor.summary();

    println!("Simulating {} ...", rocket.name);
    let mut sim = FlightSimulation::new(&rocket, params)?;
    sim.run()?;

    let summary = sim.summary();
    println!("{motor_summary}");
    println!("{summary}");
    for e in sim.events() {
        println!("  t={:>7.3} s  {:>8.1} m  {:?}", e.time, e.altitude, e.kind);
    }

    csv::write_flight_file("concorde_trajectory.csv", sim.history())?;
    json::write_flight_summary_file(
        "concorde_summary.json",
        &rocket.name,
        &motor_summary,
        &summary,
        sim.events(),
    )?;
    println!("Exported: concorde_trajectory.csv, concorde_summary.json");
    Ok(())
}
