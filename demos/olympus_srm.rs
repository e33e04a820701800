use srm_sim::io::csv;
use srm_sim::sim::{BallisticsParams, InternalBallistics};
use srm_sim::vehicle::presets;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let motor = presets::olympus_motor()?;
    let params = BallisticsParams::new(0.01, 1.5e6, 0.1e6)?;

    println!("Firing Olympus ({:.2} kg of propellant) ...", motor.initial_propellant_mass());
    let mut sim = InternalBallistics::new(motor, params)?;
    sim.run()?;

    let summary = sim.summary();
    println!("{summary}");

    csv::write_combustion_file("olympus_combustion.csv", sim.history())?;
    println!("Exported: olympus_combustion.csv");
    Ok(())
}
