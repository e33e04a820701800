use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use srm_sim::config::Scenario;
use srm_sim::io::{csv, json};
use srm_sim::report::{BallisticsSummary, FlightSummary};
use srm_sim::sim::{FlightSimulation, InternalBallistics};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Solid rocket motor internal ballistics and 6DOF flight simulator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Static motor firing from the scenario's [motor] and [ballistics]
    Motor(RunArgs),
    /// Full flight from the rail to landing
    Flight(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Scenario TOML file
    scenario: PathBuf,

    /// Write the time history as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the summary as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    match Cli::parse().command {
        Command::Motor(args) => motor(&args),
        Command::Flight(args) => flight(&args),
    }
}

fn load(args: &RunArgs) -> Result<Scenario> {
    Scenario::load(&args.scenario)
        .with_context(|| format!("loading {}", args.scenario.display()))
}

fn static_firing(scenario: &Scenario) -> Result<(InternalBallistics, BallisticsSummary)> {
    let mut sim = InternalBallistics::new(scenario.build_motor()?, scenario.ballistics_params()?)?;
    sim.run()?;
    let summary = sim.summary();
    Ok((sim, summary))
}

fn banner(title: &str, name: &str) {
    println!();
    println!("{}", "=".repeat(70));
    println!("  {title} — {name}");
    println!("{}", "=".repeat(70));
    println!();
}

fn motor(args: &RunArgs) -> Result<()> {
    let scenario = load(args)?;
    let (sim, summary) = static_firing(&scenario)?;

    banner("STATIC MOTOR FIRING", &scenario.name);
    println!("{summary}");
    println!(
        "  Simulation: {} steps, dt={} s, {:?}",
        sim.history().len(),
        sim.params().d_t,
        sim.status()
    );
    println!();

    if let Some(path) = &args.csv {
        csv::write_combustion_file(path, sim.history())
            .with_context(|| format!("writing {}", path.display()))?;
        info!("combustion history written to {}", path.display());
    }
    if let Some(path) = &args.json {
        json::write_motor_summary_file(path, &scenario.name, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("summary written to {}", path.display());
    }
    Ok(())
}

fn flight(args: &RunArgs) -> Result<()> {
    let scenario = load(args)?;
    let rocket = scenario.build_rocket()?;
    let (_, motor_summary) = static_firing(&scenario)?;

    let mut sim = FlightSimulation::new(&rocket, scenario.flight_params()?)?;
    sim.run()?;
    let summary = FlightSummary::from_flight(sim.history(), sim.events());

    banner("ROCKET FLIGHT SIMULATION", &scenario.name);
    println!("{motor_summary}");
    println!("{summary}");
    println!(
        "  Simulation: {} steps, dt={} s, ended {:?} in phase '{}'",
        sim.history().len(),
        sim.params().d_t,
        sim.end(),
        sim.phase()
    );
    println!();

    if let Some(path) = &args.csv {
        csv::write_flight_file(path, sim.history())
            .with_context(|| format!("writing {}", path.display()))?;
        info!("flight history written to {}", path.display());
    }
    if let Some(path) = &args.json {
        json::write_flight_summary_file(path, &scenario.name, &motor_summary, &summary, sim.events())
            .with_context(|| format!("writing {}", path.display()))?;
        info!("summary written to {}", path.display());
    }
    Ok(())
}
