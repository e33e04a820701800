use std::env;

use anyhow::{anyhow, Result};
use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use srm_sim::config::Scenario;
use srm_sim::report::FlightSummary;
use srm_sim::sim::{CombustionState, FlightSimulation, FlightSnapshot, InternalBallistics};

fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "warn");
    }
    pretty_env_logger::init();

    let path = env::args().nth(1).unwrap_or_else(|| "scenarios/concorde.toml".into());
    let scenario = Scenario::load(&path)?;

    let mut motor = InternalBallistics::new(scenario.build_motor()?, scenario.ballistics_params()?)?;
    motor.run()?;

    let (trajectory, summary) = if scenario.flight.is_some() {
        let mut sim = FlightSimulation::new(&scenario.build_rocket()?, scenario.flight_params()?)?;
        sim.run()?;
        let summary = FlightSummary::from_flight(sim.history(), sim.events());
        (sim.history().to_vec(), Some(summary))
    } else {
        (Vec::new(), None)
    };

    let app = SimViz {
        name: scenario.name,
        combustion: motor.history().to_vec(),
        trajectory,
        summary,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("SRM Simulator", options, Box::new(|_| Ok(Box::new(app))))
        .map_err(|e| anyhow!("viewer failed: {e}"))
}

struct SimViz {
    name: String,
    combustion: Vec<CombustionState>,
    trajectory: Vec<FlightSnapshot>,
    summary: Option<FlightSummary>,
}

fn time_plot(ui: &mut egui::Ui, id: &str, title: &str, size: egui::Vec2, points: PlotPoints) {
    ui.vertical(|ui| {
        ui.label(title);
        Plot::new(id)
            .width(size.x)
            .height(size.y)
            .x_axis_label("Time (s)")
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(title, points));
            });
    });
}

impl eframe::App for SimViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let step = (self.trajectory.len() / 2000).max(1);
        let sampled: Vec<&FlightSnapshot> = self.trajectory.iter().step_by(step).collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Scenario: {}", self.name));
            let impulse: f64 = self
                .combustion
                .windows(2)
                .map(|w| 0.5 * (w[0].thrust + w[1].thrust) * (w[1].time - w[0].time))
                .sum();
            match &self.summary {
                Some(s) => ui.label(format!(
                    "Impulse: {:.0} N·s  |  Apogee: {:.0} m  |  Max speed: Mach {:.2}  |  Flight: {:.0} s",
                    impulse, s.apogee_altitude, s.max_mach, s.flight_time
                )),
                None => ui.label(format!("Impulse: {impulse:.0} N·s  |  static firing only")),
            };
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let size = egui::vec2(available.x / 2.0 - 8.0, available.y / 2.0 - 8.0);

            ui.horizontal(|ui| {
                let pressure: PlotPoints = self
                    .combustion
                    .iter()
                    .map(|s| [s.time, s.chamber_pressure * 1e-6])
                    .collect();
                time_plot(ui, "pressure", "Chamber pressure (MPa)", size, pressure);

                let thrust: PlotPoints = self
                    .combustion
                    .iter()
                    .map(|s| [s.time, s.thrust])
                    .collect();
                time_plot(ui, "thrust", "Thrust (N)", size, thrust);
            });

            ui.horizontal(|ui| {
                let altitude: PlotPoints = sampled
                    .iter()
                    .map(|s| [s.state.time, s.state.pos.z])
                    .collect();
                time_plot(ui, "altitude", "Altitude (m)", size, altitude);

                let speed: PlotPoints = sampled
                    .iter()
                    .map(|s| [s.state.time, s.state.vel.norm()])
                    .collect();
                time_plot(ui, "speed", "Speed (m/s)", size, speed);
            });
        });
    }
}
