//! TOML scenario files.
//!
//! A scenario always describes a motor and its static-test ballistics
//! parameters. The `[flight]`, `[fuselage]` and `[[recovery]]` sections are
//! only needed for a flight.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::error::SimError;
use crate::propulsion::{propellant, Chamber, Grain, GrainSegment, MotorStructure, Nozzle, SolidMotor};
use crate::recovery::{Parachute, Recovery, Trigger};
use crate::sim::{BallisticsParams, FlightParams};
use crate::vehicle::{Fuselage, Rocket, RocketBuilder};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scenario has no [{0}] section")]
    MissingSection(&'static str),

    #[error(transparent)]
    Model(#[from] SimError),
}

// ---------------------------------------------------------------------------
// File layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub motor: MotorConfig,
    pub ballistics: BallisticsConfig,
    #[serde(default)]
    pub flight: Option<FlightConfig>,
    #[serde(default)]
    pub fuselage: Option<Fuselage>,
    #[serde(default)]
    pub recovery: Vec<RecoveryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotorConfig {
    /// Preset propellant name, e.g. "KNSB-NAKKA".
    pub propellant: String,
    /// Measured density replacing the preset's, kg/m^3.
    #[serde(default)]
    pub propellant_density: Option<f64>,
    pub dry_mass: f64,
    pub grain: Vec<GrainSegment>,
    pub nozzle: Nozzle,
    pub chamber: Chamber,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BallisticsConfig {
    pub d_t: f64,
    pub igniter_pressure: f64,
    pub external_pressure: f64,
    #[serde(default)]
    pub min_pressure: Option<f64>,
    #[serde(default)]
    pub tail_off_grace: Option<f64>,
    #[serde(default)]
    pub max_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlightConfig {
    pub d_t: f64,
    #[serde(default)]
    pub initial_elevation: f64,
    pub rail_length: f64,
    pub launch_angle: f64,
    #[serde(default)]
    pub heading_angle: f64,
    pub igniter_pressure: f64,
    #[serde(default)]
    pub max_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecoveryConfig {
    pub trigger: Trigger,
    pub parachute: Parachute,
}

// ---------------------------------------------------------------------------
// Loading and model construction
// ---------------------------------------------------------------------------

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn build_motor(&self) -> Result<SolidMotor, ConfigError> {
        let m = &self.motor;
        let mut prop = propellant::by_name(&m.propellant)?;
        if let Some(density) = m.propellant_density {
            prop = prop.with_density(density)?;
        }
        let mut grain = Grain::new();
        for segment in &m.grain {
            grain.add_segment(segment.clone())?;
        }
        let structure = MotorStructure::new(m.dry_mass, m.nozzle.clone(), m.chamber.clone())?;
        Ok(SolidMotor::new(grain, prop, structure)?)
    }

    pub fn ballistics_params(&self) -> Result<BallisticsParams, ConfigError> {
        let b = &self.ballistics;
        let mut params = BallisticsParams::new(b.d_t, b.igniter_pressure, b.external_pressure)?;
        if let Some(p) = b.min_pressure {
            params = params.with_min_pressure(p)?;
        }
        if let Some(t) = b.tail_off_grace {
            params = params.with_tail_off_grace(t)?;
        }
        if let Some(t) = b.max_time {
            params = params.with_max_time(t)?;
        }
        Ok(params)
    }

    pub fn flight_params(&self) -> Result<FlightParams, ConfigError> {
        let f = self
            .flight
            .as_ref()
            .ok_or(ConfigError::MissingSection("flight"))?;
        let mut params = FlightParams::new(
            f.d_t,
            f.initial_elevation,
            f.rail_length,
            f.launch_angle,
            f.heading_angle,
            f.igniter_pressure,
        )?;
        if let Some(t) = f.max_time {
            params = params.with_max_time(t)?;
        }
        Ok(params)
    }

    pub fn build_rocket(&self) -> Result<Rocket, ConfigError> {
        let fuselage = self
            .fuselage
            .clone()
            .ok_or(ConfigError::MissingSection("fuselage"))?;
        let mut recovery = Recovery::new();
        for r in &self.recovery {
            recovery.add_event(r.trigger, r.parachute)?;
        }
        Ok(RocketBuilder::new(self.name.clone(), self.build_motor()?, fuselage)
            .recovery(recovery)
            .build()?)
    }
}
