pub mod config;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod physics;
pub mod propulsion;
pub mod recovery;
pub mod report;
pub mod sim;
pub mod vehicle;

pub use error::SimError;

// Everything a driver needs to build and run a motor or a flight.
pub mod prelude {
    pub use crate::config::{ConfigError, Scenario};
    pub use crate::error::SimError;
    pub use crate::propulsion::{Grain, GrainSegment, MotorStructure, SolidMotor, SolidPropellant};
    pub use crate::recovery::{Parachute, Recovery, Trigger};
    pub use crate::report::{BallisticsSummary, FlightSummary};
    pub use crate::sim::{
        BallisticsParams, FlightParams, FlightPhase, FlightSimulation, InternalBallistics,
        Propulsion,
    };
    pub use crate::vehicle::{presets, Fuselage, Rocket, RocketBuilder};
}
