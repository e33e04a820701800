pub mod aerodynamics;
pub mod atmosphere;
pub mod gravity;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665;
pub const EARTH_RADIUS: f64 = 6_371_000.0;

pub use aerodynamics::{AeroLoads, AerodynamicsModel, RocketAerodynamics};
pub use atmosphere::{isa, AtmosphereModel, AtmosphereState, Isa1976};
