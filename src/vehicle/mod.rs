pub mod fuselage;
pub mod presets;
pub mod rocket;

pub use fuselage::{BodySegment, Fuselage, Inertia, NoseCone, Stability, TrapezoidalFins};
pub use rocket::{Rocket, RocketBuilder};
