pub mod mass;
pub mod sixdof;
pub mod state;

pub use mass::MassModel;
pub use state::{Deriv, RigidBodyState};
