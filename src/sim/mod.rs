pub mod ballistics;
pub mod event;
pub mod flight;
pub mod integrator;
pub mod phase;

pub use ballistics::{
    BallisticsParams, CombustionState, CombustionStatus, EndReason, InternalBallistics,
    Propulsion, PropulsionOutput,
};
pub use event::{ApogeeDetector, EventDetector, FlightEvent, FlightEventKind};
pub use flight::{FlightEnd, FlightParams, FlightSimulation, FlightSnapshot};
pub use integrator::{rk4_scalar, rk4_step};
pub use phase::FlightPhase;
