pub mod grain;
pub mod motor;
pub mod nozzle_flow;
pub mod propellant;
pub mod structure;

pub use grain::{BatesSegment, EndBurnerSegment, Grain, GrainSegment};
pub use motor::{NozzleOutput, SolidMotor};
pub use propellant::{BurnRateLaw, BurnRateRange, SolidPropellant};
pub use structure::{Chamber, MotorStructure, Nozzle};
