//! Reference vehicles: the Olympus static-test motor and the Concorde
//! sounding rocket.

use crate::error::SimError;
use crate::propulsion::propellant::knsb_nakka;
use crate::propulsion::{
    BatesSegment, Chamber, Grain, GrainSegment, MotorStructure, Nozzle, SolidMotor,
};
use crate::recovery::{Parachute, Recovery, Trigger};

use super::fuselage::{BodySegment, Fuselage, Inertia, NoseCone, TrapezoidalFins};
use super::rocket::{Rocket, RocketBuilder};

/// Steel conical nozzle shared by both motors.
fn nozzle_37mm() -> Result<Nozzle, SimError> {
    Nozzle::new(37e-3, 12.0, 45.0, 8.0)
}

/// Casing with a 2 mm EPDM liner, 10 mm longer than the grain.
fn lined_chamber(grain: &Grain) -> Result<Chamber, SimError> {
    Chamber::new(128.2e-3, grain.total_length() + 10e-3, 2e-3)
}

/// Olympus: seven measured KNSB BATES segments, measured density.
pub fn olympus_motor() -> Result<SolidMotor, SimError> {
    // (outer, core, length, spacing) in mm, as loaded
    const SEGMENTS: [(f64, f64, f64, f64); 7] = [
        (114.27, 46.44, 201.03, 10.18),
        (114.56, 45.15, 194.05, 18.24),
        (114.70, 45.58, 202.78, 11.68),
        (114.72, 45.34, 194.36, 11.55),
        (114.49, 60.60, 204.18, 11.53),
        (114.77, 60.49, 198.72, 10.43),
        (114.74, 60.64, 193.32, 9.92),
    ];

    let mut grain = Grain::new();
    for (outer, core, length, spacing) in SEGMENTS {
        grain.add_segment(GrainSegment::Bates(BatesSegment::new(
            outer * 1e-3,
            core * 1e-3,
            length * 1e-3,
            spacing * 1e-3,
        )?))?;
    }

    let propellant = knsb_nakka().with_density(1656.01)?;
    let structure = MotorStructure::new(21.013, nozzle_37mm()?, lined_chamber(&grain)?)?;
    SolidMotor::new(grain, propellant, structure)
}

/// Concorde's motor: four 45 mm-core and three 60 mm-core BATES segments.
pub fn concorde_motor() -> Result<SolidMotor, SimError> {
    let core_45 = BatesSegment::new(115e-3, 45e-3, 200e-3, 10e-3)?;
    let core_60 = BatesSegment::new(115e-3, 60e-3, 200e-3, 10e-3)?;

    let mut grain = Grain::new();
    for _ in 0..4 {
        grain.add_segment(GrainSegment::Bates(core_45.clone()))?;
    }
    for _ in 0..3 {
        grain.add_segment(GrainSegment::Bates(core_60.clone()))?;
    }

    let structure = MotorStructure::new(21.013, nozzle_37mm()?, lined_chamber(&grain)?)?;
    SolidMotor::new(grain, knsb_nakka(), structure)
}

pub fn concorde_fuselage() -> Result<Fuselage, SimError> {
    Fuselage::new(
        NoseCone::Haack {
            length: 0.5,
            base_diameter: 0.17,
            c: 0.0,
        },
        25.0,
        1.6,
        Inertia::principal(1.2, 1.3, 1.2),
    )
    .with_body_segment(BodySegment {
        length: 3.0,
        outer_diameter: 0.17,
        rugosity: 5e-3,
        fins: Some(TrapezoidalFins {
            count: 4,
            root_chord: 150e-3,
            tip_chord: 100e-3,
            span: 80e-3,
            mid_chord_length: 110e-3,
            thickness: 5e-3,
        }),
    })
}

/// Drogue at apogee, main at 450 m.
pub fn concorde_recovery() -> Result<Recovery, SimError> {
    Recovery::new()
        .with_event(
            Trigger::Apogee { min_time: 1.0 },
            Parachute::Hemispherical { diameter: 1.25 },
        )?
        .with_event(
            Trigger::Altitude { altitude: 450.0 },
            Parachute::Hemispherical { diameter: 2.66 },
        )
}

pub fn concorde() -> Result<Rocket, SimError> {
    RocketBuilder::new("Concorde", concorde_motor()?, concorde_fuselage()?)
        .recovery(concorde_recovery()?)
        .build()
}
