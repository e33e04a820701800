use crate::dynamics::MassModel;
use crate::error::SimError;
use crate::propulsion::SolidMotor;
use crate::recovery::Recovery;

use super::fuselage::Fuselage;

// ---------------------------------------------------------------------------
// Rocket: motor + airframe + recovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Rocket {
    pub name: String,
    pub motor: SolidMotor,
    pub fuselage: Fuselage,
    pub recovery: Recovery,
}

impl Rocket {
    pub fn validate(&self) -> Result<(), SimError> {
        self.motor.validate()?;
        self.fuselage.validate()?;
        let casing = self.motor.structure.chamber.casing_inner_diameter;
        if casing >= self.fuselage.reference_diameter() {
            return Err(SimError::config(format!(
                "motor casing ({casing} m) does not fit inside the airframe ({} m)",
                self.fuselage.reference_diameter()
            )));
        }
        Ok(())
    }

    /// Airframe plus empty motor.
    pub fn dry_mass(&self) -> f64 {
        self.fuselage.dry_mass + self.motor.structure.dry_mass
    }

    pub fn launch_mass(&self) -> f64 {
        self.dry_mass() + self.motor.initial_propellant_mass()
    }

    pub fn mass_model(&self) -> MassModel {
        MassModel {
            dry_mass: self.dry_mass(),
            dry_inertia: self.fuselage.inertia_matrix(),
            grain_radius: self.motor.grain.outer_diameter() / 2.0,
            grain_length: self.motor.grain.total_length(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rocket builder
// ---------------------------------------------------------------------------

pub struct RocketBuilder {
    name: String,
    motor: SolidMotor,
    fuselage: Fuselage,
    recovery: Recovery,
}

impl RocketBuilder {
    pub fn new(name: impl Into<String>, motor: SolidMotor, fuselage: Fuselage) -> Self {
        Self {
            name: name.into(),
            motor,
            fuselage,
            recovery: Recovery::new(),
        }
    }

    pub fn recovery(mut self, recovery: Recovery) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn build(self) -> Result<Rocket, SimError> {
        let rocket = Rocket {
            name: self.name,
            motor: self.motor,
            fuselage: self.fuselage,
            recovery: self.recovery,
        };
        rocket.validate()?;
        Ok(rocket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::presets;

    #[test]
    fn concorde_masses() {
        let r = presets::concorde().unwrap();
        assert!((r.dry_mass() - 46.013).abs() < 1e-9);
        let prop = r.motor.initial_propellant_mass();
        assert!(prop > 18.0 && prop < 25.0, "propellant {prop}");
        assert!((r.launch_mass() - r.dry_mass() - prop).abs() < 1e-12);
    }

    #[test]
    fn mass_model_matches_rocket() {
        let r = presets::concorde().unwrap();
        let m = r.mass_model();
        assert_eq!(m.mass(r.motor.initial_propellant_mass()), r.launch_mass());
        assert_eq!(m.grain_radius, 0.0575);
    }

    #[test]
    fn oversized_motor_is_rejected() {
        let mut fus = presets::concorde_fuselage().unwrap();
        for s in &mut fus.segments {
            s.outer_diameter = 0.12;
        }
        fus.nose_cone = crate::vehicle::NoseCone::Conical {
            length: 0.5,
            base_diameter: 0.12,
        };
        let res = RocketBuilder::new("tight", presets::concorde_motor().unwrap(), fus).build();
        assert!(matches!(res, Err(SimError::Configuration(_))));
    }
}
