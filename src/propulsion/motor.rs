use serde::{Deserialize, Serialize};

use super::grain::Grain;
use super::nozzle_flow;
use super::propellant::SolidPropellant;
use super::structure::MotorStructure;
use crate::error::SimError;

/// Instantaneous nozzle performance at a chamber pressure.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NozzleOutput {
    pub mass_flow: f64,     // kg/s
    pub exit_pressure: f64, // Pa
    pub thrust: f64,        // N
}

/// Solid rocket motor: grain, propellant and hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidMotor {
    pub grain: Grain,
    pub propellant: SolidPropellant,
    pub structure: MotorStructure,
}

impl SolidMotor {
    pub fn new(
        grain: Grain,
        propellant: SolidPropellant,
        structure: MotorStructure,
    ) -> Result<Self, SimError> {
        let m = Self {
            grain,
            propellant,
            structure,
        };
        m.validate()?;
        Ok(m)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.grain.validate()?;
        self.propellant.validate()?;
        self.structure.validate()?;

        let chamber = &self.structure.chamber;
        if self.grain.outer_diameter() > chamber.inner_diameter() {
            return Err(SimError::config(format!(
                "grain diameter {:.4} m exceeds chamber bore {:.4} m",
                self.grain.outer_diameter(),
                chamber.inner_diameter()
            )));
        }
        if self.grain.total_length() > chamber.length {
            return Err(SimError::config(format!(
                "grain length {:.4} m exceeds chamber length {:.4} m",
                self.grain.total_length(),
                chamber.length
            )));
        }
        if self.initial_free_volume() <= 0.0 {
            return Err(SimError::config("grain leaves no free volume in the chamber"));
        }
        Ok(())
    }

    pub fn initial_propellant_mass(&self) -> f64 {
        self.propellant.density * self.grain.total_propellant_volume()
    }

    pub fn initial_free_volume(&self) -> f64 {
        self.structure
            .chamber_free_volume(self.grain.total_propellant_volume())
    }

    /// Loaded motor mass at ignition.
    pub fn total_mass(&self) -> f64 {
        self.structure.dry_mass + self.initial_propellant_mass()
    }

    pub fn characteristic_velocity(&self) -> f64 {
        let p = &self.propellant;
        nozzle_flow::characteristic_velocity(p.k, p.gas_constant(), p.flame_temperature)
    }

    /// Choked throat flow at chamber pressure `p0`; zero once the chamber
    /// has blown down to ambient.
    pub fn nozzle_mass_flow(&self, p0: f64, ambient: f64) -> f64 {
        if p0 <= ambient || p0 <= 0.0 {
            return 0.0;
        }
        let p = &self.propellant;
        nozzle_flow::choked_mass_flow(
            p0,
            self.structure.throat_area(),
            p.k,
            p.gas_constant(),
            p.flame_temperature,
        )
    }

    /// Mass flow, exit pressure and thrust at chamber pressure `p0`.
    ///
    /// Thrust is floored at zero: an over-expanded nozzle separates rather
    /// than pulling the motor backwards.
    pub fn nozzle_output(&self, p0: f64, ambient: f64) -> NozzleOutput {
        let mass_flow = self.nozzle_mass_flow(p0, ambient);
        if mass_flow <= 0.0 {
            return NozzleOutput::default();
        }
        let p = &self.propellant;
        let nozzle = &self.structure.nozzle;
        let mach_e = nozzle_flow::exit_mach(nozzle.expansion_ratio, p.k);
        let ratio = nozzle_flow::pressure_ratio(mach_e, p.k);
        let exit_pressure = p0 * ratio;
        let v_e = nozzle_flow::exhaust_velocity(ratio, p.k, p.gas_constant(), p.flame_temperature);
        let thrust = nozzle.divergence_factor()
            * (mass_flow * v_e + (exit_pressure - ambient) * nozzle.exit_area());

        NozzleOutput {
            mass_flow,
            exit_pressure,
            thrust: thrust.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propulsion::grain::{BatesSegment, GrainSegment};
    use crate::propulsion::propellant::knsb_nakka;
    use crate::propulsion::structure::{Chamber, Nozzle};

    fn small_motor() -> SolidMotor {
        let seg = BatesSegment::new(115e-3, 45e-3, 200e-3, 10e-3).unwrap();
        let grain = Grain::new()
            .with_segment(GrainSegment::Bates(seg.clone()))
            .unwrap()
            .with_segment(GrainSegment::Bates(seg))
            .unwrap();
        let structure = MotorStructure::new(
            5.0,
            Nozzle::new(25e-3, 12.0, 45.0, 6.0).unwrap(),
            Chamber::new(128.2e-3, 0.45, 2e-3).unwrap(),
        )
        .unwrap();
        SolidMotor::new(grain, knsb_nakka(), structure).unwrap()
    }

    #[test]
    fn propellant_mass_from_density_and_volume() {
        let m = small_motor();
        let expected = 1841.0 * m.grain.total_propellant_volume();
        assert!((m.initial_propellant_mass() - expected).abs() < 1e-12);
        assert!(m.total_mass() > m.structure.dry_mass);
    }

    #[test]
    fn no_flow_below_ambient() {
        let m = small_motor();
        assert_eq!(m.nozzle_mass_flow(90_000.0, 101_325.0), 0.0);
        assert_eq!(m.nozzle_output(90_000.0, 101_325.0).thrust, 0.0);
    }

    #[test]
    fn thrust_grows_with_chamber_pressure() {
        let m = small_motor();
        let low = m.nozzle_output(2e6, 101_325.0);
        let high = m.nozzle_output(5e6, 101_325.0);
        assert!(high.thrust > low.thrust);
        assert!(high.mass_flow > low.mass_flow);
        assert!(high.exit_pressure < 5e6);
    }

    #[test]
    fn vacuum_thrust_exceeds_sea_level_thrust() {
        let m = small_motor();
        let sl = m.nozzle_output(4e6, 101_325.0).thrust;
        let vac = m.nozzle_output(4e6, 0.0).thrust;
        assert!(vac > sl);
    }

    #[test]
    fn rejects_grain_longer_than_chamber() {
        let mut m = small_motor();
        m.structure.chamber.length = 0.3;
        assert!(matches!(m.validate(), Err(SimError::Configuration(_))));
    }
}
