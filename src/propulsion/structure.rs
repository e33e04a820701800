use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, SimError};

/// Conical convergent-divergent nozzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nozzle {
    pub throat_diameter: f64,
    pub expansion_ratio: f64,
    /// Divergent half-angle, degrees.
    pub divergent_angle: f64,
    /// Convergent half-angle, degrees.
    pub convergent_angle: f64,
}

impl Nozzle {
    pub fn new(
        throat_diameter: f64,
        divergent_angle: f64,
        convergent_angle: f64,
        expansion_ratio: f64,
    ) -> Result<Self, SimError> {
        let n = Self {
            throat_diameter,
            expansion_ratio,
            divergent_angle,
            convergent_angle,
        };
        n.validate()?;
        Ok(n)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("throat diameter", self.throat_diameter)?;
        if !(self.expansion_ratio.is_finite() && self.expansion_ratio >= 1.0) {
            return Err(SimError::config(format!(
                "expansion ratio must be at least 1, got {}",
                self.expansion_ratio
            )));
        }
        for (name, angle) in [
            ("divergent angle", self.divergent_angle),
            ("convergent angle", self.convergent_angle),
        ] {
            if !(angle > 0.0 && angle < 90.0) {
                return Err(SimError::config(format!(
                    "{name} must lie in (0, 90) degrees, got {angle}"
                )));
            }
        }
        Ok(())
    }

    pub fn throat_area(&self) -> f64 {
        PI * self.throat_diameter * self.throat_diameter / 4.0
    }

    pub fn exit_area(&self) -> f64 {
        self.throat_area() * self.expansion_ratio
    }

    /// Momentum loss of a conical divergent section, (1 + cos α) / 2.
    pub fn divergence_factor(&self) -> f64 {
        (1.0 + self.divergent_angle.to_radians().cos()) / 2.0
    }
}

/// Combustion chamber casing with an optional thermal liner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chamber {
    pub casing_inner_diameter: f64,
    pub length: f64,
    #[serde(default)]
    pub liner_thickness: f64,
}

impl Chamber {
    pub fn new(casing_inner_diameter: f64, length: f64, liner_thickness: f64) -> Result<Self, SimError> {
        let c = Self {
            casing_inner_diameter,
            length,
            liner_thickness,
        };
        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("casing inner diameter", self.casing_inner_diameter)?;
        ensure_positive("chamber length", self.length)?;
        ensure_non_negative("liner thickness", self.liner_thickness)?;
        if self.inner_diameter() <= 0.0 {
            return Err(SimError::config("liner fills the whole casing"));
        }
        Ok(())
    }

    /// Diameter available to the grain, inside the liner.
    pub fn inner_diameter(&self) -> f64 {
        self.casing_inner_diameter - 2.0 * self.liner_thickness
    }

    pub fn volume(&self) -> f64 {
        PI * self.inner_diameter().powi(2) / 4.0 * self.length
    }
}

/// Static geometry and mass of the motor hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorStructure {
    pub dry_mass: f64,
    pub nozzle: Nozzle,
    pub chamber: Chamber,
}

impl MotorStructure {
    pub fn new(dry_mass: f64, nozzle: Nozzle, chamber: Chamber) -> Result<Self, SimError> {
        let s = Self {
            dry_mass,
            nozzle,
            chamber,
        };
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("motor dry mass", self.dry_mass)?;
        self.nozzle.validate()?;
        self.chamber.validate()?;
        if self.nozzle.throat_diameter >= self.chamber.inner_diameter() {
            return Err(SimError::config(
                "nozzle throat is wider than the chamber bore",
            ));
        }
        Ok(())
    }

    pub fn throat_area(&self) -> f64 {
        self.nozzle.throat_area()
    }

    pub fn exit_area(&self) -> f64 {
        self.nozzle.exit_area()
    }

    pub fn expansion_ratio(&self) -> f64 {
        self.nozzle.expansion_ratio
    }

    pub fn chamber_volume(&self) -> f64 {
        self.chamber.volume()
    }

    /// Gas volume in the chamber with `propellant_volume` still loaded.
    pub fn chamber_free_volume(&self, propellant_volume: f64) -> f64 {
        self.chamber_volume() - propellant_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn olympus_structure() -> MotorStructure {
        MotorStructure::new(
            21.013,
            Nozzle::new(37e-3, 12.0, 45.0, 8.0).unwrap(),
            Chamber::new(128.2e-3, 1.5, 2e-3).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn nozzle_areas() {
        let s = olympus_structure();
        assert_relative_eq!(s.throat_area(), PI * 0.037 * 0.037 / 4.0);
        assert_relative_eq!(s.exit_area(), 8.0 * s.throat_area());
        assert_eq!(s.expansion_ratio(), 8.0);
    }

    #[test]
    fn divergence_loss_is_small_for_12_degrees() {
        let n = Nozzle::new(37e-3, 12.0, 45.0, 8.0).unwrap();
        assert_relative_eq!(n.divergence_factor(), 0.9891, epsilon = 1e-4);
    }

    #[test]
    fn liner_reduces_chamber_volume() {
        let bare = Chamber::new(0.1282, 1.0, 0.0).unwrap();
        let lined = Chamber::new(0.1282, 1.0, 2e-3).unwrap();
        assert!(lined.volume() < bare.volume());
        assert_relative_eq!(lined.inner_diameter(), 0.1242, epsilon = 1e-12);
    }

    #[test]
    fn free_volume_subtracts_propellant() {
        let s = olympus_structure();
        assert_relative_eq!(s.chamber_free_volume(0.004), s.chamber_volume() - 0.004);
    }

    #[test]
    fn rejects_bad_nozzle_angles() {
        assert!(Nozzle::new(37e-3, 0.0, 45.0, 8.0).is_err());
        assert!(Nozzle::new(37e-3, 12.0, 95.0, 8.0).is_err());
        assert!(Nozzle::new(37e-3, 12.0, 45.0, 0.5).is_err());
    }
}
