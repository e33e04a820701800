use nalgebra::{Matrix3, Vector3};

/// Mass properties of the vehicle as propellant burns away.
///
/// The grain is treated as a solid cylinder centred on the vehicle CG, so
/// burning changes the tensor's diagonal but never shifts the CG.
#[derive(Debug, Clone, PartialEq)]
pub struct MassModel {
    pub dry_mass: f64,
    pub dry_inertia: Matrix3<f64>,
    pub grain_radius: f64,
    pub grain_length: f64,
}

impl MassModel {
    pub fn mass(&self, propellant_mass: f64) -> f64 {
        self.dry_mass + propellant_mass.max(0.0)
    }

    pub fn inertia(&self, propellant_mass: f64) -> Matrix3<f64> {
        self.dry_inertia
            + cylinder_inertia(propellant_mass.max(0.0), self.grain_radius, self.grain_length)
    }
}

/// Solid cylinder about its centre, axis along body Z.
pub fn cylinder_inertia(mass: f64, radius: f64, length: f64) -> Matrix3<f64> {
    let axial = 0.5 * mass * radius * radius;
    let transverse = mass * (3.0 * radius * radius + length * length) / 12.0;
    Matrix3::from_diagonal(&Vector3::new(transverse, transverse, axial))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> MassModel {
        MassModel {
            dry_mass: 46.0,
            dry_inertia: Matrix3::from_diagonal(&Vector3::new(1.2, 1.3, 1.2)),
            grain_radius: 0.0575,
            grain_length: 1.47,
        }
    }

    #[test]
    fn mass_is_dry_plus_propellant() {
        let m = model();
        assert_eq!(m.mass(20.0), 66.0);
        assert_eq!(m.mass(0.0), 46.0);
    }

    #[test]
    fn burnout_returns_dry_inertia() {
        let m = model();
        assert_eq!(m.inertia(0.0), m.dry_inertia);
    }

    #[test]
    fn cylinder_formulas() {
        let i = cylinder_inertia(12.0, 0.5, 2.0);
        assert_relative_eq!(i[(2, 2)], 1.5);
        assert_relative_eq!(i[(0, 0)], 12.0 * (0.75 + 4.0) / 12.0);
        assert_eq!(i[(0, 1)], 0.0);
    }

    #[test]
    fn loaded_vehicle_is_harder_to_turn() {
        let m = model();
        assert!(m.inertia(20.0)[(0, 0)] > m.inertia(5.0)[(0, 0)]);
    }
}
