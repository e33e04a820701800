use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, SimError};

/// Parachute canopy families, sized by nominal diameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parachute {
    #[serde(rename = "hemispherical")]
    Hemispherical { diameter: f64 },
    #[serde(rename = "toroidal")]
    Toroidal { diameter: f64 },
    #[serde(rename = "cruciform")]
    Cruciform { diameter: f64 },
}

impl Parachute {
    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("parachute diameter", self.diameter())
    }

    pub fn diameter(&self) -> f64 {
        match *self {
            Parachute::Hemispherical { diameter }
            | Parachute::Toroidal { diameter }
            | Parachute::Cruciform { diameter } => diameter,
        }
    }

    /// Drag coefficient referenced to the nominal area.
    pub fn drag_coefficient(&self) -> f64 {
        match self {
            Parachute::Hemispherical { .. } => 0.71,
            Parachute::Toroidal { .. } => 0.85,
            Parachute::Cruciform { .. } => 0.60,
        }
    }

    pub fn nominal_area(&self) -> f64 {
        PI * self.diameter().powi(2) / 4.0
    }

    /// C_D · A, m^2.
    pub fn drag_area(&self) -> f64 {
        self.drag_coefficient() * self.nominal_area()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Parachute::Hemispherical { .. } => "hemispherical",
            Parachute::Toroidal { .. } => "toroidal",
            Parachute::Cruciform { .. } => "cruciform",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hemispherical_drag_area() {
        let p = Parachute::Hemispherical { diameter: 2.66 };
        assert_relative_eq!(p.drag_area(), 0.71 * PI * 2.66 * 2.66 / 4.0);
    }

    #[test]
    fn zero_diameter_is_rejected() {
        assert!(Parachute::Toroidal { diameter: 0.0 }.validate().is_err());
        assert!(Parachute::Cruciform { diameter: 1.0 }.validate().is_ok());
    }
}
