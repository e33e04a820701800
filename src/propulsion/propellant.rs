use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, SimError};

/// Universal gas constant, J/(mol·K).
pub const R_UNIVERSAL: f64 = 8.314_462_618;

// ---------------------------------------------------------------------------
// Burn-rate law
// ---------------------------------------------------------------------------

/// One pressure band of a piecewise burn-rate law, `r = a * P^n` in SI units
/// (m/s, Pa).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnRateRange {
    pub min_pressure: f64,
    pub max_pressure: f64,
    pub a: f64,
    pub n: f64,
}

impl BurnRateRange {
    /// Build a band from coefficients quoted for MPa and mm/s, the form
    /// most propellant characterisation data is published in.
    pub fn from_mpa(min_mpa: f64, max_mpa: f64, a_mm_s: f64, n: f64) -> Self {
        Self {
            min_pressure: min_mpa * 1e6,
            max_pressure: max_mpa * 1e6,
            a: a_mm_s * 1e-3 / 1e6_f64.powf(n),
            n,
        }
    }

    fn rate(&self, pressure: f64) -> f64 {
        self.a * pressure.powf(self.n)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BurnRateLaw {
    /// Saint Robert's law over the whole pressure range.
    #[serde(rename = "st_robert")]
    StRobert { a: f64, n: f64 },
    /// Ranges sorted by pressure; pressures outside the table use the
    /// nearest band.
    #[serde(rename = "piecewise")]
    Piecewise { ranges: Vec<BurnRateRange> },
}

impl BurnRateLaw {
    pub fn rate(&self, pressure: f64) -> f64 {
        if pressure <= 0.0 {
            return 0.0;
        }
        match self {
            BurnRateLaw::StRobert { a, n } => a * pressure.powf(*n),
            BurnRateLaw::Piecewise { ranges } => {
                let band = ranges
                    .iter()
                    .find(|r| pressure < r.max_pressure)
                    .or(ranges.last());
                band.map_or(0.0, |r| r.rate(pressure))
            }
        }
    }

    fn validate(&self) -> Result<(), SimError> {
        match self {
            BurnRateLaw::StRobert { a, n } => {
                ensure_positive("burn rate coefficient", *a)?;
                if !n.is_finite() {
                    return Err(SimError::config("burn rate exponent must be finite"));
                }
            }
            BurnRateLaw::Piecewise { ranges } => {
                if ranges.is_empty() {
                    return Err(SimError::config("piecewise burn rate law has no ranges"));
                }
                for r in ranges {
                    ensure_positive("burn rate coefficient", r.a)?;
                    if r.max_pressure <= r.min_pressure {
                        return Err(SimError::config(format!(
                            "burn rate range [{}, {}] Pa is empty",
                            r.min_pressure, r.max_pressure
                        )));
                    }
                }
                if ranges.windows(2).any(|w| w[1].min_pressure < w[0].min_pressure) {
                    return Err(SimError::config(
                        "burn rate ranges must be sorted by pressure",
                    ));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Propellant
// ---------------------------------------------------------------------------

/// Solid propellant: burn-rate law plus the thermochemical constants the
/// ballistics engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidPropellant {
    pub name: String,
    pub density: f64,           // kg/m^3
    pub burn_rate: BurnRateLaw,
    pub k: f64,                 // ratio of specific heats of the products
    pub molar_mass: f64,        // kg/mol
    pub flame_temperature: f64, // K, chamber (adiabatic, efficiency-corrected)
}

impl SolidPropellant {
    pub fn new(
        name: impl Into<String>,
        density: f64,
        burn_rate: BurnRateLaw,
        k: f64,
        molar_mass: f64,
        flame_temperature: f64,
    ) -> Result<Self, SimError> {
        let p = Self {
            name: name.into(),
            density,
            burn_rate,
            k,
            molar_mass,
            flame_temperature,
        };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("propellant density", self.density)?;
        ensure_positive("molar mass", self.molar_mass)?;
        ensure_positive("flame temperature", self.flame_temperature)?;
        if !(self.k.is_finite() && self.k > 1.0) {
            return Err(SimError::config(format!(
                "ratio of specific heats must exceed 1, got {}",
                self.k
            )));
        }
        self.burn_rate.validate()
    }

    /// Linear regression rate at chamber pressure, m/s.
    pub fn burn_rate(&self, pressure: f64) -> f64 {
        self.burn_rate.rate(pressure)
    }

    /// Specific gas constant of the combustion products, J/(kg·K).
    pub fn gas_constant(&self) -> f64 {
        R_UNIVERSAL / self.molar_mass
    }

    /// Same propellant with a measured density replacing the ideal one.
    pub fn with_density(mut self, density: f64) -> Result<Self, SimError> {
        ensure_positive("propellant density", density)?;
        self.density = density;
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Potassium nitrate / sorbitol, burn-rate bands after R. Nakka.
pub fn knsb_nakka() -> SolidPropellant {
    SolidPropellant {
        name: "KNSB-NAKKA".into(),
        density: 1841.0,
        burn_rate: BurnRateLaw::Piecewise {
            ranges: vec![
                BurnRateRange::from_mpa(0.101, 0.807, 10.708, 0.625),
                BurnRateRange::from_mpa(0.807, 1.503, 8.763, -0.314),
                BurnRateRange::from_mpa(1.503, 3.792, 7.852, -0.013),
                BurnRateRange::from_mpa(3.792, 7.033, 3.907, 0.535),
                BurnRateRange::from_mpa(7.033, 10.67, 9.653, 0.064),
            ],
        },
        k: 1.1361,
        molar_mass: 39.86e-3,
        flame_temperature: 1600.0,
    }
}

/// Potassium nitrate / dextrose, burn-rate bands after R. Nakka.
pub fn kndx_nakka() -> SolidPropellant {
    SolidPropellant {
        name: "KNDX-NAKKA".into(),
        density: 1879.0,
        burn_rate: BurnRateLaw::Piecewise {
            ranges: vec![
                BurnRateRange::from_mpa(0.103, 0.779, 8.875, 0.619),
                BurnRateRange::from_mpa(0.779, 2.572, 7.553, -0.009),
                BurnRateRange::from_mpa(2.572, 5.930, 3.841, 0.688),
                BurnRateRange::from_mpa(5.930, 8.502, 17.2, -0.148),
                BurnRateRange::from_mpa(8.502, 11.20, 4.775, 0.442),
            ],
        },
        k: 1.1308,
        molar_mass: 42.39e-3,
        flame_temperature: 1710.0,
    }
}

/// Look up a preset propellant by its catalogue name (case-insensitive).
pub fn by_name(name: &str) -> Result<SolidPropellant, SimError> {
    match name.to_ascii_uppercase().as_str() {
        "KNSB-NAKKA" | "KNSB" => Ok(knsb_nakka()),
        "KNDX-NAKKA" | "KNDX" => Ok(kndx_nakka()),
        other => Err(SimError::config(format!("unknown propellant '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mpa_band_converts_to_si() {
        let band = BurnRateRange::from_mpa(0.0, 10.0, 5.0, 0.5);
        // 5 mm/s at 1 MPa
        assert_relative_eq!(band.rate(1e6), 5e-3, max_relative = 1e-12);
        assert_relative_eq!(band.rate(4e6), 10e-3, max_relative = 1e-12);
    }

    #[test]
    fn knsb_rate_is_plausible_across_bands() {
        let p = knsb_nakka();
        for mpa in [0.5, 1.0, 2.0, 5.0, 8.0] {
            let r = p.burn_rate(mpa * 1e6);
            assert!(r > 3e-3 && r < 20e-3, "r({mpa} MPa) = {r}");
        }
    }

    #[test]
    fn out_of_table_pressures_use_nearest_band() {
        let p = knsb_nakka();
        assert!(p.burn_rate(50_000.0) > 0.0);
        assert!(p.burn_rate(20e6) > p.burn_rate(8e6));
        assert_eq!(p.burn_rate(0.0), 0.0);
    }

    #[test]
    fn constant_law_ignores_pressure() {
        let law = BurnRateLaw::StRobert { a: 5e-3, n: 0.0 };
        assert_eq!(law.rate(1e5), 5e-3);
        assert_eq!(law.rate(5e6), 5e-3);
    }

    #[test]
    fn presets_validate_and_resolve_by_name() {
        assert!(knsb_nakka().validate().is_ok());
        assert!(kndx_nakka().validate().is_ok());
        assert_eq!(by_name("knsb-nakka").unwrap().name, "KNSB-NAKKA");
        assert!(by_name("APCP-42").is_err());
    }

    #[test]
    fn density_override_is_validated() {
        let p = knsb_nakka().with_density(1656.01).unwrap();
        assert_eq!(p.density, 1656.01);
        assert!(knsb_nakka().with_density(-1.0).is_err());
    }

    #[test]
    fn rejects_k_not_above_one() {
        let res = SolidPropellant::new(
            "bad",
            1600.0,
            BurnRateLaw::StRobert { a: 1e-3, n: 0.3 },
            1.0,
            0.03,
            1600.0,
        );
        assert!(matches!(res, Err(SimError::Configuration(_))));
    }
}
