use serde::Serialize;

use super::gravity::gravity_at;
use super::G0;

// ---------------------------------------------------------------------------
// Air
// ---------------------------------------------------------------------------

const R_AIR: f64 = 287.052_87; // specific gas constant for dry air, J/(kg·K)
const GAMMA: f64 = 1.4;        // ratio of specific heats

// Sutherland's law for air
const MU_REF: f64 = 1.716e-5;  // Pa·s at T_REF
const T_REF: f64 = 273.15;     // K
const SUTHERLAND: f64 = 110.4; // K

// ---------------------------------------------------------------------------
// Atmosphere seam
// ---------------------------------------------------------------------------

/// Properties of still air at one altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtmosphereState {
    pub density: f64,      // kg/m^3
    pub pressure: f64,     // Pa
    pub temperature: f64,  // K
    pub sound_speed: f64,  // m/s
    pub viscosity: f64,    // Pa·s (dynamic)
    pub gravity: f64,      // m/s^2, magnitude
}

/// Atmosphere collaborator consumed by the flight engine.
///
/// `altitude` is geometric altitude above mean sea level in metres.
pub trait AtmosphereModel {
    fn at(&self, altitude: f64) -> AtmosphereState;
}

/// ISA 1976 standard atmosphere with inverse-square gravity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Isa1976;

impl AtmosphereModel for Isa1976 {
    fn at(&self, altitude: f64) -> AtmosphereState {
        isa(altitude)
    }
}

/// One band of the 1976 profile: base altitude, base temperature, lapse rate
/// and base pressure.
struct Layer {
    base: f64,        // m
    temperature: f64, // K
    lapse: f64,       // K/m
    pressure: f64,    // Pa
}

impl Layer {
    const fn new(base: f64, temperature: f64, lapse: f64, pressure: f64) -> Self {
        Self {
            base,
            temperature,
            lapse,
            pressure,
        }
    }

    /// Temperature and pressure at `h` inside this layer (hydrostatic,
    /// constant g0).
    fn state(&self, h: f64) -> (f64, f64) {
        let dh = h - self.base;
        if self.lapse == 0.0 {
            let p = self.pressure * (-G0 * dh / (R_AIR * self.temperature)).exp();
            (self.temperature, p)
        } else {
            let t = self.temperature + self.lapse * dh;
            let p = self.pressure * (t / self.temperature).powf(-G0 / (self.lapse * R_AIR));
            (t, p)
        }
    }
}

const LAYERS: [Layer; 7] = [
    Layer::new(0.0, 288.15, -0.0065, 101_325.0),
    Layer::new(11_000.0, 216.65, 0.0, 22_632.1),
    Layer::new(20_000.0, 216.65, 0.001, 5_474.89),
    Layer::new(32_000.0, 228.65, 0.0028, 868.019),
    Layer::new(47_000.0, 270.65, 0.0, 110.906),
    Layer::new(51_000.0, 270.65, -0.0028, 66.9389),
    Layer::new(71_000.0, 214.65, -0.002, 3.956_42),
];

/// Top of the tabulated profile.
const H_MAX: f64 = 86_000.0;

/// ISA 1976 properties at a geometric altitude above mean sea level.
///
/// Altitudes below sea level read the sea-level values. Above 86 km the
/// temperature is held at its 86 km value and pressure decays exponentially.
pub fn isa(altitude_m: f64) -> AtmosphereState {
    let h = altitude_m.max(0.0);

    let (temperature, pressure) = if h < H_MAX {
        LAYERS
            .iter()
            .rev()
            .find(|l| h >= l.base)
            .unwrap_or(&LAYERS[0])
            .state(h)
    } else {
        let (t, p) = LAYERS[LAYERS.len() - 1].state(H_MAX);
        (t, p * (-1.5e-4 * (h - H_MAX)).exp())
    };

    AtmosphereState {
        density: pressure / (R_AIR * temperature),
        pressure,
        temperature,
        sound_speed: (GAMMA * R_AIR * temperature).sqrt(),
        viscosity: sutherland_viscosity(temperature),
        gravity: gravity_at(h),
    }
}

/// Dynamic viscosity of air, Sutherland's law.
fn sutherland_viscosity(temperature: f64) -> f64 {
    MU_REF * (temperature / T_REF).powf(1.5) * (T_REF + SUTHERLAND) / (temperature + SUTHERLAND)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
