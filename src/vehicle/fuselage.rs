use std::f64::consts::PI;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, SimError};

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NoseCone {
    /// Haack series; `c = 0` is the LD-Haack (Von Kármán) shape.
    #[serde(rename = "haack")]
    Haack {
        length: f64,
        base_diameter: f64,
        #[serde(default)]
        c: f64,
    },
    #[serde(rename = "conical")]
    Conical { length: f64, base_diameter: f64 },
}

impl NoseCone {
    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("nose cone length", self.length())?;
        ensure_positive("nose cone base diameter", self.base_diameter())?;
        if let NoseCone::Haack { c, .. } = self {
            if !(0.0..=2.0 / 3.0).contains(c) {
                return Err(SimError::config(format!(
                    "Haack parameter C must lie in [0, 2/3], got {c}"
                )));
            }
        }
        Ok(())
    }

    pub fn length(&self) -> f64 {
        match *self {
            NoseCone::Haack { length, .. } | NoseCone::Conical { length, .. } => length,
        }
    }

    pub fn base_diameter(&self) -> f64 {
        match *self {
            NoseCone::Haack { base_diameter, .. } | NoseCone::Conical { base_diameter, .. } => {
                base_diameter
            }
        }
    }

    /// Barrowman centre of pressure, measured from the tip.
    pub fn center_of_pressure(&self) -> f64 {
        match self {
            NoseCone::Haack { length, .. } => 0.5 * length,
            NoseCone::Conical { length, .. } => 2.0 / 3.0 * length,
        }
    }

    /// Wetted area, taken as the lateral area of the cone with the same
    /// length and base.
    pub fn wetted_area(&self) -> f64 {
        let r = self.base_diameter() / 2.0;
        PI * r * (r * r + self.length().powi(2)).sqrt()
    }
}

/// Set of identical trapezoidal fins mounted at the aft end of a body
/// segment, root chord flush with the segment's base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidalFins {
    pub count: u32,
    pub root_chord: f64,
    pub tip_chord: f64,
    /// Semi-span, root to tip.
    pub span: f64,
    /// Length of the line joining root and tip mid-chords.
    pub mid_chord_length: f64,
    pub thickness: f64,
}

impl TrapezoidalFins {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.count < 3 {
            return Err(SimError::config(format!(
                "a fin set needs at least 3 fins, got {}",
                self.count
            )));
        }
        ensure_positive("fin root chord", self.root_chord)?;
        ensure_non_negative("fin tip chord", self.tip_chord)?;
        ensure_positive("fin span", self.span)?;
        ensure_positive("fin mid-chord length", self.mid_chord_length)?;
        ensure_positive("fin thickness", self.thickness)?;
        if self.mid_chord_length < self.span {
            return Err(SimError::config(
                "fin mid-chord line cannot be shorter than the span",
            ));
        }
        Ok(())
    }

    /// Axial distance from the root leading edge to the tip leading edge.
    pub fn sweep_length(&self) -> f64 {
        let mid_sweep = (self.mid_chord_length.powi(2) - self.span.powi(2)).max(0.0).sqrt();
        mid_sweep + (self.root_chord - self.tip_chord) / 2.0
    }

    pub fn planform_area(&self) -> f64 {
        0.5 * (self.root_chord + self.tip_chord) * self.span
    }

    /// Barrowman normal-force slope of the set with body interference.
    pub fn normal_force_slope(&self, body_diameter: f64) -> f64 {
        let (cr, ct, s, lm) = (self.root_chord, self.tip_chord, self.span, self.mid_chord_length);
        let r = body_diameter / 2.0;
        let n = f64::from(self.count);
        let interference = 1.0 + r / (s + r);
        let fins = 4.0 * n * (s / body_diameter).powi(2)
            / (1.0 + (1.0 + (2.0 * lm / (cr + ct)).powi(2)).sqrt());
        interference * fins
    }

    /// Centre of pressure measured from the root leading edge.
    pub fn center_of_pressure(&self) -> f64 {
        let (cr, ct) = (self.root_chord, self.tip_chord);
        self.sweep_length() * (cr + 2.0 * ct) / (3.0 * (cr + ct))
            + (cr + ct - cr * ct / (cr + ct)) / 6.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySegment {
    pub length: f64,
    pub outer_diameter: f64,
    /// Surface roughness height, m.
    #[serde(default)]
    pub rugosity: f64,
    #[serde(default)]
    pub fins: Option<TrapezoidalFins>,
}

impl BodySegment {
    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("body segment length", self.length)?;
        ensure_positive("body segment diameter", self.outer_diameter)?;
        ensure_non_negative("body segment rugosity", self.rugosity)?;
        if let Some(fins) = &self.fins {
            fins.validate()?;
            if fins.root_chord > self.length {
                return Err(SimError::config("fin root chord is longer than its body segment"));
            }
        }
        Ok(())
    }

    pub fn wetted_area(&self) -> f64 {
        PI * self.outer_diameter * self.length
    }
}

/// Full-body principal moments and products of inertia about the CG.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inertia {
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
    #[serde(default)]
    pub ixy: f64,
    #[serde(default)]
    pub ixz: f64,
    #[serde(default)]
    pub iyz: f64,
}

impl Inertia {
    pub fn principal(ixx: f64, iyy: f64, izz: f64) -> Self {
        Self {
            ixx,
            iyy,
            izz,
            ixy: 0.0,
            ixz: 0.0,
            iyz: 0.0,
        }
    }

    /// Symmetric body-frame tensor (body Z is the roll axis).
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.ixx, -self.ixy, -self.ixz, //
            -self.ixy, self.iyy, -self.iyz, //
            -self.ixz, -self.iyz, self.izz,
        )
    }
}

// ---------------------------------------------------------------------------
// Fuselage
// ---------------------------------------------------------------------------

/// Combined Barrowman result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stability {
    pub normal_force_slope: f64, // per rad
    pub center_of_pressure: f64, // m from the nose tip
}

/// Airframe without the motor: nose cone, body segments (nose to tail), dry
/// mass and inertia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fuselage {
    pub nose_cone: NoseCone,
    pub segments: Vec<BodySegment>,
    pub dry_mass: f64,
    /// Vehicle CG measured from the nose tip.
    pub center_of_gravity: f64,
    pub inertia: Inertia,
}

impl Fuselage {
    pub fn new(
        nose_cone: NoseCone,
        dry_mass: f64,
        center_of_gravity: f64,
        inertia: Inertia,
    ) -> Self {
        Self {
            nose_cone,
            segments: Vec::new(),
            dry_mass,
            center_of_gravity,
            inertia,
        }
    }

    pub fn add_body_segment(&mut self, segment: BodySegment) -> Result<(), SimError> {
        segment.validate()?;
        self.segments.push(segment);
        Ok(())
    }

    pub fn with_body_segment(mut self, segment: BodySegment) -> Result<Self, SimError> {
        self.add_body_segment(segment)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.nose_cone.validate()?;
        if self.segments.is_empty() {
            return Err(SimError::config("fuselage has no body segments"));
        }
        self.segments.iter().try_for_each(BodySegment::validate)?;
        ensure_positive("fuselage dry mass", self.dry_mass)?;
        let i = self.inertia;
        for (name, v) in [("Ixx", i.ixx), ("Iyy", i.iyy), ("Izz", i.izz)] {
            ensure_positive(name, v)?;
        }
        if self.inertia.matrix().determinant().abs() < 1e-12 {
            return Err(SimError::config("fuselage inertia tensor is singular"));
        }
        if !(self.center_of_gravity > 0.0 && self.center_of_gravity < self.length()) {
            return Err(SimError::config(format!(
                "centre of gravity {} m lies outside the {} m airframe",
                self.center_of_gravity,
                self.length()
            )));
        }
        Ok(())
    }

    pub fn length(&self) -> f64 {
        self.nose_cone.length() + self.segments.iter().map(|s| s.length).sum::<f64>()
    }

    pub fn reference_diameter(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.outer_diameter)
            .fold(self.nose_cone.base_diameter(), f64::max)
    }

    pub fn reference_area(&self) -> f64 {
        PI * self.reference_diameter().powi(2) / 4.0
    }

    /// Normal-force slope and lever position of every lifting component:
    /// the nose and each fin set.
    pub fn lifting_components(&self) -> Vec<(f64, f64)> {
        let d_ref = self.reference_diameter();
        let mut parts = vec![(2.0, self.nose_cone.center_of_pressure())];
        let mut x = self.nose_cone.length();
        for seg in &self.segments {
            if let Some(fins) = &seg.fins {
                let root_le = x + seg.length - fins.root_chord;
                let scale = (seg.outer_diameter / d_ref).powi(2);
                parts.push((
                    fins.normal_force_slope(seg.outer_diameter) * scale,
                    root_le + fins.center_of_pressure(),
                ));
            }
            x += seg.length;
        }
        parts
    }

    pub fn stability(&self) -> Stability {
        let parts = self.lifting_components();
        let cn: f64 = parts.iter().map(|(c, _)| c).sum();
        let moment: f64 = parts.iter().map(|(c, x)| c * x).sum();
        Stability {
            normal_force_slope: cn,
            center_of_pressure: moment / cn,
        }
    }

    /// Distance from CG aft to CP; positive is stable.
    pub fn static_margin(&self) -> f64 {
        self.stability().center_of_pressure - self.center_of_gravity
    }

    /// Zero-lift drag coefficient referenced to `reference_area`.
    pub fn drag_coefficient(&self, mach: f64, reynolds: f64) -> f64 {
        let length = self.length();
        let a_ref = self.reference_area();
        let rugosity = self
            .segments
            .iter()
            .map(|s| s.rugosity)
            .fold(0.0, f64::max);
        let cf = skin_friction(reynolds, rugosity / length, mach);

        let fineness = length / self.reference_diameter();
        let body_wet = self.nose_cone.wetted_area()
            + self.segments.iter().map(BodySegment::wetted_area).sum::<f64>();
        let body = cf * (1.0 + 1.0 / (2.0 * fineness)) * body_wet / a_ref;

        let fins: f64 = self
            .segments
            .iter()
            .filter_map(|s| s.fins.as_ref())
            .map(|f| {
                let mean_chord = 0.5 * (f.root_chord + f.tip_chord);
                2.0 * cf * (1.0 + 2.0 * f.thickness / mean_chord) * f.planform_area()
                    * f64::from(f.count)
                    / a_ref
            })
            .sum();

        let base_diameter = self
            .segments
            .last()
            .map_or(self.reference_diameter(), |s| s.outer_diameter);
        let base = base_drag(mach) * (base_diameter / self.reference_diameter()).powi(2);

        body + fins + base
    }

    pub fn inertia_matrix(&self) -> Matrix3<f64> {
        self.inertia.matrix()
    }
}

/// Turbulent flat-plate skin friction with a roughness floor and
/// compressibility correction.
fn skin_friction(reynolds: f64, relative_roughness: f64, mach: f64) -> f64 {
    let cf = if reynolds < 1e4 {
        1.48e-2
    } else {
        let smooth = 1.0 / (1.5 * reynolds.ln() - 5.6).powi(2);
        let rough = 0.032 * relative_roughness.powf(0.2);
        smooth.max(rough)
    };
    if mach < 1.0 {
        cf * (1.0 - 0.1 * mach * mach)
    } else {
        cf / (1.0 + 0.15 * mach * mach).powf(0.58)
    }
}

fn base_drag(mach: f64) -> f64 {
    if mach < 1.0 {
        0.12 + 0.13 * mach * mach
    } else {
        0.25 / mach
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fins() -> TrapezoidalFins {
        TrapezoidalFins {
            count: 4,
            root_chord: 0.15,
            tip_chord: 0.10,
            span: 0.08,
            mid_chord_length: 0.11,
            thickness: 0.005,
        }
    }

    fn concorde_fuselage() -> Fuselage {
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
            fins: Some(fins()),
        })
        .unwrap()
    }

    #[test]
    fn haack_and_conical_cp() {
        let haack = NoseCone::Haack {
            length: 0.5,
            base_diameter: 0.17,
            c: 0.0,
        };
        let cone = NoseCone::Conical {
            length: 0.6,
            base_diameter: 0.17,
        };
        assert_relative_eq!(haack.center_of_pressure(), 0.25);
        assert_relative_eq!(cone.center_of_pressure(), 0.4);
    }

    #[test]
    fn fin_normal_force_slope() {
        let f = fins();
        let cn = f.normal_force_slope(0.17);
        let expected = (1.0 + 0.085 / 0.165) * 16.0 * (0.08_f64 / 0.17).powi(2)
            / (1.0 + (1.0 + (0.22_f64 / 0.25).powi(2)).sqrt());
        assert_relative_eq!(cn, expected, max_relative = 1e-12);
        assert!(cn > 2.0 && cn < 2.6);
    }

    #[test]
    fn concorde_is_statically_stable() {
        let fus = concorde_fuselage();
        let st = fus.stability();
        assert!(st.normal_force_slope > 4.0);
        assert!(st.center_of_pressure > 1.8 && st.center_of_pressure < 2.1);
        assert!(fus.static_margin() > 0.0);
        assert!(fus.validate().is_ok());
    }

    #[test]
    fn drag_coefficient_is_plausible() {
        let fus = concorde_fuselage();
        let cd_sub = fus.drag_coefficient(0.3, 2e7);
        assert!(cd_sub > 0.3 && cd_sub < 1.0, "cd = {cd_sub}");
        // Base drag falls off past Mach 1.
        assert!(fus.drag_coefficient(2.0, 5e7) < fus.drag_coefficient(0.95, 5e7));
    }

    #[test]
    fn low_reynolds_uses_laminar_floor() {
        assert_relative_eq!(skin_friction(5e3, 0.0, 0.0), 1.48e-2);
    }

    #[test]
    fn inertia_matrix_is_symmetric() {
        let i = Inertia {
            ixx: 2.0,
            iyy: 3.0,
            izz: 0.5,
            ixy: 0.1,
            ixz: 0.0,
            iyz: 0.2,
        };
        let m = i.matrix();
        assert_eq!(m, m.transpose());
        assert_eq!(m[(0, 1)], -0.1);
    }

    #[test]
    fn rejects_cg_outside_airframe() {
        let mut fus = concorde_fuselage();
        fus.center_of_gravity = 4.0;
        assert!(fus.validate().is_err());
    }

    #[test]
    fn rejects_two_fin_set() {
        let mut f = fins();
        f.count = 2;
        assert!(f.validate().is_err());
    }
}
