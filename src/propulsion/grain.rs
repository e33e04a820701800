use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, SimError};

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

/// Tubular segment with an inhibited outer surface: burns radially outward
/// from the core and axially from both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatesSegment {
    pub outer_diameter: f64,
    pub core_diameter: f64,
    pub length: f64,
    /// Axial gap to the next segment (or bulkhead).
    #[serde(default)]
    pub spacing: f64,
}

impl BatesSegment {
    pub fn new(
        outer_diameter: f64,
        core_diameter: f64,
        length: f64,
        spacing: f64,
    ) -> Result<Self, SimError> {
        let s = Self {
            outer_diameter,
            core_diameter,
            length,
            spacing,
        };
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("BATES outer diameter", self.outer_diameter)?;
        ensure_positive("BATES core diameter", self.core_diameter)?;
        ensure_positive("BATES length", self.length)?;
        ensure_non_negative("BATES spacing", self.spacing)?;
        if self.core_diameter >= self.outer_diameter {
            return Err(SimError::config(format!(
                "BATES core diameter {} m must be smaller than outer diameter {} m",
                self.core_diameter, self.outer_diameter
            )));
        }
        Ok(())
    }

    pub fn web_thickness(&self) -> f64 {
        ((self.outer_diameter - self.core_diameter) / 2.0).min(self.length / 2.0)
    }

    /// (core radius, length) after burning `web`, or `None` once consumed.
    fn regressed(&self, web: f64) -> Option<(f64, f64)> {
        let core_r = self.core_diameter / 2.0 + web;
        let length = self.length - 2.0 * web;
        if core_r >= self.outer_diameter / 2.0 || length <= 0.0 {
            None
        } else {
            Some((core_r, length))
        }
    }

    pub fn burn_area(&self, web: f64) -> f64 {
        let outer_r = self.outer_diameter / 2.0;
        self.regressed(web).map_or(0.0, |(r, l)| {
            2.0 * PI * r * l + 2.0 * PI * (outer_r * outer_r - r * r)
        })
    }

    pub fn volume(&self, web: f64) -> f64 {
        let outer_r = self.outer_diameter / 2.0;
        self.regressed(web)
            .map_or(0.0, |(r, l)| PI * (outer_r * outer_r - r * r) * l)
    }
}

/// Solid cylinder burning only on its aft face: constant burning area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndBurnerSegment {
    pub diameter: f64,
    pub length: f64,
}

impl EndBurnerSegment {
    pub fn new(diameter: f64, length: f64) -> Result<Self, SimError> {
        let s = Self { diameter, length };
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        ensure_positive("end burner diameter", self.diameter)?;
        ensure_positive("end burner length", self.length)
    }

    fn face_area(&self) -> f64 {
        PI * self.diameter * self.diameter / 4.0
    }

    pub fn burn_area(&self, web: f64) -> f64 {
        if web < self.length {
            self.face_area()
        } else {
            0.0
        }
    }

    pub fn volume(&self, web: f64) -> f64 {
        self.face_area() * (self.length - web).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GrainSegment {
    #[serde(rename = "bates")]
    Bates(BatesSegment),
    #[serde(rename = "end_burner")]
    EndBurner(EndBurnerSegment),
}

impl GrainSegment {
    pub fn validate(&self) -> Result<(), SimError> {
        match self {
            GrainSegment::Bates(s) => s.validate(),
            GrainSegment::EndBurner(s) => s.validate(),
        }
    }

    pub fn burn_area(&self, web: f64) -> f64 {
        match self {
            GrainSegment::Bates(s) => s.burn_area(web),
            GrainSegment::EndBurner(s) => s.burn_area(web),
        }
    }

    pub fn volume(&self, web: f64) -> f64 {
        match self {
            GrainSegment::Bates(s) => s.volume(web),
            GrainSegment::EndBurner(s) => s.volume(web),
        }
    }

    pub fn web_thickness(&self) -> f64 {
        match self {
            GrainSegment::Bates(s) => s.web_thickness(),
            GrainSegment::EndBurner(s) => s.length,
        }
    }

    /// Axial space the segment occupies in the chamber, gap included.
    pub fn axial_length(&self) -> f64 {
        match self {
            GrainSegment::Bates(s) => s.length + s.spacing,
            GrainSegment::EndBurner(s) => s.length,
        }
    }

    pub fn outer_diameter(&self) -> f64 {
        match self {
            GrainSegment::Bates(s) => s.outer_diameter,
            GrainSegment::EndBurner(s) => s.diameter,
        }
    }
}

// ---------------------------------------------------------------------------
// Grain
// ---------------------------------------------------------------------------

/// Stack of segments regressing together: every exposed surface recedes by
/// the same burned web.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Grain {
    pub segments: Vec<GrainSegment>,
}

impl Grain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_segment(&mut self, segment: GrainSegment) -> Result<(), SimError> {
        segment.validate()?;
        self.segments.push(segment);
        Ok(())
    }

    pub fn with_segment(mut self, segment: GrainSegment) -> Result<Self, SimError> {
        self.add_segment(segment)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.segments.is_empty() {
            return Err(SimError::config("grain has no segments"));
        }
        self.segments.iter().try_for_each(GrainSegment::validate)
    }

    /// Burning surface area at a burned web, m^2.
    pub fn surface_area(&self, web: f64) -> f64 {
        self.segments.iter().map(|s| s.burn_area(web)).sum()
    }

    /// Propellant volume left at a burned web, m^3.
    pub fn propellant_volume(&self, web: f64) -> f64 {
        self.segments.iter().map(|s| s.volume(web)).sum()
    }

    pub fn total_propellant_volume(&self) -> f64 {
        self.propellant_volume(0.0)
    }

    /// Web at which the last segment is consumed.
    pub fn web_thickness(&self) -> f64 {
        self.segments
            .iter()
            .map(GrainSegment::web_thickness)
            .fold(0.0, f64::max)
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(GrainSegment::axial_length).sum()
    }

    pub fn outer_diameter(&self) -> f64 {
        self.segments
            .iter()
            .map(GrainSegment::outer_diameter)
            .fold(0.0, f64::max)
    }
}
