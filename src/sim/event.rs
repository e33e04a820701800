use serde::Serialize;

use crate::dynamics::state::RigidBodyState;
use crate::recovery::Parachute;

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

/// Kinds of flight events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FlightEventKind {
    Ignition,
    RailExit { velocity: f64 },
    /// The motor stopped producing thrust.
    Burnout,
    Apogee { altitude: f64 },
    Deployment { event: usize, parachute: Parachute },
    Landing { velocity: f64 },
}

/// A discrete event that occurred during flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightEvent {
    pub time: f64,
    pub altitude: f64, // m above the launch site
    pub kind: FlightEventKind,
}

impl FlightEvent {
    pub fn at(state: &RigidBodyState, kind: FlightEventKind) -> Self {
        Self {
            time: state.time,
            altitude: state.pos.z,
            kind,
        }
    }
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive states and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &RigidBodyState, current: &RigidBodyState) -> Option<FlightEventKind>;
}

/// Detects apogee (vertical velocity going from positive to non-positive).
/// Reports at most once.
#[derive(Debug, Clone, Default)]
pub struct ApogeeDetector {
    fired: bool,
}

impl EventDetector for ApogeeDetector {
    fn check(&mut self, prev: &RigidBodyState, current: &RigidBodyState) -> Option<FlightEventKind> {
        if self.fired {
            return None;
        }
        if prev.vel.z > 0.0 && current.vel.z <= 0.0 {
            self.fired = true;
            Some(FlightEventKind::Apogee {
                altitude: prev.pos.z.max(current.pos.z),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, UnitQuaternion, Vector3};

    fn make_state(alt: f64, vz: f64) -> RigidBodyState {
        RigidBodyState {
            time: 0.0,
            pos: Vector3::new(0.0, 0.0, alt),
            vel: Vector3::new(0.0, 0.0, vz),
            quat: UnitQuaternion::identity(),
            omega: Vector3::zeros(),
            mass: 100.0,
            inertia: Matrix3::identity(),
        }
    }

    #[test]
    fn apogee_detected_once() {
        let mut det = ApogeeDetector::default();
        let prev = make_state(5000.0, 10.0);
        let curr = make_state(5005.0, -1.0);
        assert_eq!(
            det.check(&prev, &curr),
            Some(FlightEventKind::Apogee { altitude: 5005.0 })
        );
        // Should not fire again
        assert!(det.check(&prev, &curr).is_none());
    }

    #[test]
    fn climbing_is_not_apogee() {
        let mut det = ApogeeDetector::default();
        assert!(det
            .check(&make_state(100.0, 50.0), &make_state(105.0, 49.0))
            .is_none());
    }
}
