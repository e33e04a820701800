//! Recovery event state machine.
//!
//! Events start disarmed, are armed when the vehicle leaves the rail and fire
//! at most once. Fired events stay fired for the rest of the run; their
//! parachutes make up the deployed drag profile.

pub mod event;
pub mod parachute;

use log::info;

pub use event::{EventStatus, RecoveryEvent, Trigger};
pub use parachute::Parachute;

use crate::error::SimError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recovery {
    events: Vec<RecoveryEvent>,
    deployed: Vec<Parachute>,
    has_ascended: bool,
}

impl Recovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, trigger: Trigger, parachute: Parachute) -> Result<(), SimError> {
        self.events.push(RecoveryEvent::new(trigger, parachute)?);
        Ok(())
    }

    pub fn with_event(mut self, trigger: Trigger, parachute: Parachute) -> Result<Self, SimError> {
        self.add_event(trigger, parachute)?;
        Ok(self)
    }

    pub fn events(&self) -> &[RecoveryEvent] {
        &self.events
    }

    /// Parachutes of every fired event, in firing order.
    pub fn deployed_parachutes(&self) -> &[Parachute] {
        &self.deployed
    }

    pub fn any_fired(&self) -> bool {
        !self.deployed.is_empty()
    }

    /// Arm every disarmed event. Called once at rail exit.
    pub fn arm(&mut self) {
        for e in &mut self.events {
            if e.status == EventStatus::Disarmed {
                e.status = EventStatus::Armed;
            }
        }
    }

    /// Evaluate all armed events against one sample of the flight and return
    /// the indices of those that fired on this call.
    pub fn evaluate(&mut self, time: f64, altitude: f64, vertical_velocity: f64) -> Vec<usize> {
        if vertical_velocity > 0.0 {
            self.has_ascended = true;
        }
        let mut fired = Vec::new();
        for (i, e) in self.events.iter_mut().enumerate() {
            if e.status != EventStatus::Armed {
                continue;
            }
            if e.condition(time, altitude, vertical_velocity, self.has_ascended) {
                e.status = EventStatus::Fired { time, altitude };
                self.deployed.push(e.parachute);
                info!(
                    "recovery event {} fired at t={:.2} s, {:.1} m: {} parachute {:.2} m",
                    i,
                    time,
                    altitude,
                    e.parachute.label(),
                    e.parachute.diameter()
                );
                fired.push(i);
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concorde_recovery() -> Recovery {
        Recovery::new()
            .with_event(
                Trigger::Apogee { min_time: 1.0 },
                Parachute::Hemispherical { diameter: 1.25 },
            )
            .unwrap()
            .with_event(
                Trigger::Altitude { altitude: 450.0 },
                Parachute::Hemispherical { diameter: 2.66 },
            )
            .unwrap()
    }

    #[test]
    fn disarmed_events_never_fire() {
        let mut r = concorde_recovery();
        r.evaluate(0.5, 10.0, 5.0);
        assert!(r.evaluate(20.0, 100.0, -3.0).is_empty());
        assert!(!r.any_fired());
    }

    #[test]
    fn apogee_then_altitude() {
        let mut r = concorde_recovery();
        r.arm();
        assert!(r.evaluate(5.0, 800.0, 120.0).is_empty());
        assert_eq!(r.evaluate(12.0, 1500.0, -0.1), vec![0]);
        assert!(r.evaluate(40.0, 900.0, -30.0).is_empty());
        assert_eq!(r.evaluate(60.0, 449.0, -30.0), vec![1]);
        assert_eq!(r.deployed_parachutes().len(), 2);
    }

    #[test]
    fn fired_event_is_idempotent() {
        let mut r = concorde_recovery();
        r.arm();
        r.evaluate(5.0, 800.0, 50.0);
        assert_eq!(r.evaluate(10.0, 1000.0, -1.0), vec![0]);
        let status = r.events()[0].status;
        // Velocity sign flips again: nothing re-fires.
        r.evaluate(11.0, 1001.0, 3.0);
        assert!(r.evaluate(12.0, 1000.0, -1.0).is_empty());
        assert_eq!(r.events()[0].status, status);
        assert_eq!(r.deployed_parachutes().len(), 1);
    }

    #[test]
    fn arming_does_not_reset_fired_events() {
        let mut r = concorde_recovery();
        r.arm();
        r.evaluate(2.0, 50.0, 10.0);
        r.evaluate(3.0, 60.0, -1.0);
        r.arm();
        assert!(r.events()[0].is_fired());
    }
}
