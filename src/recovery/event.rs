use serde::{Deserialize, Serialize};

use super::parachute::Parachute;
use crate::error::{ensure_non_negative, SimError};

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// Condition that deploys a parachute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Trigger {
    /// Vertical velocity has turned non-positive after an ascent, no earlier
    /// than `min_time` seconds into the flight.
    #[serde(rename = "apogee")]
    Apogee {
        #[serde(default)]
        min_time: f64,
    },
    /// Descending through `altitude` metres above the launch site.
    #[serde(rename = "altitude")]
    Altitude { altitude: f64 },
}

impl Trigger {
    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            Trigger::Apogee { min_time } => ensure_non_negative("apogee minimum time", min_time),
            Trigger::Altitude { altitude } => ensure_non_negative("deployment altitude", altitude),
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum EventStatus {
    /// Not yet evaluated (vehicle still on the rail).
    Disarmed,
    Armed,
    Fired { time: f64, altitude: f64 },
}

/// A trigger bound to the parachute it releases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryEvent {
    pub trigger: Trigger,
    pub parachute: Parachute,
    pub status: EventStatus,
}

impl RecoveryEvent {
    pub fn new(trigger: Trigger, parachute: Parachute) -> Result<Self, SimError> {
        trigger.validate()?;
        parachute.validate()?;
        Ok(Self {
            trigger,
            parachute,
            status: EventStatus::Disarmed,
        })
    }

    pub fn is_fired(&self) -> bool {
        matches!(self.status, EventStatus::Fired { .. })
    }

    /// Whether the trigger condition holds for this sample. Does not look at
    /// the status.
    pub(crate) fn condition(
        &self,
        time: f64,
        altitude: f64,
        vertical_velocity: f64,
        has_ascended: bool,
    ) -> bool {
        match self.trigger {
            Trigger::Apogee { min_time } => {
                has_ascended && vertical_velocity <= 0.0 && time >= min_time
            }
            Trigger::Altitude { altitude: deploy } => {
                vertical_velocity < 0.0 && altitude <= deploy
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drogue() -> Parachute {
        Parachute::Hemispherical { diameter: 1.25 }
    }

    #[test]
    fn apogee_needs_prior_ascent() {
        let e = RecoveryEvent::new(Trigger::Apogee { min_time: 0.0 }, drogue()).unwrap();
        assert!(!e.condition(10.0, 500.0, -1.0, false));
        assert!(e.condition(10.0, 500.0, -1.0, true));
        assert!(e.condition(10.0, 500.0, 0.0, true));
        assert!(!e.condition(10.0, 500.0, 2.0, true));
    }

    #[test]
    fn apogee_respects_min_time() {
        let e = RecoveryEvent::new(Trigger::Apogee { min_time: 5.0 }, drogue()).unwrap();
        assert!(!e.condition(4.0, 100.0, -1.0, true));
        assert!(e.condition(5.0, 100.0, -1.0, true));
    }

    #[test]
    fn altitude_fires_only_when_descending() {
        let e = RecoveryEvent::new(Trigger::Altitude { altitude: 450.0 }, drogue()).unwrap();
        assert!(!e.condition(3.0, 300.0, 50.0, true));
        assert!(!e.condition(30.0, 600.0, -20.0, true));
        assert!(e.condition(40.0, 449.0, -20.0, true));
    }

    #[test]
    fn negative_altitude_trigger_is_rejected() {
        assert!(RecoveryEvent::new(Trigger::Altitude { altitude: -1.0 }, drogue()).is_err());
    }
}
