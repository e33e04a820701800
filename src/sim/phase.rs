use std::fmt;

use serde::Serialize;

/// Flight phases, in the order the engine may visit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlightPhase {
    OnRail,
    PoweredFlight,
    BallisticAscent,
    BallisticDescent,
    RecoveryDeployed,
    Landed,
}

impl FlightPhase {
    /// Position in the phase ordering. Ascent and descent share a rank
    /// because the vehicle may move between them freely.
    pub fn rank(self) -> u8 {
        match self {
            FlightPhase::OnRail => 0,
            FlightPhase::PoweredFlight => 1,
            FlightPhase::BallisticAscent | FlightPhase::BallisticDescent => 2,
            FlightPhase::RecoveryDeployed => 3,
            FlightPhase::Landed => 4,
        }
    }

    /// Free flight: off the rail and not yet on the ground.
    pub fn is_airborne(self) -> bool {
        !matches!(self, FlightPhase::OnRail | FlightPhase::Landed)
    }

    pub fn label(self) -> &'static str {
        match self {
            FlightPhase::OnRail => "on rail",
            FlightPhase::PoweredFlight => "powered flight",
            FlightPhase::BallisticAscent => "ballistic ascent",
            FlightPhase::BallisticDescent => "ballistic descent",
            FlightPhase::RecoveryDeployed => "recovery deployed",
            FlightPhase::Landed => "landed",
        }
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_flight_order() {
        let order = [
            FlightPhase::OnRail,
            FlightPhase::PoweredFlight,
            FlightPhase::BallisticAscent,
            FlightPhase::RecoveryDeployed,
            FlightPhase::Landed,
        ];
        assert!(order.windows(2).all(|w| w[0].rank() < w[1].rank()));
        assert_eq!(
            FlightPhase::BallisticAscent.rank(),
            FlightPhase::BallisticDescent.rank()
        );
    }

    #[test]
    fn airborne_phases() {
        assert!(!FlightPhase::OnRail.is_airborne());
        assert!(FlightPhase::RecoveryDeployed.is_airborne());
        assert!(!FlightPhase::Landed.is_airborne());
    }
}
