use thiserror::Error;

/// Failures raised by the leaf models and the simulation engines.
///
/// Every variant is terminal for the run that produced it: the engine stops at
/// the current step and keeps its last valid state and history for diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(
        "invalid grain geometry at t={time:.4} s: burning area {area:.3e} m^2 \
         with {propellant_mass:.4} kg of propellant remaining"
    )]
    InvalidGeometryState {
        time: f64,
        area: f64,
        propellant_mass: f64,
    },

    #[error("numerical divergence at t={time:.4} s: {quantity} = {value}")]
    NumericalDivergence {
        time: f64,
        quantity: &'static str,
        value: f64,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("simulation fault at t={time:.4} s: {reason}")]
    SimulationFault { time: f64, reason: String },
}

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SimError::Configuration(msg.into())
    }
}

/// Reject non-finite or non-positive values for a named quantity.
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::config(format!("{name} must be positive, got {value}")))
    }
}

/// Reject non-finite or negative values for a named quantity.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::config(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_check_rejects_zero_and_nan() {
        assert!(ensure_positive("d_t", 0.01).is_ok());
        assert!(ensure_positive("d_t", 0.0).is_err());
        assert!(ensure_positive("d_t", f64::NAN).is_err());
        assert!(ensure_non_negative("spacing", 0.0).is_ok());
        assert!(ensure_non_negative("spacing", -1e-3).is_err());
    }

    #[test]
    fn messages_name_the_quantity() {
        let err = ensure_positive("rail_length", -5.0).unwrap_err();
        assert!(err.to_string().contains("rail_length"));
    }
}
