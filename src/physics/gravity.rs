use super::{EARTH_RADIUS, G0};

/// Inverse-square gravity magnitude at a geometric altitude above sea level.
pub fn gravity_at(altitude: f64) -> f64 {
    let alt = altitude.max(0.0);
    G0 * (EARTH_RADIUS / (EARTH_RADIUS + alt)).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_gravity() {
        assert!((gravity_at(0.0) - G0).abs() < 1e-9);
    }

    #[test]
    fn gravity_decreases_with_altitude() {
        assert!(gravity_at(100_000.0) < gravity_at(0.0));
    }

    #[test]
    fn below_sea_level_uses_surface_value() {
        assert_eq!(gravity_at(-100.0), gravity_at(0.0));
    }
}
