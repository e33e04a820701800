//! Quasi-1D isentropic nozzle relations for a calorically perfect gas.

/// Vandenkerckhove function Γ(k).
pub fn gamma_function(k: f64) -> f64 {
    k.sqrt() * (2.0 / (k + 1.0)).powf((k + 1.0) / (2.0 * (k - 1.0)))
}

/// Characteristic velocity c* = √(R·T₀) / Γ, m/s.
pub fn characteristic_velocity(k: f64, gas_constant: f64, t0: f64) -> f64 {
    (gas_constant * t0).sqrt() / gamma_function(k)
}

/// Choked mass flow through the throat, kg/s.
pub fn choked_mass_flow(p0: f64, throat_area: f64, k: f64, gas_constant: f64, t0: f64) -> f64 {
    p0 * throat_area * gamma_function(k) / (gas_constant * t0).sqrt()
}

/// Area ratio A/A* for Mach number `mach`.
pub fn area_ratio(mach: f64, k: f64) -> f64 {
    let term = (2.0 / (k + 1.0)) * (1.0 + 0.5 * (k - 1.0) * mach * mach);
    term.powf((k + 1.0) / (2.0 * (k - 1.0))) / mach
}

/// Supersonic exit Mach number for expansion ratio `epsilon`.
///
/// Bisection on the supersonic branch, where the area ratio is monotonic.
pub fn exit_mach(epsilon: f64, k: f64) -> f64 {
    if epsilon <= 1.0 {
        return 1.0;
    }
    let (mut lo, mut hi) = (1.0_f64, 2.0_f64);
    while area_ratio(hi, k) < epsilon && hi < 1e3 {
        hi *= 2.0;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if area_ratio(mid, k) < epsilon {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-12 {
            break;
        }
    }
    0.5 * (lo + hi)
}

/// Static-to-stagnation pressure ratio at Mach `mach`.
pub fn pressure_ratio(mach: f64, k: f64) -> f64 {
    (1.0 + 0.5 * (k - 1.0) * mach * mach).powf(-k / (k - 1.0))
}

/// Fully expanded exhaust velocity for exit-to-chamber pressure ratio.
pub fn exhaust_velocity(pressure_ratio: f64, k: f64, gas_constant: f64, t0: f64) -> f64 {
    let expansion = 1.0 - pressure_ratio.powf((k - 1.0) / k);
    (2.0 * k / (k - 1.0) * gas_constant * t0 * expansion.max(0.0)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gamma_for_air_like_gas() {
        // Γ(1.4) = 0.6847
        assert_relative_eq!(gamma_function(1.4), 0.6847, epsilon = 1e-4);
    }

    #[test]
    fn area_ratio_is_one_at_the_throat() {
        assert_relative_eq!(area_ratio(1.0, 1.2), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn exit_mach_inverts_area_ratio() {
        for eps in [1.5, 4.0, 8.0, 25.0] {
            let m = exit_mach(eps, 1.1361);
            assert!(m > 1.0);
            assert_relative_eq!(area_ratio(m, 1.1361), eps, max_relative = 1e-8);
        }
    }

    #[test]
    fn exit_mach_for_k_1_4_and_eps_4() {
        // Tabulated: ε = 4 → M ≈ 2.94 for k = 1.4
        assert_relative_eq!(exit_mach(4.0, 1.4), 2.94, epsilon = 0.01);
    }

    #[test]
    fn choked_flow_matches_c_star_definition() {
        let (k, r, t0, p0, at) = (1.2, 332.6, 2000.0, 3e6, 1.7e-4);
        let mdot = choked_mass_flow(p0, at, k, r, t0);
        let c_star = characteristic_velocity(k, r, t0);
        assert_relative_eq!(mdot * c_star, p0 * at, max_relative = 1e-12);
    }

    #[test]
    fn exhaust_velocity_grows_with_expansion() {
        let (k, r, t0) = (1.1361, 208.6, 1600.0);
        let v4 = exhaust_velocity(pressure_ratio(exit_mach(4.0, k), k), k, r, t0);
        let v8 = exhaust_velocity(pressure_ratio(exit_mach(8.0, k), k), k, r, t0);
        assert!(v8 > v4);
        assert!(v8 < (2.0 * k / (k - 1.0) * r * t0).sqrt());
    }
}
