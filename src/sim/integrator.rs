use nalgebra::UnitQuaternion;

use crate::dynamics::state::{Deriv, RigidBodyState};
use crate::error::SimError;

// ---------------------------------------------------------------------------
// Classical RK4
// ---------------------------------------------------------------------------

/// Single RK4 step of the rigid body. `derivs` is re-evaluated at every
/// stage, so forces that depend on the state (atmosphere, aerodynamics) are
/// sampled four times per step; anything it captures is held constant.
pub fn rk4_step<F>(state: &RigidBodyState, dt: f64, mut derivs: F) -> Result<RigidBodyState, SimError>
where
    F: FnMut(&RigidBodyState) -> Result<Deriv, SimError>,
{
    let k1 = derivs(state)?;
    let k2 = derivs(&state.apply(&k1, dt * 0.5))?;
    let k3 = derivs(&state.apply(&k2, dt * 0.5))?;
    let k4 = derivs(&state.apply(&k3, dt))?;

    let new_quat_raw = state.quat.quaternion()
        + (k1.dquat + k2.dquat * 2.0 + k3.dquat * 2.0 + k4.dquat) * (dt / 6.0);

    Ok(RigidBodyState {
        time: state.time + dt,
        pos: state.pos + (k1.dpos + 2.0 * k2.dpos + 2.0 * k3.dpos + k4.dpos) * (dt / 6.0),
        vel: state.vel + (k1.dvel + 2.0 * k2.dvel + 2.0 * k3.dvel + k4.dvel) * (dt / 6.0),
        quat: UnitQuaternion::new_normalize(new_quat_raw),
        omega: state.omega
            + (k1.domega + 2.0 * k2.domega + 2.0 * k3.domega + k4.domega) * (dt / 6.0),
        mass: state.mass,
        inertia: state.inertia,
    })
}

/// Single RK4 step of a scalar ODE `y' = f(y)`.
pub fn rk4_scalar<F>(y: f64, h: f64, f: &F) -> f64
where
    F: Fn(f64) -> f64,
{
    let k1 = f(y);
    let k2 = f(y + 0.5 * h * k1);
    let k3 = f(y + 0.5 * h * k2);
    let k4 = f(y + h * k3);
    y + h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Quaternion, Vector3};

    fn body() -> RigidBodyState {
        RigidBodyState {
            time: 0.0,
            pos: Vector3::zeros(),
            vel: Vector3::new(0.0, 0.0, 100.0),
            quat: UnitQuaternion::identity(),
            omega: Vector3::zeros(),
            mass: 10.0,
            inertia: Matrix3::identity(),
        }
    }

    #[test]
    fn scalar_decay_matches_exponential() {
        let mut y = 1.0;
        for _ in 0..100 {
            y = rk4_scalar(y, 0.01, &|v: f64| -2.0 * v);
        }
        assert_relative_eq!(y, (-2.0f64).exp(), max_relative = 1e-7);
    }

    #[test]
    fn constant_gravity_is_exact() {
        let mut s = body();
        for _ in 0..100 {
            s = rk4_step(&s, 0.01, |st| {
                Ok(Deriv {
                    dpos: st.vel,
                    dvel: Vector3::new(0.0, 0.0, -9.81),
                    ..Deriv::zero()
                })
            })
            .unwrap();
        }
        assert_relative_eq!(s.pos.z, 100.0 - 0.5 * 9.81, epsilon = 1e-9);
        assert_relative_eq!(s.time, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn steady_spin_keeps_unit_quaternion() {
        let mut s = body();
        s.omega = Vector3::new(0.3, -0.2, 1.5);
        for _ in 0..1000 {
            s = rk4_step(&s, 0.01, |st| {
                let w = Quaternion::new(0.0, st.omega.x, st.omega.y, st.omega.z);
                Ok(Deriv {
                    dquat: st.quat.quaternion() * w * 0.5,
                    ..Deriv::zero()
                })
            })
            .unwrap();
            assert!((s.quat.quaternion().norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn stage_errors_propagate() {
        let res = rk4_step(&body(), 0.01, |st| {
            Err(SimError::SimulationFault {
                time: st.time,
                reason: "probe".into(),
            })
        });
        assert!(res.is_err());
    }
}
