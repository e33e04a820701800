use nalgebra::{Quaternion, Vector3};

use crate::dynamics::state::{Deriv, RigidBodyState};
use crate::error::SimError;
use crate::physics::aerodynamics::AeroLoads;

// ---------------------------------------------------------------------------
// 6DOF Equations of motion
// ---------------------------------------------------------------------------

/// Full 6DOF state derivatives in free flight.
///
/// Forces & moments:
///   1. Gravity (world -Z)
///   2. Thrust along body +Z
///   3. Aerodynamic force (world frame) and moment (body frame, about CG)
///
/// Rotation follows Euler's equation with the full inertia tensor,
/// `I ω̇ = M − ω × (I ω)`. The rate of change of the tensor itself is
/// neglected.
pub fn free_flight(
    state: &RigidBodyState,
    thrust: f64,
    aero: &AeroLoads,
    gravity: f64,
) -> Result<Deriv, SimError> {
    let f_gravity = Vector3::new(0.0, 0.0, -gravity * state.mass);
    let f_thrust = state.quat * Vector3::new(0.0, 0.0, thrust);
    let accel = (f_gravity + f_thrust + aero.force) / state.mass;

    let inv_inertia = state
        .inertia
        .try_inverse()
        .ok_or(SimError::NumericalDivergence {
            time: state.time,
            quantity: "inertia determinant",
            value: state.inertia.determinant(),
        })?;
    let i_omega = state.inertia * state.omega;
    let domega = inv_inertia * (aero.moment - state.omega.cross(&i_omega));

    // Quaternion kinematics: dq/dt = 0.5 * q * omega_quat
    let omega_quat = Quaternion::new(0.0, state.omega.x, state.omega.y, state.omega.z);
    let dquat = state.quat.quaternion() * omega_quat * 0.5;

    Ok(Deriv {
        dpos: state.vel,
        dvel: accel,
        dquat,
        domega,
    })
}

/// Derivatives while the launch lug rides the rail.
///
/// Only the force component along `rail` (unit vector) accelerates the body;
/// attitude is locked to the rail. At the rail foot the vehicle rests on the
/// pad until the net force points up the rail.
pub fn on_rail(
    state: &RigidBodyState,
    rail: &Vector3<f64>,
    thrust: f64,
    aero: &AeroLoads,
    gravity: f64,
) -> Deriv {
    let f_gravity = Vector3::new(0.0, 0.0, -gravity * state.mass);
    let f_along = (f_gravity + aero.force).dot(rail) + thrust;

    let displacement = state.pos.dot(rail);
    let speed = state.vel.dot(rail);
    let resting = displacement <= 0.0 && speed <= 0.0 && f_along <= 0.0;

    let accel = if resting { 0.0 } else { f_along / state.mass };

    Deriv {
        dpos: rail * speed,
        dvel: rail * accel,
        ..Deriv::zero()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, UnitQuaternion};

    fn pad_state() -> RigidBodyState {
        RigidBodyState {
            time: 0.0,
            pos: Vector3::zeros(),
            vel: Vector3::zeros(),
            quat: UnitQuaternion::identity(),
            omega: Vector3::zeros(),
            mass: 50.0,
            inertia: Matrix3::from_diagonal(&Vector3::new(10.0, 10.0, 0.2)),
        }
    }

    #[test]
    fn net_upward_accel_with_thrust() {
        let s = pad_state();
        let d = free_flight(&s, 2000.0, &AeroLoads::default(), 9.81).unwrap();
        assert!((d.dvel.z - (2000.0 / 50.0 - 9.81)).abs() < 1e-12);
    }

    #[test]
    fn aero_moment_spins_up_body() {
        let s = pad_state();
        let loads = AeroLoads {
            force: Vector3::zeros(),
            moment: Vector3::new(5.0, 0.0, 0.0),
        };
        let d = free_flight(&s, 0.0, &loads, 9.81).unwrap();
        assert!((d.domega.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn off_diagonal_inertia_couples_axes() {
        let mut s = pad_state();
        s.inertia[(0, 1)] = 1.0;
        s.inertia[(1, 0)] = 1.0;
        let loads = AeroLoads {
            force: Vector3::zeros(),
            moment: Vector3::new(5.0, 0.0, 0.0),
        };
        let d = free_flight(&s, 0.0, &loads, 9.81).unwrap();
        assert!(d.domega.y.abs() > 1e-6);
    }

    #[test]
    fn torque_free_symmetric_spin_is_steady() {
        let mut s = pad_state();
        s.omega = Vector3::new(0.0, 0.0, 3.0);
        let d = free_flight(&s, 0.0, &AeroLoads::default(), 9.81).unwrap();
        assert!(d.domega.norm() < 1e-12);
    }

    #[test]
    fn singular_inertia_is_divergence() {
        let mut s = pad_state();
        s.inertia = Matrix3::zeros();
        let err = free_flight(&s, 0.0, &AeroLoads::default(), 9.81).unwrap_err();
        assert!(matches!(err, SimError::NumericalDivergence { .. }));
    }

    #[test]
    fn quat_deriv_zero_at_rest() {
        let d = free_flight(&pad_state(), 0.0, &AeroLoads::default(), 9.81).unwrap();
        assert!(d.dquat.norm() < 1e-12, "No rotation → zero quat derivative");
    }

    #[test]
    fn pad_holds_vehicle_without_thrust() {
        let rail = Vector3::new(0.0, 0.0, 1.0);
        let d = on_rail(&pad_state(), &rail, 0.0, &AeroLoads::default(), 9.81);
        assert_eq!(d.dvel, Vector3::zeros());
        assert_eq!(d.dpos, Vector3::zeros());
    }

    #[test]
    fn rail_projects_forces_on_its_axis() {
        let el = 80f64.to_radians();
        let rail = Vector3::new(el.cos(), 0.0, el.sin());
        let d = on_rail(&pad_state(), &rail, 1000.0, &AeroLoads::default(), 9.81);
        let expected = (1000.0 - 50.0 * 9.81 * el.sin()) / 50.0;
        assert!((d.dvel.dot(&rail) - expected).abs() < 1e-9);
        assert!(d.dvel.cross(&rail).norm() < 1e-12);
        assert!(d.domega.norm() == 0.0);
    }
}
