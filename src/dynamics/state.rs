use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// 6DOF State: position, velocity, attitude, angular rate, mass properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyState {
    pub time: f64,
    pub pos: Vector3<f64>,         // m, ENU, origin at the rail foot
    pub vel: Vector3<f64>,         // m/s, world frame
    pub quat: UnitQuaternion<f64>, // body→world rotation
    pub omega: Vector3<f64>,       // rad/s, body frame angular velocity
    pub mass: f64,                 // kg
    pub inertia: Matrix3<f64>,     // kg·m^2, body frame about the CG
}

impl RigidBodyState {
    /// Euler update used for the intermediate RK4 stages. Mass properties are
    /// held over the step.
    pub fn apply(&self, d: &Deriv, dt: f64) -> RigidBodyState {
        let q_raw = self.quat.quaternion() + d.dquat * dt;
        RigidBodyState {
            time: self.time + dt,
            pos: self.pos + d.dpos * dt,
            vel: self.vel + d.dvel * dt,
            quat: UnitQuaternion::new_normalize(q_raw),
            omega: self.omega + d.domega * dt,
            mass: self.mass,
            inertia: self.inertia,
        }
    }

    /// Body Z-axis (thrust direction, towards the nose) in the world frame.
    pub fn body_z(&self) -> Vector3<f64> {
        self.quat * Vector3::z()
    }

    /// Height above the launch site.
    pub fn altitude(&self) -> f64 {
        self.pos.z
    }

    /// Pitch angle from local horizontal (rad). Positive = nose up.
    pub fn pitch(&self) -> f64 {
        self.body_z().z.clamp(-1.0, 1.0).asin()
    }

    /// Angle of attack (rad), between velocity and body Z-axis.
    pub fn alpha(&self) -> f64 {
        let speed = self.vel.norm();
        if speed < 1.0 {
            return 0.0;
        }
        let cos_alpha = self.vel.dot(&self.body_z()) / speed;
        cos_alpha.clamp(-1.0, 1.0).acos()
    }

    /// Velocity seen in the body frame.
    pub fn body_velocity(&self) -> Vector3<f64> {
        self.quat.inverse() * self.vel
    }

    /// First non-finite component, if any.
    pub fn non_finite(&self) -> Option<(&'static str, f64)> {
        let q = self.quat.quaternion();
        let checks = [
            ("position", self.pos.norm()),
            ("velocity", self.vel.norm()),
            ("attitude", q.norm()),
            ("angular velocity", self.omega.norm()),
            ("mass", self.mass),
        ];
        checks.into_iter().find(|(_, v)| !v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Deriv {
    pub dpos: Vector3<f64>,
    pub dvel: Vector3<f64>,
    pub dquat: Quaternion<f64>, // NOT unit, raw quaternion derivative
    pub domega: Vector3<f64>,   // angular acceleration, body frame
}

impl Deriv {
    /// Body at rest: no motion at all.
    pub fn zero() -> Self {
        Self {
            dpos: Vector3::zeros(),
            dvel: Vector3::zeros(),
            dquat: Quaternion::new(0.0, 0.0, 0.0, 0.0),
            domega: Vector3::zeros(),
        }
    }
}
