use nalgebra::Vector3;

use crate::dynamics::state::RigidBodyState;
use crate::physics::atmosphere::AtmosphereState;
use crate::recovery::Parachute;
use crate::vehicle::Fuselage;

/// Aerodynamic loads about the CG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroLoads {
    pub force: Vector3<f64>,  // N, world frame
    pub moment: Vector3<f64>, // N·m, body frame
}

impl Default for AeroLoads {
    fn default() -> Self {
        Self {
            force: Vector3::zeros(),
            moment: Vector3::zeros(),
        }
    }
}

/// Aerodynamics collaborator consumed by the flight engine. `deployed` lists
/// the parachutes currently open.
pub trait AerodynamicsModel {
    fn forces(
        &self,
        state: &RigidBodyState,
        atmosphere: &AtmosphereState,
        deployed: &[Parachute],
    ) -> AeroLoads;
}

// ---------------------------------------------------------------------------
// Rocket aerodynamics
// ---------------------------------------------------------------------------

/// Barrowman-style model of a finned rocket in still air.
#[derive(Debug, Clone)]
pub struct RocketAerodynamics {
    fuselage: Fuselage,
    reference_area: f64,
    normal_force_slope: f64,
    static_margin: f64,
    /// Σ CNα_i · (x_i − x_cg)², the pitch-damping lever.
    damping_lever: f64,
}

impl RocketAerodynamics {
    pub fn new(fuselage: &Fuselage) -> Self {
        let stability = fuselage.stability();
        let cg = fuselage.center_of_gravity;
        let damping_lever = fuselage
            .lifting_components()
            .iter()
            .map(|(cn, x)| cn * (x - cg).powi(2))
            .sum();
        Self {
            fuselage: fuselage.clone(),
            reference_area: fuselage.reference_area(),
            normal_force_slope: stability.normal_force_slope,
            static_margin: stability.center_of_pressure - cg,
            damping_lever,
        }
    }

    pub fn static_margin(&self) -> f64 {
        self.static_margin
    }

    pub fn drag_coefficient(&self, speed: f64, atm: &AtmosphereState) -> f64 {
        let mach = speed / atm.sound_speed;
        let reynolds = atm.density * speed * self.fuselage.length() / atm.viscosity;
        self.fuselage.drag_coefficient(mach, reynolds)
    }
}

impl AerodynamicsModel for RocketAerodynamics {
    fn forces(
        &self,
        state: &RigidBodyState,
        atm: &AtmosphereState,
        deployed: &[Parachute],
    ) -> AeroLoads {
        let speed = state.vel.norm();
        if speed <= 1e-6 {
            return AeroLoads::default();
        }
        let area = self.reference_area;
        let q_dyn = 0.5 * atm.density * speed * speed;

        let cd = self.drag_coefficient(speed, atm);
        let chute_area: f64 = deployed.iter().map(Parachute::drag_area).sum();
        let mut force =
            drag_force(&state.vel, atm, cd, area) + drag_force(&state.vel, atm, 1.0, chute_area);

        let vel_body = state.body_velocity();
        let normal_body = normal_force(&vel_body, speed, q_dyn, area, self.normal_force_slope);
        force += state.quat * normal_body;

        let moment = restoring_moment(&normal_body, self.static_margin)
            + damping_moment(&state.omega, speed, atm, area, self.damping_lever);

        AeroLoads { force, moment }
    }
}

// ---------------------------------------------------------------------------
// Force and moment terms
// ---------------------------------------------------------------------------

/// Aerodynamic drag force (world frame, opposing velocity).
pub fn drag_force(vel: &Vector3<f64>, atm: &AtmosphereState, cd: f64, area: f64) -> Vector3<f64> {
    let speed = vel.norm();
    if speed > 1e-6 {
        let q_dyn = 0.5 * atm.density * speed * speed;
        let drag_mag = q_dyn * cd * area;
        -vel.normalize() * drag_mag
    } else {
        Vector3::zeros()
    }
}

/// Normal force in the body frame, opposing the crosswise velocity.
/// Scales with sin α so it vanishes at α = 0 and α = 180°.
pub fn normal_force(
    vel_body: &Vector3<f64>,
    speed: f64,
    q_dyn: f64,
    area: f64,
    cn_alpha: f64,
) -> Vector3<f64> {
    if speed <= 1.0 {
        return Vector3::zeros();
    }
    let lateral = Vector3::new(vel_body.x, vel_body.y, 0.0);
    -lateral / speed * (q_dyn * area * cn_alpha)
}

/// Restoring moment (body frame) of the normal force acting at the CP,
/// `static_margin` metres aft of the CG along body −Z.
pub fn restoring_moment(normal_body: &Vector3<f64>, static_margin: f64) -> Vector3<f64> {
    let arm = Vector3::new(0.0, 0.0, -static_margin);
    arm.cross(normal_body)
}

/// Pitch/yaw damping torque (body frame, proportional to angular rate).
/// Roll is undamped.
pub fn damping_moment(
    omega: &Vector3<f64>,
    speed: f64,
    atm: &AtmosphereState,
    area: f64,
    lever: f64,
) -> Vector3<f64> {
    if speed <= 1.0 {
        return Vector3::zeros();
    }
    let damp = 0.5 * atm.density * speed * area * lever;
    -Vector3::new(omega.x, omega.y, 0.0) * damp
}
