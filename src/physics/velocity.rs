//! Constant-velocity integrator.
//!
//! With no physics system present, entities carrying a [`Velocity`] advance
//! their local position by `velocity * dt` every frame tick. When a physics
//! system is registered, the same integration runs in the system's
//! after-step phase using the system's clamped interval instead of the raw
//! frame delta (see [`crate::physics::PhysicsSystem::tick`]).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::scene::Scene;

/// Constant linear velocity attached to one entity, in world units per
/// second. Mutable via configuration updates; lives and dies with the
/// entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
}

impl Velocity {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            linear: Vec3::new(x, y, z),
        }
    }

    pub fn from_vec(linear: Vec3) -> Self {
        Self { linear }
    }

    pub fn is_zero(&self) -> bool {
        self.linear == Vec3::ZERO
    }
}

/// Frame tick for scenes without a physics system: advance every velocity
/// carrier's local position by the raw frame delta. Never fails.
pub fn integrate_free(scene: &mut Scene, dt: f32) {
    if !(dt > 0.0) {
        return;
    }
    for id in scene.ids() {
        let Some(velocity) = scene.entity(id).velocity else {
            continue;
        };
        if velocity.is_zero() {
            continue;
        }
        scene.entity_mut(id).position += velocity.linear * dt;
    }
}

/// After-step integration: advance world positions directly on the render
/// transform, bypassing the solver. `clamped_dt` is the physics system's
/// capped interval — authoritative even when far below the real frame delta.
pub(crate) fn integrate_step(scene: &mut Scene, clamped_dt: f32) {
    if !(clamped_dt > 0.0) {
        return;
    }
    for id in scene.ids() {
        let Some(velocity) = scene.entity(id).velocity else {
            continue;
        };
        if velocity.is_zero() {
            continue;
        }
        scene.translate_world(id, velocity.linear * clamped_dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_integration_is_exact_per_axis() {
        let mut scene = Scene::new();
        let id = scene.spawn(None);
        scene.set_velocity(id, Velocity::new(1.0, 2.0, 3.0));

        integrate_free(&mut scene, 0.1);

        let pos = scene.entity(id).position;
        assert_eq!(pos, Vec3::new(1.0, 2.0, 3.0) * 0.1);
    }

    #[test]
    fn zero_or_invalid_dt_is_a_no_op() {
        let mut scene = Scene::new();
        let id = scene.spawn(None);
        scene.set_velocity(id, Velocity::new(5.0, 0.0, 0.0));

        integrate_free(&mut scene, 0.0);
        integrate_free(&mut scene, -1.0);
        integrate_free(&mut scene, f32::NAN);

        assert_eq!(scene.entity(id).position, Vec3::ZERO);
    }
}
