//! Rigid body state mirrored from (or into) the scene graph.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::EntityId;
use crate::utils::math::Transform;

use super::shape::{Shape, ShapeOptions};

/// Handle to a live physics body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BodyKind {
    /// Scene-driven; mass is forced to zero.
    Static,
    /// Physics-driven.
    #[default]
    Dynamic,
}

/// Requested body properties, supplied when attaching a binding.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyConfig {
    pub kind: BodyKind,
    /// Mass in kg; ignored (treated as zero) for static bodies.
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub shape: ShapeOptions,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            mass: 5.0,
            linear_damping: 0.01,
            angular_damping: 0.01,
            shape: ShapeOptions::default(),
        }
    }
}

impl BodyConfig {
    /// The mass the body actually carries: static bodies are pinned at zero.
    pub fn effective_mass(&self) -> f32 {
        match self.kind {
            BodyKind::Static => 0.0,
            BodyKind::Dynamic => self.mass,
        }
    }
}

/// Mass, damping, shapes and world-space transform of one simulated body.
/// Created by its binding once shape data resolves; destroyed with it.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub(crate) id: BodyId,
    pub(crate) entity: EntityId,
    pub kind: BodyKind,
    pub mass: f32,
    pub inverse_mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub shapes: Vec<Shape>,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
}

impl RigidBody {
    pub(crate) fn new(
        id: BodyId,
        entity: EntityId,
        config: &BodyConfig,
        world: Transform,
        shapes: Vec<Shape>,
    ) -> Self {
        let mut body = Self {
            id,
            entity,
            kind: config.kind,
            mass: config.effective_mass(),
            inverse_mass: 0.0,
            linear_damping: config.linear_damping,
            angular_damping: config.angular_damping,
            shapes,
            position: world.position,
            rotation: world.rotation,
            linear_velocity: Vec3::ZERO,
        };
        body.update_mass_properties();
        body
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    /// The entity this body mirrors (the body side of the entity↔body pair).
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Zero-mass bodies are scene-driven (static/kinematic).
    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(0.0);
        self.update_mass_properties();
    }

    /// Recompute derived mass properties after a mass change.
    pub fn update_mass_properties(&mut self) {
        self.inverse_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_config_pins_mass_to_zero() {
        let config = BodyConfig {
            kind: BodyKind::Static,
            mass: 10.0,
            ..BodyConfig::default()
        };
        let body = RigidBody::new(
            BodyId(0),
            EntityId(0),
            &config,
            Transform::IDENTITY,
            Vec::new(),
        );
        assert!(body.is_static());
        assert_eq!(body.inverse_mass, 0.0);
    }

    #[test]
    fn mass_change_recomputes_inverse() {
        let mut body = RigidBody::new(
            BodyId(1),
            EntityId(0),
            &BodyConfig::default(),
            Transform::IDENTITY,
            Vec::new(),
        );
        assert!((body.inverse_mass - 0.2).abs() < 1e-6);
        body.set_mass(0.0);
        assert_eq!(body.inverse_mass, 0.0);
        assert!(body.is_static());
    }
}
