//! Physics world: registration of live bodies and step-notified bindings,
//! plus the external solver seam.

use glam::Vec3;
use tracing::debug;

use crate::scene::EntityId;

use super::body::{BodyId, RigidBody};

/// External constraint/contact solver. The world drives it with the clamped
/// interval; what happens inside a step is not this crate's concern.
pub trait Solver {
    /// Advance the registered bodies by `dt` seconds (already clamped).
    fn step(&mut self, bodies: &mut [&mut RigidBody], gravity: Vec3, dt: f32);
}

/// Solver that leaves every body untouched. Useful until a real engine is
/// wired in, and for purely scene-driven setups.
pub struct NoopSolver;

impl Solver for NoopSolver {
    fn step(&mut self, _bodies: &mut [&mut RigidBody], _gravity: Vec3, _dt: f32) {}
}

/// Running registration counters, mirroring the add/remove protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub bodies_added: u32,
    pub bodies_removed: u32,
    pub components_added: u32,
    pub components_removed: u32,
}

/// Holds the set of live bodies and the bindings notified at before-step /
/// after-step boundaries.
///
/// Invariant: a body is registered here iff its binding is in the playing
/// state.
pub struct PhysicsWorld {
    gravity: Vec3,
    bodies: Vec<BodyId>,
    components: Vec<EntityId>,
    solver: Box<dyn Solver>,
    stats: WorldStats,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3, solver: Box<dyn Solver>) -> Self {
        Self {
            gravity,
            bodies: Vec::new(),
            components: Vec::new(),
            solver,
            stats: WorldStats::default(),
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    pub fn add_body(&mut self, body: &RigidBody) {
        debug_assert!(
            !self.bodies.contains(&body.id()),
            "body {} registered twice",
            body.id()
        );
        self.bodies.push(body.id());
        self.stats.bodies_added += 1;
        debug!(body = %body.id(), entity = %body.entity(), mass = body.mass, "body added to world");
    }

    pub fn remove_body(&mut self, body: &RigidBody) {
        let before = self.bodies.len();
        self.bodies.retain(|id| *id != body.id());
        if self.bodies.len() < before {
            self.stats.bodies_removed += 1;
            debug!(body = %body.id(), "body removed from world");
        }
    }

    pub fn add_component(&mut self, entity: EntityId) {
        debug_assert!(
            !self.components.contains(&entity),
            "binding for entity {entity} registered twice"
        );
        self.components.push(entity);
        self.stats.components_added += 1;
    }

    pub fn remove_component(&mut self, entity: EntityId) {
        let before = self.components.len();
        self.components.retain(|id| *id != entity);
        if self.components.len() < before {
            self.stats.components_removed += 1;
        }
    }

    pub fn has_body(&self, id: BodyId) -> bool {
        self.bodies.contains(&id)
    }

    pub fn has_component(&self, entity: EntityId) -> bool {
        self.components.contains(&entity)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Registered bindings in registration order, for the step phases.
    pub(crate) fn component_ids(&self) -> Vec<EntityId> {
        self.components.clone()
    }

    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    pub(crate) fn step(&mut self, bodies: &mut [&mut RigidBody], dt: f32) {
        self.solver.step(bodies, self.gravity, dt);
    }
}
