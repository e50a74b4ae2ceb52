//! Per-entity body binding: lifecycle state machine plus the two-way
//! transform synchronization protocol.
//!
//! A binding adapts one entity to one physics body. Its state advances on
//! discrete signals only (scene-loaded, geometry-ready, start, stop,
//! remove) — there are no polling callbacks:
//!
//! ```text
//! Uninitialized -> ShapePending -> Ready <-> Playing
//!        any state -> (removed)
//! ```

use tracing::{debug, warn};

use crate::scene::{EntityId, Scene};

use super::body::{BodyConfig, BodyId, RigidBody};
use super::debug::DebugSink;
use super::shape::{Shape, ShapeBuilder, ShapeKind};
use super::world::PhysicsWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Attached, waiting for the scene to finish loading.
    Uninitialized,
    /// Scene loaded; shape construction has not succeeded yet.
    ShapePending,
    /// Body exists but is not registered with the world.
    Ready,
    /// Body and binding are registered; it takes part in step phases.
    Playing,
}

pub struct BodyBinding {
    entity: EntityId,
    state: BindingState,
    config: BodyConfig,
    body: Option<RigidBody>,
    start_requested: bool,
}

impl BodyBinding {
    pub(crate) fn new(entity: EntityId, config: BodyConfig) -> Self {
        Self {
            entity,
            state: BindingState::Uninitialized,
            config,
            body: None,
            start_requested: false,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn body(&self) -> Option<&RigidBody> {
        self.body.as_ref()
    }

    pub(crate) fn body_mut(&mut self) -> Option<&mut RigidBody> {
        self.body.as_mut()
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.state == BindingState::Playing
    }

    pub(crate) fn wants_start(&self) -> bool {
        self.start_requested
    }

    pub(crate) fn request_start(&mut self) {
        self.start_requested = true;
    }

    /// Scene finished loading: leave `Uninitialized` and attempt shape
    /// construction. Returns true if the binding reached `Ready`.
    pub(crate) fn begin_init(
        &mut self,
        scene: &mut Scene,
        builder: &dyn ShapeBuilder,
        next_body_id: &mut u32,
    ) -> bool {
        if self.state != BindingState::Uninitialized {
            return false;
        }
        self.state = BindingState::ShapePending;
        self.try_build(scene, builder, next_body_id)
    }

    /// Shape-construction attempt; the single re-entry point for the
    /// geometry-ready retry. A builder returning `None` keeps the binding
    /// pending — that is a retry point, not an error.
    pub(crate) fn try_build(
        &mut self,
        scene: &mut Scene,
        builder: &dyn ShapeBuilder,
        next_body_id: &mut u32,
    ) -> bool {
        if self.state != BindingState::ShapePending {
            return false;
        }

        let shapes: Vec<Shape> = if self.config.shape.kind == ShapeKind::None {
            // Explicitly shapeless: no construction, empty shape set.
            Vec::new()
        } else {
            let node = scene.entity(self.entity);
            let Some(geometry) = node.geometry.as_ref() else {
                debug!(entity = %self.entity, "no geometry yet, body stays pending");
                return false;
            };
            let Some(shape) = builder.build(geometry, &self.config.shape) else {
                debug!(entity = %self.entity, "shape builder not ready, body stays pending");
                return false;
            };
            vec![shape]
        };

        let id = BodyId(*next_body_id);
        *next_body_id += 1;

        let world_transform = scene.world_transform(self.entity);
        let body = RigidBody::new(id, self.entity, &self.config, world_transform, shapes);

        // Establish the symmetric entity<->body back-reference. Severed only
        // in teardown; the two sides must never disagree.
        scene.entity_mut(self.entity).body = Some(id);
        self.body = Some(body);
        self.state = BindingState::Ready;
        debug!(entity = %self.entity, body = %id, "physics body created");
        true
    }

    /// `Ready -> Playing`: one scene→physics sync, then exactly one
    /// `add_component`/`add_body` pair, then the wireframe.
    pub(crate) fn enter_playing(
        &mut self,
        scene: &Scene,
        world: &mut PhysicsWorld,
        mut sink: Option<&mut (dyn DebugSink + 'static)>,
    ) {
        if self.state != BindingState::Ready {
            return;
        }
        self.sync_to_physics(scene, None);

        let body = self
            .body
            .as_ref()
            .unwrap_or_else(|| panic!("binding for {} is Ready without a body", self.entity));
        world.add_component(self.entity);
        world.add_body(body);
        if let Some(sink) = sink.as_deref_mut() {
            sink.attach(body.id(), &body.shapes);
            sink.update(body.id(), body.transform());
        }
        self.state = BindingState::Playing;
    }

    /// `Playing -> Ready`: matching remove pair; body and cross-references
    /// persist until removal.
    pub(crate) fn exit_playing(
        &mut self,
        world: &mut PhysicsWorld,
        sink: Option<&mut (dyn DebugSink + 'static)>,
    ) {
        if self.state != BindingState::Playing {
            return;
        }
        let body = self
            .body
            .as_ref()
            .unwrap_or_else(|| panic!("binding for {} is Playing without a body", self.entity));
        world.remove_component(self.entity);
        world.remove_body(body);
        if let Some(sink) = sink {
            sink.detach(body.id());
        }
        self.state = BindingState::Ready;
        self.start_requested = false;
    }

    /// Any state -> removed. Unregisters if playing, severs the entity↔body
    /// pair, discards body and wireframe. Safe to call with no live body.
    pub(crate) fn teardown(
        &mut self,
        scene: &mut Scene,
        world: &mut PhysicsWorld,
        mut sink: Option<&mut (dyn DebugSink + 'static)>,
    ) {
        if self.state == BindingState::Playing {
            self.exit_playing(world, sink.as_deref_mut());
        }
        if let Some(body) = self.body.take() {
            // The entity may already be despawned; only clear the back
            // reference if it still exists.
            if let Some(node) = scene.get_mut(self.entity) {
                node.body = None;
            }
            debug!(entity = %self.entity, body = %body.id(), "physics body destroyed");
        }
        self.state = BindingState::Uninitialized;
        self.start_requested = false;
    }

    /// Apply a property update. Mass recomputes derived properties, damping
    /// applies to dynamic bodies only, and kind/shape changes after body
    /// creation are flagged but not applied.
    pub(crate) fn update_config(&mut self, new: BodyConfig) {
        let Some(body) = self.body.as_mut() else {
            // No body yet: the new configuration simply replaces the old.
            self.config = new;
            return;
        };

        if new.kind != self.config.kind {
            warn!(
                entity = %self.entity,
                "body type changes after creation are not supported, keeping {:?}",
                self.config.kind
            );
        }
        if new.shape.kind != self.config.shape.kind {
            warn!(
                entity = %self.entity,
                "shape changes after creation are not supported, keeping {:?}",
                self.config.shape.kind
            );
        }

        self.config.mass = new.mass;
        body.set_mass(self.config.effective_mass());

        if !body.is_static() {
            self.config.linear_damping = new.linear_damping;
            self.config.angular_damping = new.angular_damping;
            body.linear_damping = new.linear_damping;
            body.angular_damping = new.angular_damping;
        }
    }

    /// Scene → physics. Scene is authoritative: push the entity's transform
    /// (world-space unless root-parented, where local == world) and its
    /// velocity into the body, then refresh derived properties and the
    /// wireframe. Tolerates a missing body.
    pub(crate) fn sync_to_physics(&mut self, scene: &Scene, sink: Option<&mut (dyn DebugSink + 'static)>) {
        let Some(body) = self.body.as_mut() else {
            return;
        };

        let node = scene.entity(self.entity);
        if let Some(velocity) = node.velocity {
            body.linear_velocity = velocity.linear;
        }

        let transform = if node.parent().is_none() {
            node.local_transform()
        } else {
            scene.world_transform(self.entity)
        };
        body.set_transform(transform);
        body.update_mass_properties();

        if let Some(sink) = sink {
            sink.update(body.id(), body.transform());
        }
    }

    /// Physics → scene. Physics is authoritative: pull the body's world
    /// transform back into the entity's local frame (direct copy when
    /// root-parented, otherwise inverse-composed through the parent chain),
    /// then refresh the wireframe. Tolerates a missing body.
    pub(crate) fn sync_from_physics(&mut self, scene: &mut Scene, sink: Option<&mut (dyn DebugSink + 'static)>) {
        let Some(body) = self.body.as_ref() else {
            return;
        };

        scene.set_world_transform(self.entity, body.transform());

        if let Some(sink) = sink {
            sink.update(body.id(), body.transform());
        }
    }
}
