//! Minimal entity tree the synchronization layer works against.
//!
//! Entities carry a parent-relative transform; the root of the tree is the
//! scene itself, so an entity without a parent is in world space already.

use std::collections::HashMap;
use std::fmt;

use glam::{Quat, Vec3};

use crate::physics::{BodyId, Velocity};
use crate::utils::math::Transform;

/// Handle to an entity in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque 3D geometry attached to an entity. Shape extraction from it is an
/// external concern; the sync layer only tracks whether it exists yet.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub mesh_id: String,
    /// Local-space bounding half extents, available to shape builders.
    pub half_extents: Vec3,
}

/// A node in the scene tree.
#[derive(Debug, Clone)]
pub struct Entity {
    parent: Option<EntityId>,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Option<Velocity>,
    pub geometry: Option<Geometry>,
    // Back-reference to the physics body, maintained by the body binding.
    pub(crate) body: Option<BodyId>,
}

impl Entity {
    fn new(parent: Option<EntityId>) -> Self {
        Self {
            parent,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: None,
            geometry: None,
            body: None,
        }
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// The physics body mirroring this entity, if one is live.
    pub fn body(&self) -> Option<BodyId> {
        self.body
    }

    pub fn local_transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    pub fn set_local_transform(&mut self, transform: Transform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
    }
}

/// The entity tree plus the scene-level load flag.
pub struct Scene {
    nodes: HashMap<EntityId, Entity>,
    next_id: u32,
    loaded: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
            loaded: false,
        }
    }

    /// Create an entity, optionally parented to an existing one. A `None`
    /// parent means the entity hangs directly off the scene root (local
    /// space == world space).
    pub fn spawn(&mut self, parent: Option<EntityId>) -> EntityId {
        if let Some(parent) = parent {
            assert!(
                self.nodes.contains_key(&parent),
                "spawn under missing parent entity {parent}"
            );
        }
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Entity::new(parent));
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.nodes.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.nodes.get_mut(&id)
    }

    /// Fetch an entity that is contractually expected to exist. A missing
    /// entity here means a dangling parent link or a stale id, which is a
    /// programming error rather than a runtime condition.
    pub fn entity(&self, id: EntityId) -> &Entity {
        match self.nodes.get(&id) {
            Some(node) => node,
            None => panic!("entity {id} missing from scene graph"),
        }
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => panic!("entity {id} missing from scene graph"),
        }
    }

    /// Entity ids in a stable order (id order), for deterministic frame
    /// iteration.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Mark scene load as complete. Deferred body initialization keys off
    /// this via [`crate::physics::PhysicsSystem::scene_loaded`].
    pub fn finish_load(&mut self) {
        self.loaded = true;
    }

    pub fn attach_geometry(&mut self, id: EntityId, geometry: Geometry) {
        self.entity_mut(id).geometry = Some(geometry);
    }

    pub fn set_velocity(&mut self, id: EntityId, velocity: Velocity) {
        self.entity_mut(id).velocity = Some(velocity);
    }

    pub fn clear_velocity(&mut self, id: EntityId) {
        self.entity_mut(id).velocity = None;
    }

    /// Resolve an entity's world transform by walking the parent chain.
    pub fn world_transform(&self, id: EntityId) -> Transform {
        let node = self.entity(id);
        let local = node.local_transform();
        match node.parent {
            None => local,
            Some(parent) => self.world_transform(parent).transform(&local),
        }
    }

    /// World transform of the entity's parent, or `None` when the entity is
    /// parented to the scene root.
    pub fn parent_world_transform(&self, id: EntityId) -> Option<Transform> {
        self.entity(id).parent.map(|p| self.world_transform(p))
    }

    /// Assign an entity's transform given in world space, converting into
    /// the parent's local frame as needed.
    pub fn set_world_transform(&mut self, id: EntityId, world: Transform) {
        let local = match self.parent_world_transform(id) {
            None => world,
            Some(parent) => parent.to_local(&world),
        };
        self.entity_mut(id).set_local_transform(local);
    }

    /// Advance an entity's world position by `delta` without touching its
    /// rotation. Writes through to the local transform.
    pub fn translate_world(&mut self, id: EntityId, delta: Vec3) {
        let local_delta = match self.parent_world_transform(id) {
            None => delta,
            Some(parent) => parent.rotation.inverse() * delta,
        };
        self.entity_mut(id).position += local_delta;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
