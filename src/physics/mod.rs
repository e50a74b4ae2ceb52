//! Scene ↔ rigid-body synchronization.
//!
//! The facade is [`PhysicsSystem`]: it owns the [`PhysicsWorld`], the
//! per-entity [`binding::BodyBinding`]s, and drives the clamped stepping
//! loop. The solver itself and mesh-to-shape extraction are external
//! collaborators behind the [`Solver`] and [`ShapeBuilder`] traits.

pub mod body;
pub mod shape;
pub mod velocity;
pub mod binding;
pub mod world;
pub mod system;
pub mod debug;

// Re-export main types for convenience
pub use body::{BodyConfig, BodyId, BodyKind, RigidBody};
pub use binding::{BindingState, BodyBinding};
pub use debug::{DebugSink, NullDebugSink};
pub use shape::{AabbShapeBuilder, Shape, ShapeBuilder, ShapeKind, ShapeOptions};
pub use system::{clamp_interval, PhysicsSystem};
pub use velocity::{integrate_free, Velocity};
pub use world::{NoopSolver, PhysicsWorld, Solver, WorldStats};

// Error types
use thiserror::Error;

use crate::scene::EntityId;

#[derive(Debug, Clone, Error)]
pub enum PhysicsError {
    #[error("entity {entity} not found in scene")]
    UnknownEntity { entity: EntityId },

    #[error("a body binding is already attached to entity {entity}")]
    BindingExists { entity: EntityId },

    #[error("no body binding attached to entity {entity}")]
    BindingNotFound { entity: EntityId },
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
