// Kinema: scene-graph / rigid-body synchronization layer
// Keeps scene transforms and physics-body transforms consistent across a
// capped-interval stepping loop.

pub mod utils;
pub mod scene;
pub mod physics;
pub mod config;

// Re-export commonly used types for convenience
pub use config::{PhysicsSettings, save_physics_settings, load_physics_settings};
pub use physics::{
    PhysicsSystem, PhysicsWorld, PhysicsError, PhysicsResult,
    BodyConfig, BodyKind, RigidBody, BodyId,
    Shape, ShapeKind, ShapeOptions, ShapeBuilder, AabbShapeBuilder,
    Velocity, Solver, NoopSolver, DebugSink, NullDebugSink,
    clamp_interval, integrate_free,
};
pub use scene::{Scene, Entity, EntityId, Geometry};
pub use utils::math::Transform;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
