pub mod settings;

// Re-export commonly used types
pub use settings::{
    PhysicsSettings, DEFAULT_MAX_INTERVAL,
    save_physics_settings, load_physics_settings,
};
