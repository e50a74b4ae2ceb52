use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use glam::Vec3;
use serde::{Deserialize, Serialize};

const PHYSICS_CONFIG_FILE: &str = "physics.toml";

/// Default cap on the per-step interval, in seconds. Four 60 Hz frames:
/// anything slower (debugger pauses, tab switches) is clamped rather than
/// exploding the solver.
pub const DEFAULT_MAX_INTERVAL: f32 = 4.0 / 60.0;

/// Simulation settings. Only configuration is persisted — simulation state
/// itself is purely in-memory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    /// Maximum per-step interval in seconds; the raw frame delta is capped
    /// to this before any physics-synchronized motion.
    pub max_interval: f32,
    /// Enables the debug wireframe sink.
    pub debug: bool,
    /// World gravity, handed to the solver each step.
    pub gravity: Vec3,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            max_interval: DEFAULT_MAX_INTERVAL,
            debug: false,
            gravity: Vec3::new(0.0, -9.8, 0.0),
        }
    }
}

impl PhysicsSettings {
    pub fn with_max_interval(mut self, max_interval: f32) -> Self {
        self.max_interval = max_interval;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }
}

fn physics_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "kinema", "kinema")
        .map(|dirs| dirs.config_dir().join(PHYSICS_CONFIG_FILE))
}

pub fn save_physics_settings(settings: &PhysicsSettings) -> std::io::Result<()> {
    if let Some(path) = physics_config_path() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(settings)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, toml)?;
    }
    Ok(())
}

pub fn load_physics_settings() -> Option<PhysicsSettings> {
    if let Some(path) = physics_config_path() {
        if let Ok(data) = fs::read_to_string(path) {
            if let Ok(settings) = toml::from_str::<PhysicsSettings>(&data) {
                return Some(settings);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = PhysicsSettings::default();
        assert!(settings.max_interval > 0.0);
        assert!(!settings.debug);
        assert!(settings.gravity.y < 0.0);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let settings = PhysicsSettings::default()
            .with_max_interval(0.01)
            .with_debug(true)
            .with_gravity(Vec3::new(0.0, -1.62, 0.0));

        let text = toml::to_string_pretty(&settings).unwrap();
        let back: PhysicsSettings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
