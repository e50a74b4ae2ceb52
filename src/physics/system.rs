//! Physics system facade: owns the world and the bindings, and drives the
//! before-step / solve / after-step loop at the clamped interval.

use std::collections::HashMap;

use tracing::debug;

use crate::config::PhysicsSettings;
use crate::scene::{EntityId, Scene};

use super::binding::{BindingState, BodyBinding};
use super::body::{BodyConfig, RigidBody};
use super::debug::DebugSink;
use super::shape::ShapeBuilder;
use super::velocity;
use super::world::{PhysicsWorld, Solver};
use super::{PhysicsError, PhysicsResult};

/// The single authoritative clamping rule: the per-step interval never
/// exceeds the configured maximum, and degenerate inputs collapse to zero.
/// Everything that moves in step phases must use this value, never the raw
/// frame delta.
pub fn clamp_interval(raw_dt: f32, max_interval: f32) -> f32 {
    if !raw_dt.is_finite() || raw_dt <= 0.0 {
        return 0.0;
    }
    raw_dt.min(max_interval)
}

/// Owns the physics world and the per-entity body bindings, and exposes the
/// discrete lifecycle signals (scene-loaded, geometry-ready, start, stop,
/// detach) plus the per-frame [`PhysicsSystem::tick`].
pub struct PhysicsSystem {
    settings: PhysicsSettings,
    world: PhysicsWorld,
    components: HashMap<EntityId, BodyBinding>,
    shape_builder: Box<dyn ShapeBuilder>,
    debug_sink: Option<Box<dyn DebugSink>>,
    next_body_id: u32,
}

impl PhysicsSystem {
    pub fn new(
        settings: PhysicsSettings,
        solver: Box<dyn Solver>,
        shape_builder: Box<dyn ShapeBuilder>,
    ) -> Self {
        let world = PhysicsWorld::new(settings.gravity, solver);
        Self {
            settings,
            world,
            components: HashMap::new(),
            shape_builder,
            debug_sink: None,
            next_body_id: 0,
        }
    }

    /// Install a wireframe sink; only consulted when `settings.debug` is on.
    pub fn with_debug_sink(mut self, sink: Box<dyn DebugSink>) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn max_interval(&self) -> f32 {
        self.settings.max_interval
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn binding_state(&self, entity: EntityId) -> Option<BindingState> {
        self.components.get(&entity).map(|b| b.state())
    }

    pub fn body(&self, entity: EntityId) -> Option<&RigidBody> {
        self.components.get(&entity).and_then(|b| b.body())
    }

    /// Attach a body binding to an entity. At most one binding per entity.
    /// If the scene has already loaded, initialization starts immediately;
    /// otherwise it waits for [`PhysicsSystem::scene_loaded`].
    pub fn attach(
        &mut self,
        scene: &mut Scene,
        entity: EntityId,
        config: BodyConfig,
    ) -> PhysicsResult<()> {
        if !scene.contains(entity) {
            return Err(PhysicsError::UnknownEntity { entity });
        }
        if self.components.contains_key(&entity) {
            return Err(PhysicsError::BindingExists { entity });
        }
        let mut binding = BodyBinding::new(entity, config);
        if scene.is_loaded() {
            binding.begin_init(scene, self.shape_builder.as_ref(), &mut self.next_body_id);
        }
        self.components.insert(entity, binding);
        debug!(entity = %entity, "body binding attached");
        Ok(())
    }

    /// Scene load completed: move every deferred binding out of
    /// `Uninitialized` and honor starts requested before readiness.
    pub fn scene_loaded(&mut self, scene: &mut Scene) {
        let entities: Vec<EntityId> = self.components.keys().copied().collect();
        for entity in entities {
            let Some(binding) = self.components.get_mut(&entity) else {
                continue;
            };
            let ready =
                binding.begin_init(scene, self.shape_builder.as_ref(), &mut self.next_body_id);
            if ready && binding.wants_start() {
                let sink = if self.settings.debug {
                    self.debug_sink.as_deref_mut()
                } else {
                    None
                };
                binding.enter_playing(scene, &mut self.world, sink);
            }
        }
    }

    /// Geometry became available on an entity: retry pending shape
    /// construction. A binding removed in the meantime is ignored.
    pub fn geometry_ready(&mut self, scene: &mut Scene, entity: EntityId) {
        let Some(binding) = self.components.get_mut(&entity) else {
            // Stale signal; the binding was detached mid-flight.
            return;
        };
        let ready = binding.try_build(scene, self.shape_builder.as_ref(), &mut self.next_body_id);
        if ready && binding.wants_start() {
            let sink = if self.settings.debug {
                self.debug_sink.as_deref_mut()
            } else {
                None
            };
            binding.enter_playing(scene, &mut self.world, sink);
        }
    }

    /// Start signal: register the binding and body with the world. If the
    /// binding has not reached `Ready` yet, the start is remembered and
    /// applied the moment it does.
    pub fn start(&mut self, scene: &mut Scene, entity: EntityId) -> PhysicsResult<()> {
        let Some(binding) = self.components.get_mut(&entity) else {
            return Err(PhysicsError::BindingNotFound { entity });
        };
        binding.request_start();
        if binding.state() == BindingState::Ready {
            let sink = if self.settings.debug {
                self.debug_sink.as_deref_mut()
            } else {
                None
            };
            binding.enter_playing(scene, &mut self.world, sink);
        }
        Ok(())
    }

    /// Stop signal: unregister from the world. Body and cross-references
    /// persist; a later start re-registers without re-creating anything.
    pub fn stop(&mut self, entity: EntityId) -> PhysicsResult<()> {
        let Some(binding) = self.components.get_mut(&entity) else {
            return Err(PhysicsError::BindingNotFound { entity });
        };
        let sink = if self.settings.debug {
            self.debug_sink.as_deref_mut()
        } else {
            None
        };
        binding.exit_playing(&mut self.world, sink);
        Ok(())
    }

    /// Remove a binding entirely. Idempotent: detaching an entity with no
    /// binding (or one that never left `ShapePending`) is a no-op.
    pub fn detach(&mut self, scene: &mut Scene, entity: EntityId) {
        let Some(mut binding) = self.components.remove(&entity) else {
            return;
        };
        let sink = if self.settings.debug {
            self.debug_sink.as_deref_mut()
        } else {
            None
        };
        binding.teardown(scene, &mut self.world, sink);
        debug!(entity = %entity, "body binding detached");
    }

    /// Apply a body property update (mass / damping; kind and shape changes
    /// post-creation are warned and ignored by the binding).
    pub fn update_body_config(&mut self, entity: EntityId, config: BodyConfig) -> PhysicsResult<()> {
        let Some(binding) = self.components.get_mut(&entity) else {
            return Err(PhysicsError::BindingNotFound { entity });
        };
        binding.update_config(config);
        Ok(())
    }

    /// One simulation frame.
    ///
    /// Clamps the caller's elapsed time, pushes scene transforms into every
    /// playing zero-mass body, advances the solver, pulls solver output back
    /// into the scene for every playing dynamic body, then integrates
    /// velocity carriers — all at the clamped interval.
    pub fn tick(&mut self, scene: &mut Scene, raw_dt: f32) {
        let dt = clamp_interval(raw_dt, self.settings.max_interval);

        // Before-step: scene is authoritative for static/kinematic bodies.
        for entity in self.world.component_ids() {
            let Some(binding) = self.components.get_mut(&entity) else {
                continue;
            };
            if binding.body().is_some_and(|b| b.is_static()) {
                let sink = if self.settings.debug {
                    self.debug_sink.as_deref_mut()
                } else {
                    None
                };
                binding.sync_to_physics(scene, sink);
            }
        }

        // Solver step over the registered bodies.
        let mut bodies: Vec<&mut RigidBody> = self
            .components
            .values_mut()
            .filter(|binding| binding.is_playing())
            .filter_map(|binding| binding.body_mut())
            .collect();
        self.world.step(&mut bodies, dt);

        // After-step: physics is authoritative for dynamic bodies.
        for entity in self.world.component_ids() {
            let Some(binding) = self.components.get_mut(&entity) else {
                continue;
            };
            if binding.body().is_some_and(|b| !b.is_static()) {
                let sink = if self.settings.debug {
                    self.debug_sink.as_deref_mut()
                } else {
                    None
                };
                binding.sync_from_physics(scene, sink);
            }
        }

        // Velocity carriers advance at the clamped interval, bypassing the
        // solver.
        velocity::integrate_step(scene, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_caps_at_max_interval() {
        assert_eq!(clamp_interval(0.5, 1.0 / 60.0), 1.0 / 60.0);
        assert_eq!(clamp_interval(0.001, 1.0 / 60.0), 0.001);
    }

    #[test]
    fn clamp_collapses_degenerate_input() {
        assert_eq!(clamp_interval(-0.1, 0.1), 0.0);
        assert_eq!(clamp_interval(f32::NAN, 0.1), 0.0);
        assert_eq!(clamp_interval(f32::INFINITY, 0.1), 0.0);
    }
}
