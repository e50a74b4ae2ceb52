use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use kinema::{
    AabbShapeBuilder, BodyConfig, BodyId, BodyKind, DebugSink, Geometry, NoopSolver,
    PhysicsError, PhysicsSettings, PhysicsSystem, Scene, Shape, ShapeKind, ShapeOptions,
    Transform,
};
use kinema::physics::BindingState;

fn shapeless_config() -> BodyConfig {
    BodyConfig {
        shape: ShapeOptions {
            kind: ShapeKind::None,
            ..ShapeOptions::default()
        },
        ..BodyConfig::default()
    }
}

fn new_system() -> PhysicsSystem {
    PhysicsSystem::new(
        PhysicsSettings::default(),
        Box::new(NoopSolver),
        Box::new(AabbShapeBuilder),
    )
}

fn loaded_scene_with_entity() -> (Scene, kinema::EntityId) {
    let mut scene = Scene::new();
    let id = scene.spawn(None);
    scene.finish_load();
    (scene, id)
}

#[test]
fn start_stop_cycles_fire_exactly_one_pair_each() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    system.attach(&mut scene, id, shapeless_config()).unwrap();
    assert_eq!(system.binding_state(id), Some(BindingState::Ready));

    for cycle in 1..=3u32 {
        system.start(&mut scene, id).unwrap();
        let stats = system.world().stats();
        assert_eq!(stats.bodies_added, cycle);
        assert_eq!(stats.components_added, cycle);
        assert_eq!(system.world().body_count(), 1);

        // Redundant start must not re-register.
        system.start(&mut scene, id).unwrap();
        assert_eq!(system.world().stats().bodies_added, cycle);

        system.stop(id).unwrap();
        let stats = system.world().stats();
        assert_eq!(stats.bodies_removed, cycle);
        assert_eq!(stats.components_removed, cycle);
        assert_eq!(system.world().body_count(), 0);

        // Redundant stop must not double-fire either.
        system.stop(id).unwrap();
        assert_eq!(system.world().stats().bodies_removed, cycle);
    }
}

#[test]
fn detach_is_idempotent_and_leaves_no_residue() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    system.attach(&mut scene, id, shapeless_config()).unwrap();
    system.start(&mut scene, id).unwrap();
    assert!(scene.entity(id).body().is_some());

    system.detach(&mut scene, id);
    assert_eq!(system.world().body_count(), 0);
    assert_eq!(system.world().component_count(), 0);
    assert!(scene.entity(id).body().is_none());
    assert!(system.body(id).is_none());

    // Second detach: no error, no state change.
    system.detach(&mut scene, id);
    let stats = system.world().stats();
    assert_eq!(stats.bodies_added, 1);
    assert_eq!(stats.bodies_removed, 1);
}

#[test]
fn detaching_a_pending_binding_is_a_no_op() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    // Auto shape but no geometry attached: binding stays pending.
    system.attach(&mut scene, id, BodyConfig::default()).unwrap();
    assert_eq!(system.binding_state(id), Some(BindingState::ShapePending));

    system.detach(&mut scene, id);
    let stats = system.world().stats();
    assert_eq!(stats.bodies_added, 0);
    assert_eq!(stats.components_added, 0);
}

#[test]
fn init_defers_until_scene_load() {
    let mut scene = Scene::new();
    let id = scene.spawn(None);
    let mut system = new_system();

    system.attach(&mut scene, id, shapeless_config()).unwrap();
    assert_eq!(system.binding_state(id), Some(BindingState::Uninitialized));

    scene.finish_load();
    system.scene_loaded(&mut scene);
    assert_eq!(system.binding_state(id), Some(BindingState::Ready));
}

#[test]
fn shape_construction_retries_on_geometry_ready() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    system.attach(&mut scene, id, BodyConfig::default()).unwrap();
    assert_eq!(system.binding_state(id), Some(BindingState::ShapePending));

    // Start requested while pending: must take effect once the shape lands.
    system.start(&mut scene, id).unwrap();
    assert_eq!(system.binding_state(id), Some(BindingState::ShapePending));

    scene.attach_geometry(
        id,
        Geometry {
            mesh_id: "crate".to_string(),
            half_extents: Vec3::splat(0.5),
        },
    );
    system.geometry_ready(&mut scene, id);

    assert_eq!(system.binding_state(id), Some(BindingState::Playing));
    let body = system.body(id).unwrap();
    assert_eq!(
        body.shapes,
        vec![Shape::Box {
            half_extents: Vec3::splat(0.5)
        }]
    );
}

#[test]
fn stale_geometry_signal_after_detach_is_ignored() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    system.attach(&mut scene, id, BodyConfig::default()).unwrap();
    system.detach(&mut scene, id);

    // Signal arrives after the binding is gone; must be a no-op.
    system.geometry_ready(&mut scene, id);
    assert!(system.binding_state(id).is_none());
}

#[test]
fn only_one_binding_per_entity() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    system.attach(&mut scene, id, shapeless_config()).unwrap();
    let err = system
        .attach(&mut scene, id, shapeless_config())
        .unwrap_err();
    assert!(matches!(err, PhysicsError::BindingExists { .. }));
}

#[test]
fn signals_for_unknown_bindings_report_not_found() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    assert!(matches!(
        system.start(&mut scene, id),
        Err(PhysicsError::BindingNotFound { .. })
    ));
    assert!(matches!(
        system.stop(id),
        Err(PhysicsError::BindingNotFound { .. })
    ));
}

#[test]
fn back_references_are_symmetric_while_live() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    system.attach(&mut scene, id, shapeless_config()).unwrap();
    let body_id = scene.entity(id).body().expect("back-reference set");
    let body = system.body(id).expect("body live");
    assert_eq!(body.id(), body_id);
    assert_eq!(body.entity(), id);

    system.detach(&mut scene, id);
    assert!(scene.entity(id).body().is_none());
}

#[test]
fn mass_update_recomputes_derived_properties() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    system.attach(&mut scene, id, shapeless_config()).unwrap();
    let mut update = shapeless_config();
    update.mass = 2.0;
    system.update_body_config(id, update).unwrap();

    let body = system.body(id).unwrap();
    assert_eq!(body.mass, 2.0);
    assert!((body.inverse_mass - 0.5).abs() < 1e-6);
}

#[test]
fn kind_change_after_creation_is_ignored() {
    let (mut scene, id) = loaded_scene_with_entity();
    let mut system = new_system();

    let config = BodyConfig {
        kind: BodyKind::Static,
        ..shapeless_config()
    };
    system.attach(&mut scene, id, config).unwrap();
    assert!(system.body(id).unwrap().is_static());

    let update = BodyConfig {
        kind: BodyKind::Dynamic,
        mass: 3.0,
        ..shapeless_config()
    };
    system.update_body_config(id, update).unwrap();

    // Still static: the kind change is flagged, not applied, and the mass
    // stays pinned at zero.
    let body = system.body(id).unwrap();
    assert_eq!(body.kind, BodyKind::Static);
    assert!(body.is_static());
}

#[derive(Default)]
struct EventLog {
    events: Vec<String>,
}

struct SpySink(Rc<RefCell<EventLog>>);

impl DebugSink for SpySink {
    fn attach(&mut self, body: BodyId, shapes: &[Shape]) {
        self.0
            .borrow_mut()
            .events
            .push(format!("attach {body} x{}", shapes.len()));
    }

    fn update(&mut self, _body: BodyId, _transform: Transform) {}

    fn detach(&mut self, body: BodyId) {
        self.0.borrow_mut().events.push(format!("detach {body}"));
    }
}

#[test]
fn debug_wireframe_follows_registration() {
    let (mut scene, id) = loaded_scene_with_entity();
    let log = Rc::new(RefCell::new(EventLog::default()));
    let mut system = PhysicsSystem::new(
        PhysicsSettings::default().with_debug(true),
        Box::new(NoopSolver),
        Box::new(AabbShapeBuilder),
    )
    .with_debug_sink(Box::new(SpySink(Rc::clone(&log))));

    system.attach(&mut scene, id, shapeless_config()).unwrap();
    system.start(&mut scene, id).unwrap();
    system.stop(id).unwrap();

    let events = log.borrow().events.clone();
    assert_eq!(events, vec!["attach body#0 x0", "detach body#0"]);
}
