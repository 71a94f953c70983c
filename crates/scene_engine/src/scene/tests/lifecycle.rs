use super::{entries, journal, Probe, Sprite};
use crate::scene::{Capabilities, Component, ComponentContext, ComponentState, Scene, SceneError};

#[test]
fn test_get_component_after_add() {
    let mut scene = Scene::new("query");
    let go = scene.create_game_object("go");
    let log = journal();

    let first = scene.add_component(go, Sprite).unwrap();
    scene.add_component(go, Probe::new("p", Capabilities::empty(), &log)).unwrap();
    let second = scene.add_component(go, Sprite).unwrap();
    let third = scene.add_component(go, Sprite).unwrap();

    let view = scene.game_object(go).unwrap();
    assert_eq!(view.get_component::<Sprite>(), Some(first));
    assert_eq!(view.get_components::<Sprite>(), vec![first, second, third]);
    assert_eq!(view.get_components::<Probe>().len(), 1);
    assert!(scene.component(first).is_some());
}

#[test]
fn test_destroy_runs_deactivated_then_destroyed() {
    let mut scene = Scene::new("destroy");
    let go = scene.create_game_object("go");
    let log = journal();
    let probe = scene.add_component(go, Probe::new("p", Capabilities::empty(), &log)).unwrap();
    assert_eq!(scene.component_state(probe), ComponentState::Active);

    scene.destroy_component(probe).unwrap();

    assert_eq!(entries(&log), vec!["p:activated", "p:deactivated", "p:destroyed"]);
    assert_eq!(scene.component_state(probe), ComponentState::Destroyed);
    assert!(scene.game_object(go).unwrap().get_components::<Probe>().is_empty());
    assert_eq!(scene.destroy_component(probe), Err(SceneError::StaleComponent(probe.id())));
}

#[test]
fn test_cascade_destroys_every_component() {
    let mut scene = Scene::new("cascade");
    let go = scene.create_game_object("go");
    let log = journal();
    scene.add_component(go, Probe::new("a", Capabilities::UPDATE, &log)).unwrap();
    scene.add_component(go, Probe::new("b", Capabilities::RENDER, &log)).unwrap();
    log.borrow_mut().clear();

    scene.destroy_game_object(go).unwrap();

    assert_eq!(
        entries(&log),
        vec!["a:deactivated", "a:destroyed", "b:deactivated", "b:destroyed"]
    );
    assert_eq!(scene.component_count(), 0);
    assert!(scene.transforms().is_empty());
}

#[test]
fn test_inactive_scene_defers_activation() {
    let mut scene = Scene::new("offline");
    scene.set_live(false);
    let go = scene.create_game_object("go");
    let log = journal();
    let probe = scene.add_component(go, Probe::new("p", Capabilities::empty(), &log)).unwrap();
    assert_eq!(scene.component_state(probe), ComponentState::Constructed);
    assert!(entries(&log).is_empty());

    scene.set_live(true);
    assert_eq!(scene.component_state(probe), ComponentState::Active);

    scene.set_game_object_active(go, false).unwrap();
    assert_eq!(scene.component_state(probe), ComponentState::Inactive);
    scene.set_game_object_active(go, false).unwrap();

    assert_eq!(entries(&log), vec!["p:activated", "p:deactivated"]);
}

#[test]
fn test_destroying_never_active_component_skips_deactivated() {
    let mut scene = Scene::new("cold");
    scene.set_live(false);
    let go = scene.create_game_object("go");
    let log = journal();
    let probe = scene.add_component(go, Probe::new("p", Capabilities::empty(), &log)).unwrap();

    scene.destroy_component(probe).unwrap();
    assert_eq!(entries(&log), vec!["p:destroyed"]);
}

/// Destroys its own GameObject on first update
struct SelfDestruct;

impl Component for SelfDestruct {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>) {
        let go = ctx.game_object();
        ctx.scene_mut().destroy_game_object(go).unwrap();
        // Still reachable until this hook returns
        assert!(ctx.scene().contains_game_object(go));
        assert!(ctx.transform_ref().is_some());
        // Repeated request during the same teardown is absorbed
        ctx.scene_mut().destroy_game_object(go).unwrap();
    }
}

#[test]
fn test_component_destroys_own_game_object() {
    let mut scene = Scene::new("self destruct");
    let go = scene.create_game_object("go");
    let log = journal();
    scene.add_component(go, SelfDestruct).unwrap();
    scene.add_component(go, Probe::new("p", Capabilities::UPDATE, &log)).unwrap();

    scene.update();

    assert!(!scene.contains_game_object(go));
    assert_eq!(scene.component_count(), 0);
    assert_eq!(entries(&log), vec!["p:activated", "p:deactivated", "p:destroyed"]);
}

/// Tries to add a sibling while its GameObject is being destroyed
struct LateAdder {
    result: std::rc::Rc<std::cell::RefCell<Option<Result<(), SceneError>>>>,
}

impl Component for LateAdder {
    fn destroyed(&mut self, ctx: &mut ComponentContext<'_>) {
        let go = ctx.game_object();
        let result = ctx.scene_mut().add_component(go, Sprite).map(|_| ());
        *self.result.borrow_mut() = Some(result);
    }
}

#[test]
fn test_add_during_teardown_rejected() {
    let mut scene = Scene::new("late add");
    let go = scene.create_game_object("go");
    let result = std::rc::Rc::new(std::cell::RefCell::new(None));
    scene.add_component(go, LateAdder { result: result.clone() }).unwrap();

    scene.destroy_game_object(go).unwrap();

    assert_eq!(*result.borrow(), Some(Err(SceneError::GameObjectDestroyed(go))));
    assert_eq!(scene.component_count(), 0);
}

#[test]
fn test_dropping_scene_destroys_components() {
    let log = journal();
    {
        let mut scene = Scene::new("dropped");
        let go = scene.create_game_object("go");
        scene.add_component(go, Probe::new("p", Capabilities::empty(), &log)).unwrap();
    }
    assert_eq!(entries(&log), vec!["p:activated", "p:deactivated", "p:destroyed"]);
}
