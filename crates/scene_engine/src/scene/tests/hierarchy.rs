use approx::assert_relative_eq;

use crate::foundation::math::{Quat, Vec3};
use crate::scene::{Scene, SceneError};

#[test]
fn test_three_level_chain_follows_root_then_detaches() {
    let mut scene = Scene::new("chain");
    let a = scene.create_game_object("A");
    let b = scene.create_game_object("B");
    let c = scene.create_game_object("C");
    scene.set_parent(b, Some(a)).unwrap();
    scene.set_parent(c, Some(b)).unwrap();

    let ta = scene.transform_of(a).unwrap();
    let tc = scene.transform_of(c).unwrap();
    scene.transforms_mut().set_local_position(ta, Vec3::new(1.0, 2.0, 3.0)).unwrap();
    assert_relative_eq!(scene.transforms().get(tc).unwrap().position(), Vec3::new(1.0, 2.0, 3.0));

    scene.set_parent(b, None).unwrap();
    assert_relative_eq!(scene.transforms().get(tc).unwrap().position(), Vec3::zeros());
}

#[test]
fn test_reparent_under_descendant_rejected() {
    let mut scene = Scene::new("cycle");
    let a = scene.create_game_object("A");
    let b = scene.create_game_object("B");
    scene.set_parent(b, Some(a)).unwrap();

    let err = scene.set_parent(a, Some(b)).unwrap_err();
    assert!(matches!(err, SceneError::CyclicParent { .. }));

    let ta = scene.transform_of(a).unwrap();
    let tb = scene.transform_of(b).unwrap();
    assert_eq!(scene.transforms().get(ta).unwrap().parent(), None);
    assert_eq!(scene.transforms().get(tb).unwrap().parent(), Some(ta));
    assert_eq!(scene.transforms().get(ta).unwrap().children(), &[tb]);
}

#[test]
fn test_destroying_parent_orphans_children() {
    let mut scene = Scene::new("orphans");
    let parent = scene.create_game_object("parent");
    let child = scene.create_game_object("child");
    scene.set_parent(child, Some(parent)).unwrap();

    let tp = scene.transform_of(parent).unwrap();
    let tc = scene.transform_of(child).unwrap();
    scene.transforms_mut().set_local_position(tp, Vec3::new(5.0, 0.0, 0.0)).unwrap();
    scene
        .transforms_mut()
        .set_local_rotation(tp, Quat::from_axis_angle(&Vec3::z_axis(), 0.4))
        .unwrap();
    scene.transforms_mut().set_local_position(tc, Vec3::new(0.0, 1.0, 0.0)).unwrap();
    // Warm the cache under the parent
    let _ = scene.transforms().get(tc).unwrap().global_matrix();

    scene.destroy_game_object(parent).unwrap();

    let child_ref = scene.transforms().get(tc).unwrap();
    assert_eq!(child_ref.parent(), None);
    assert_relative_eq!(child_ref.global_matrix(), child_ref.local_matrix(), epsilon = 1e-6);
    assert!(!scene.transforms().contains(tp));
}

#[test]
fn test_stale_game_object_reported() {
    let mut scene = Scene::new("stale");
    let a = scene.create_game_object("A");
    scene.destroy_game_object(a).unwrap();

    assert_eq!(scene.destroy_game_object(a), Err(SceneError::StaleGameObject(a)));
    assert_eq!(scene.set_parent(a, None), Err(SceneError::StaleGameObject(a)));
    assert!(scene.game_object(a).is_none());
    assert_eq!(scene.game_object_count(), 0);
}

#[test]
fn test_find_game_object_returns_first_match_by_creation_order() {
    let mut scene = Scene::new("find");
    let first = scene.create_game_object("enemy");
    let second = scene.create_game_object("enemy");
    let player = scene.create_game_object("hero");

    assert_eq!(scene.find_game_object("enemy"), Some(first));
    assert_eq!(scene.find_game_object("missing"), None);

    scene.destroy_game_object(first).unwrap();
    assert_eq!(scene.find_game_object("enemy"), Some(second));

    scene.set_game_object_name(player, "player").unwrap();
    assert_eq!(scene.find_game_object("hero"), None);
    assert_eq!(scene.find_game_object("player"), Some(player));
}
