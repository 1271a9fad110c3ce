use std::sync::Arc;

use synthwave::{
    Component,
    scene::{AssetKind, LoadedAsset, skybox},
};

use crate::common::test_utils::{HEIGHT, WIDTH, mesh, pixel, seeded_scene, time_of};

mod common;

#[test]
fn camera_starts_behind_the_road() {
    let scene = seeded_scene(1);
    assert_eq!(scene.camera.aspect, WIDTH as f32 / HEIGHT as f32);
    assert_eq!(scene.camera.fovy.0, 45.0);
    assert_eq!(scene.camera.position, cgmath::Point3::new(0.0, 10.0, 45.0));
}

#[test]
fn resize_only_changes_the_aspect() {
    let mut scene = seeded_scene(1);
    let before = scene.camera.clone();
    scene.resize(1920, 1080);
    assert_eq!(scene.camera.aspect, 1920.0 / 1080.0);
    assert_eq!(scene.camera.position, before.position);
    assert_eq!(scene.camera.fovy, before.fovy);
}

#[test]
fn advancing_writes_time_into_animated_materials() {
    let mut scene = seeded_scene(2);
    for name in ["floorGrid", "sideWalkGrid", "pyramidField", "palmTree"] {
        assert_eq!(time_of(&scene, name), Some(0.0), "{name}");
    }

    assert_eq!(scene.advance(2.0), 4);
    for name in ["floorGrid", "sideWalkGrid", "pyramidField", "palmTree"] {
        assert_eq!(time_of(&scene, name), Some(2.0), "{name}");
    }
    // static materials have no time uniform at all
    assert_eq!(time_of(&scene, "roadSurface"), None);
    assert_eq!(scene.elapsed(), 2.0);
}

#[test]
fn unmounted_component_stops_animating_and_leaves_the_graph() {
    let mut scene = seeded_scene(3);
    scene.advance(1.0);

    let detached = scene.unmount(Component::Floor).expect("floor was mounted");
    assert_eq!(detached.name(), "floor");
    assert!(scene.root().find("floorGrid").is_none());

    assert_eq!(scene.advance(4.0), 3);
    assert_eq!(time_of(&scene, "palmTree"), Some(4.0));
    let frozen = match detached.find("floorGrid") {
        Some(synthwave::data_structures::scene_graph::SceneNode::Mesh(mesh)) => mesh.material.time(),
        _ => None,
    };
    assert_eq!(frozen, Some(1.0));
}

#[test]
fn skybox_load_replaces_its_placeholder() {
    let mut scene = seeded_scene(4);
    let requests = scene.take_requests();
    let sky = requests
        .iter()
        .find(|r| matches!(r.kind, AssetKind::SkyboxTexture { .. }))
        .expect("skybox request");

    let loaded = LoadedAsset {
        slot: sky.slot,
        owner: sky.owner,
        path: sky.kind.path().to_string(),
        result: Ok(skybox::backdrop(Arc::new(pixel()))),
    };
    assert!(scene.resolve(loaded));
    assert_eq!(scene.pending_count(), 3);

    let plane = mesh(&scene, "skyBoxPlane");
    assert!(plane.material.texture.is_some());
    // the skybox stays first in draw order
    assert_eq!(scene.root().children()[0].name(), "skyBox");
}

#[test]
fn failed_load_drops_only_its_placeholder() {
    let mut scene = seeded_scene(5);
    let requests = scene.take_requests();
    let meshes_before = scene.root().meshes().len();

    let sun = requests
        .iter()
        .find(|r| r.kind.path() == "scenery/sun.svg")
        .expect("sun request");
    assert!(scene.resolve(LoadedAsset::failed(sun, anyhow::anyhow!("404"))));

    assert_eq!(scene.pending_count(), 3);
    assert_eq!(scene.root().meshes().len(), meshes_before);
    assert!(scene.root().find("sunPending").is_none());
    assert!(scene.root().find("cityFarPending").is_some());
}

#[test]
fn late_completion_after_unmount_is_ignored() {
    let mut scene = seeded_scene(6);
    let requests = scene.take_requests();
    let sky = requests
        .iter()
        .find(|r| matches!(r.kind, AssetKind::SkyboxTexture { .. }))
        .expect("skybox request")
        .clone();

    scene.unmount(Component::SkyBox);
    let loaded = LoadedAsset {
        slot: sky.slot,
        owner: sky.owner,
        path: sky.kind.path().to_string(),
        result: Ok(skybox::backdrop(Arc::new(pixel()))),
    };
    assert!(!scene.resolve(loaded));
    assert!(scene.root().find("skyBoxPlane").is_none());
}

#[tokio::test]
async fn missing_asset_fails_without_panicking() {
    let mut scene = seeded_scene(7);
    let requests = scene.take_requests();
    let mut request = requests[0].clone();
    request.kind = AssetKind::SkyboxTexture {
        path: "does/not/exist.png".to_string(),
    };

    let loaded = synthwave::scene::assets::load(request).await;
    assert!(loaded.result.is_err());
    assert!(scene.resolve(loaded));
    assert_eq!(scene.pending_count(), 3);
}
