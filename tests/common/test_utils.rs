use synthwave::{
    SceneConfig, SynthwaveScene,
    data_structures::scene_graph::{MeshNode, SceneNode},
};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;

/// A fully mounted scene with a fixed prop layout.
pub fn seeded_scene(seed: u64) -> SynthwaveScene {
    SynthwaveScene::mount(
        WIDTH,
        HEIGHT,
        SceneConfig {
            seed: Some(seed),
            ..Default::default()
        },
    )
}

pub fn mesh<'a>(scene: &'a SynthwaveScene, name: &str) -> &'a MeshNode {
    match scene.root().find(name) {
        Some(SceneNode::Mesh(mesh)) => mesh,
        other => panic!("expected mesh `{name}`, found {other:?}"),
    }
}

pub fn time_of(scene: &SynthwaveScene, name: &str) -> Option<f32> {
    mesh(scene, name).material.time()
}

/// A 1x1 opaque image standing in for a decoded skybox.
pub fn pixel() -> image::RgbaImage {
    image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 255, 255]))
}
