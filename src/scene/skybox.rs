//! The textured backdrop behind everything else.

use std::sync::Arc;

use crate::data_structures::{
    geometry::Geometry,
    material::{Material, ShaderProgram},
    scene_graph::{MeshNode, SceneNode},
    transform::Transform,
};

pub const SIZE: f32 = 1024.0;
pub const DISTANCE: f32 = -520.0;

/// The backdrop once its texture has arrived.
pub fn backdrop(texture: Arc<image::RgbaImage>) -> SceneNode {
    MeshNode::new(
        "skyBoxPlane",
        Geometry::plane(SIZE, SIZE, 1, 1),
        Material::new(ShaderProgram::Textured).with_texture(texture),
    )
    .with_transform(Transform::at(0.0, 0.0, DISTANCE))
    .into()
}
