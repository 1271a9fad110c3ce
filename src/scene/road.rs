//! The road surface and its painted lines.
//!
//! Both are plain planes laid flat on the ground (`rotate_x(-π/2)` turns the
//! plane's +Y into -Z, away from the camera) and merged into a single mesh.

use std::f32::consts::PI;

use crate::data_structures::{
    geometry::Geometry,
    material::{Material, ShaderProgram, Uniform, hex},
    scene_graph::{GroupNode, MeshNode, SceneNode},
    transform::Transform,
};

pub const ROAD_WIDTH: f32 = 12.0;
pub const ROAD_LENGTH: f32 = 300.0;
/// How far the near end of the road is pushed away from the camera.
pub const ROAD_DEPTH_OFFSET: f32 = 110.0;

/// `(x, width)` of each painted line.
const LINES: [(f32, f32); 4] = [(-5.2, 0.35), (5.2, 0.35), (-1.8, 0.15), (1.8, 0.15)];

fn flat_strip(x: f32, width: f32, lift: f32) -> Geometry {
    Geometry::plane(width, ROAD_LENGTH, 1, 1)
        .translate(x, ROAD_DEPTH_OFFSET, lift)
        .rotate_x(-PI * 0.5)
}

pub fn road_geometry() -> Geometry {
    flat_strip(0.0, ROAD_WIDTH, 0.1)
}

pub fn road_lines_geometry() -> Geometry {
    Geometry::merge(LINES.iter().map(|&(x, width)| flat_strip(x, width, 0.2)))
}

pub fn road(ambient: f32) -> SceneNode {
    let material = Material::new(ShaderProgram::Standard)
        .with(Uniform::Color, hex(0x03353b))
        .with(Uniform::Ambient, ambient)
        .transparent(0.7);
    let mesh = MeshNode::new("roadSurface", road_geometry(), material)
        .with_transform(Transform::at(0.0, 1.0, 0.1));
    GroupNode::new("road").with_child(mesh).into()
}

pub fn road_lines(ambient: f32) -> SceneNode {
    let material = Material::new(ShaderProgram::Standard)
        .with(Uniform::Color, hex(0xffffff))
        .with(Uniform::Ambient, ambient)
        .transparent(0.3);
    GroupNode::new("roadLines")
        .with_child(MeshNode::new("lines", road_lines_geometry(), material))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_sit_on_the_road_and_run_into_the_distance() {
        let lines = road_lines_geometry();
        assert_eq!(lines.vertex_count(), 16);
        for p in &lines.positions {
            assert!((p[1] - 0.2).abs() < 1e-4);
            assert!(p[0].abs() <= 5.2 + 0.175 + 1e-4);
            assert!((-260.0 - 1e-3..=40.0 + 1e-3).contains(&p[2]));
        }
    }
}
