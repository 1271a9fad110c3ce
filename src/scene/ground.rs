//! Floor and sidewalks: static geometry with the animated grid shader.

use std::f32::consts::PI;

use crate::data_structures::{
    geometry::Geometry,
    material::{Material, ShaderProgram, Uniform, hex},
    scene_graph::{GroupNode, MeshNode, SceneNode},
};

pub const GRID_SPEED: f32 = 10.0;

fn grid_material(color: u32) -> Material {
    Material::new(ShaderProgram::Grid)
        .with(Uniform::Color, hex(color))
        .with(Uniform::Time, 0.0)
        .with(Uniform::Speed, GRID_SPEED)
}

pub fn floor_geometry() -> Geometry {
    Geometry::plane(500.0, 500.0, 1, 1)
        .translate(0.0, 110.0, 0.0)
        .rotate_x(-PI * 0.5)
}

/// Two flat tops either side of the road plus the two kerb faces. The kerbs
/// are laid flat first and then stood up around Z, in that order.
pub fn sidewalk_geometry() -> Geometry {
    let top = |x: f32| {
        Geometry::plane(8.0, 300.0, 1, 1)
            .translate(x, 110.0, 0.5)
            .rotate_x(-PI * 0.5)
    };
    let kerb = |x: f32, z: f32| {
        Geometry::plane(0.5, 300.0, 1, 1)
            .translate(x, 110.0, z)
            .rotate_x(-PI * 0.5)
            .rotate_z(PI * 0.49)
    };
    Geometry::merge([top(-10.0), kerb(0.06, 6.0), top(10.0), kerb(0.44, -6.0)])
}

pub fn floor() -> SceneNode {
    GroupNode::new("floor")
        .with_child(MeshNode::new("floorGrid", floor_geometry(), grid_material(0xef9af2)))
        .into()
}

pub fn sidewalk() -> SceneNode {
    let material = grid_material(0x1be9ff).double_sided().transparent(0.8);
    GroupNode::new("sideWalk")
        .with_child(MeshNode::new("sideWalkGrid", sidewalk_geometry(), material))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kerbs_stand_up_next_to_the_road() {
        let sidewalk = sidewalk_geometry();
        assert_eq!(sidewalk.vertex_count(), 16);
        // tops are flat at the kerb height
        for p in &sidewalk.positions[0..4] {
            assert!((p[1] - 0.5).abs() < 1e-4);
        }
        // the rotated kerb is nearly vertical: its x spread collapses to the kerb line
        let kerb_x: Vec<f32> = sidewalk.positions[4..8].iter().map(|p| p[0]).collect();
        let spread = kerb_x.iter().cloned().fold(f32::MIN, f32::max)
            - kerb_x.iter().cloned().fold(f32::MAX, f32::min);
        assert!(spread < 0.1, "{kerb_x:?}");
    }
}
