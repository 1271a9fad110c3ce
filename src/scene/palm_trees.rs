//! Instanced palm trees lining both sides of the road.
//!
//! One tree is built on the CPU (trunk plus a crown of leaves) and drawn once
//! per row offset by the scroll shader, which loops each copy along the
//! travel axis.

use std::f32::consts::PI;

use crate::{
    data_structures::{
        geometry::Geometry,
        instance::InstanceOffsets,
        material::{Material, ShaderProgram, Uniform, hex},
        scene_graph::{GroupNode, MeshNode, SceneNode},
    },
    placement::{Mode, Placement},
};

pub const ROWS: usize = 40;
pub const LEAVES: usize = 35;
/// Distance between two rows along the travel axis.
const ROW_PITCH: f32 = 30.0;
/// Tilt of the whole tree, in degrees.
const LEAN: f32 = -1.5;

/// Trunk and crown merged into one geometry.
pub fn tree_geometry(placement: &mut Placement) -> Geometry {
    let trunk = Geometry::cylinder(0.25, 0.125, 10.0, 5, 4, true, 0.0).translate(0.0, 5.0, 0.0);

    let leaves: Vec<Geometry> = (0..LEAVES)
        .map(|_| {
            Geometry::circle(1.25, 4)
                .translate(0.0, 1.25, 0.0)
                .rotate_x(-PI * 0.5)
                .scale(0.25, 1.0, placement.range(1.0, 1.5))
                .set_y(0, 0.25)
                .rotate_x(placement.spread(PI * 0.5))
                .rotate_y(placement.range(0.0, PI * 2.0))
                .translate(0.0, 10.0, 0.0)
        })
        .collect();

    Geometry::merge(std::iter::once(trunk).chain(leaves))
        .rotate_z(LEAN.to_radians())
}

/// Four trees per row: two hugging the sidewalks and two scattered further
/// out, one on each side.
pub fn offsets(placement: &mut Placement, rows: usize) -> InstanceOffsets {
    let mut offsets = InstanceOffsets::new();
    for i in 0..rows {
        let left = placement.randomize(-25.0, -200.0, Mode::Int);
        let right = placement.randomize(25.0, 160.0, Mode::Int);
        let z = i as f32 * ROW_PITCH - 50.0;

        offsets.push(-10.0, 0.0, z - 10.0);
        offsets.push(10.0, 0.0, z);
        offsets.push(left, 0.0, z - left);
        offsets.push(right, 0.0, z + right);
    }
    offsets
}

pub fn material() -> Material {
    Material::new(ShaderProgram::Scroll)
        .with(Uniform::Color, hex(0x056023))
        .with(Uniform::Speed, 15.0)
        .with(Uniform::Span, 1250.0)
        .with(Uniform::Offset, 1100.0)
        .with(Uniform::Scale, 1.0)
        .with(Uniform::StretchX, 1.0)
        .with(Uniform::StretchY, 1.0)
        .with(Uniform::EmissiveIntensity, 3.5)
        .double_sided()
        .with_wireframe()
}

pub fn palm_trees(placement: &mut Placement) -> SceneNode {
    let geometry = tree_geometry(placement);
    let instances = offsets(placement, ROWS);
    log::debug!(
        "palm tree: {} vertices, {} instances",
        geometry.vertex_count(),
        instances.len()
    );
    GroupNode::new("palmTrees")
        .with_child(MeshNode::new("palmTree", geometry, material()).with_instances(instances))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::AntiRepeat;

    #[test]
    fn one_tree_is_a_trunk_and_a_crown() {
        let mut placement = Placement::seeded(11, AntiRepeat::PerCall);
        let tree = tree_geometry(&mut placement);
        // 6 × 5 trunk ring vertices plus 6 per leaf
        assert_eq!(tree.vertex_count(), 30 + LEAVES * 6);
        assert_eq!(tree.triangle_count(), 40 + LEAVES * 4);
        let top = tree.positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        assert!(top > 10.0 && top < 13.0, "{top}");
    }

    #[test]
    fn rows_keep_the_inner_trees_fixed() {
        let mut placement = Placement::seeded(12, AntiRepeat::PerCall);
        let offsets = offsets(&mut placement, 3);
        let all: Vec<[f32; 3]> = offsets.iter().copied().collect();
        assert_eq!(all.len(), 12);
        assert_eq!(all[0], [-10.0, 0.0, -60.0]);
        assert_eq!(all[1], [10.0, 0.0, -50.0]);
        assert_eq!(all[5], [10.0, 0.0, -20.0]);

        let [lx, _, lz] = all[2];
        assert!((-199.0..=-25.0).contains(&lx));
        assert_eq!(lz, -50.0 - lx);
        let [rx, _, rz] = all[3];
        assert!((25.0..=160.0).contains(&rx));
        assert_eq!(rz, -50.0 + rx);
    }
}
