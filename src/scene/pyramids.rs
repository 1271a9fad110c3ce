//! Pyramids scattered far out on both sides of the road.
//!
//! All 80 pyramids are merged into one geometry and repeated along the
//! travel axis by four instance offsets.

use crate::{
    data_structures::{
        geometry::Geometry,
        instance::InstanceOffsets,
        material::{Material, ShaderProgram, Uniform, hex},
        scene_graph::{GroupNode, MeshNode, SceneNode},
    },
    placement::{Mode, Placement},
};

pub const COUNT: usize = 80;
/// The first `LARGE` pyramids are the big ones in the back.
const LARGE: usize = 60;

/// Copies of the whole field, spaced along the travel axis.
pub const REPEATS: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 260.0],
    [0.0, 0.0, 520.0],
    [0.0, 0.0, 780.0],
];

pub fn field_geometry(placement: &mut Placement) -> Geometry {
    let pyramids: Vec<Geometry> = (0..COUNT)
        .map(|i| {
            let (min_size, max_size) = if i < LARGE { (20.0, 30.0) } else { (3.0, 8.0) };
            let (min_x, max_x) = if i % 2 == 0 {
                (-40.0, -200.0)
            } else {
                (40.0, 200.0)
            };

            let size = placement.randomize(min_size, max_size, Mode::Int);
            let x = placement.randomize(min_x, max_x, Mode::Float);
            let rotation = placement.randomize(0.0, 2.0, Mode::Float);
            let z = placement.randomize(0.0, 1000.0, Mode::Float);

            Geometry::cone(size, size, 4, 1, true, rotation).translate(x, 0.0, z)
        })
        .collect();
    Geometry::merge(pyramids)
}

pub fn material() -> Material {
    Material::new(ShaderProgram::Scroll)
        .with(Uniform::Color, hex(0x570296))
        .with(Uniform::Speed, 15.0)
        .with(Uniform::Span, 950.0)
        .with(Uniform::Offset, 800.0)
        .with(Uniform::Scale, 1.0)
        .with(Uniform::StretchX, 1.0)
        .with(Uniform::StretchY, 1.0)
        .with(Uniform::EmissiveIntensity, 3.5)
}

pub fn grouped_pyramids(placement: &mut Placement) -> SceneNode {
    let instances = REPEATS.into_iter().collect::<InstanceOffsets>();
    let mesh = MeshNode::new("pyramidField", field_geometry(placement), material())
        .with_instances(instances);
    GroupNode::new("groupedPyramids").with_child(mesh).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::AntiRepeat;

    #[test]
    fn field_holds_every_pyramid_on_its_side() {
        let mut placement = Placement::seeded(21, AntiRepeat::PerCall);
        let field = field_geometry(&mut placement);
        assert_eq!(field.vertex_count(), COUNT * 10);
        assert_eq!(field.triangle_count(), COUNT * 4);

        // the base ring of each cone sits after its apex ring
        for (i, cone) in field.positions.chunks(10).enumerate() {
            let apex_x = cone[0][0];
            if i % 2 == 0 {
                assert!((-200.0..=-39.0).contains(&apex_x), "{i}: {apex_x}");
            } else {
                assert!((40.0..=201.0).contains(&apex_x), "{i}: {apex_x}");
            }
        }
    }
}
