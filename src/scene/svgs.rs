//! The flat skyline layers: sun, far city and close city.

use crate::{
    config::SvgLayer,
    data_structures::{
        material::{Material, ShaderProgram, Uniform},
        scene_graph::{GroupNode, MeshNode, SceneNode},
        transform::Transform,
    },
    resources::svg::SvgShape,
};

/// One layer: a group at the layer position, mirrored vertically because
/// document space grows downwards, holding one mesh per filled path.
pub fn layer(layer: &SvgLayer, shapes: Vec<SvgShape>, ambient: f32) -> SceneNode {
    let [x, y, z] = layer.position;
    let s = layer.scale;
    let mut group = GroupNode::new(layer.name.as_str())
        .with_transform(Transform::at(x, y, z).with_scale(s, -s, s));

    for (index, shape) in shapes.into_iter().enumerate() {
        let mut material = Material::new(ShaderProgram::Standard)
            .with(Uniform::Color, shape.color)
            .with(Uniform::Ambient, ambient)
            .double_sided()
            .without_depth_write();
        if shape.opacity < 1.0 {
            material = material.transparent(shape.opacity);
        }
        group.add_child(MeshNode::new(
            format!("{}#{index}", layer.name),
            shape.geometry,
            material,
        ));
    }
    group.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::geometry::Geometry;

    #[test]
    fn layer_is_mirrored_and_placed() {
        let sun = SvgLayer::new("scenery/sun.svg", -62.5, 90.0, -500.0, 0.11, "sun");
        let shapes = vec![SvgShape {
            geometry: Geometry::plane(10.0, 10.0, 1, 1),
            color: [1.0, 0.5, 0.0],
            opacity: 1.0,
        }];
        let node = layer(&sun, shapes, 1.0);
        assert_eq!(node.name(), "sun");

        let mut seen = Vec::new();
        node.walk(&mut |mesh, world| seen.push((mesh.material.clone(), world)));
        let (material, world) = &seen[0];
        assert!(!material.depth_write);
        assert!(!material.transparent);
        assert_eq!(world.y.y, -0.11);
        assert_eq!((world.w.x, world.w.y, world.w.z), (-62.5, 90.0, -500.0));
    }
}
