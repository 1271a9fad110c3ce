//! Vector art to triangle meshes.
//!
//! The document is parsed with `usvg`, which resolves styles, `use`
//! references and transforms. Each filled path is flattened into a `lyon`
//! path in document coordinates (transforms applied) and tessellated with
//! its own fill rule. Paths without a solid fill colour are skipped.

use anyhow::Context;
use lyon::{
    math::point,
    path::Path as LyonPath,
    tessellation::{BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers},
};
use usvg::tiny_skia_path::PathSegment;

use crate::{data_structures::geometry::Geometry, resources::load_binary};

/// One filled path of a document.
#[derive(Clone, Debug)]
pub struct SvgShape {
    pub geometry: Geometry,
    /// Linear RGB of the fill.
    pub color: [f32; 3],
    pub opacity: f32,
}

pub async fn load_svg(file_name: &str) -> anyhow::Result<Vec<SvgShape>> {
    let data = load_binary(file_name).await?;
    parse_svg(&data).with_context(|| format!("parsing {file_name}"))
}

pub fn parse_svg(data: &[u8]) -> anyhow::Result<Vec<SvgShape>> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())?;
    let mut shapes = Vec::new();
    collect(tree.root(), &mut shapes)?;
    log::debug!("svg has {} filled paths", shapes.len());
    Ok(shapes)
}

fn collect(group: &usvg::Group, shapes: &mut Vec<SvgShape>) -> anyhow::Result<()> {
    for node in group.children() {
        match node {
            usvg::Node::Group(group) => collect(group, shapes)?,
            usvg::Node::Path(path) => {
                if let Some(shape) = fill_shape(path)? {
                    shapes.push(shape);
                }
            }
            _ => (),
        }
    }
    Ok(())
}

fn fill_shape(path: &usvg::Path) -> anyhow::Result<Option<SvgShape>> {
    if !path.is_visible() {
        return Ok(None);
    }
    let Some(fill) = path.fill() else {
        return Ok(None);
    };
    let usvg::Paint::Color(color) = fill.paint() else {
        log::trace!("skipping non-solid fill of {}", path.id());
        return Ok(None);
    };
    let rule = match fill.rule() {
        usvg::FillRule::NonZero => FillRule::NonZero,
        usvg::FillRule::EvenOdd => FillRule::EvenOdd,
    };

    let outline = flatten(path);
    let geometry = tessellate(&outline, rule)?;
    if geometry.is_empty() {
        return Ok(None);
    }

    Ok(Some(SvgShape {
        geometry,
        color: crate::data_structures::material::rgb8(color.red, color.green, color.blue),
        opacity: fill.opacity().get(),
    }))
}

/// Converts a path into a `lyon` path in document space.
fn flatten(path: &usvg::Path) -> LyonPath {
    let t = path.abs_transform();
    let map = |p: usvg::tiny_skia_path::Point| {
        point(t.sx * p.x + t.kx * p.y + t.tx, t.ky * p.x + t.sy * p.y + t.ty)
    };

    let mut builder = LyonPath::builder();
    let mut open = false;
    for segment in path.data().segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                if open {
                    builder.end(false);
                }
                builder.begin(map(p));
                open = true;
            }
            PathSegment::LineTo(p) if open => {
                builder.line_to(map(p));
            }
            PathSegment::QuadTo(c, p) if open => {
                builder.quadratic_bezier_to(map(c), map(p));
            }
            PathSegment::CubicTo(c1, c2, p) if open => {
                builder.cubic_bezier_to(map(c1), map(c2), map(p));
            }
            PathSegment::Close if open => {
                builder.end(true);
                open = false;
            }
            _ => (),
        }
    }
    if open {
        builder.end(false);
    }
    builder.build()
}

/// Fills the outline. Vertices stay in the XY plane; uvs are the raw
/// coordinates.
fn tessellate(outline: &LyonPath, rule: FillRule) -> anyhow::Result<Geometry> {
    let mut buffers: VertexBuffers<[f32; 3], u32> = VertexBuffers::new();
    FillTessellator::new().tessellate_path(
        outline,
        &FillOptions::default().with_fill_rule(rule),
        &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
            let p = vertex.position();
            [p.x, p.y, 0.0]
        }),
    )?;

    Ok(Geometry {
        uvs: buffers.vertices.iter().map(|p| [p[0], p[1]]).collect(),
        positions: buffers.vertices,
        indices: buffers.indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
        <rect x="10" y="10" width="20" height="20" fill="#ff0000"/>
        <g transform="translate(50 0)">
            <rect x="0" y="0" width="10" height="10" fill="#ffffff" fill-opacity="0.5"/>
        </g>
        <rect x="0" y="50" width="10" height="10" fill="none" stroke="#000000"/>
    </svg>"##;

    #[test]
    fn filled_paths_become_shapes_in_document_order() {
        let shapes = parse_svg(DOC.as_bytes()).unwrap();
        assert_eq!(shapes.len(), 2);

        let red = &shapes[0];
        assert!((red.color[0] - 1.0).abs() < 1e-5);
        assert_eq!(&red.color[1..], &[0.0, 0.0]);
        assert_eq!(red.geometry.triangle_count(), 2);
        assert!(red.geometry.positions.iter().all(|p| (10.0..=30.0).contains(&p[0])));

        let moved = &shapes[1];
        assert!((moved.opacity - 0.5).abs() < 0.01);
        assert!(moved.geometry.positions.iter().all(|p| (50.0..=60.0).contains(&p[0])));
        assert!(moved.geometry.positions.iter().all(|p| p[2] == 0.0));
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(parse_svg(b"<svg").is_err());
    }
}
