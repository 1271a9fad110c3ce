//! CPU-side mesh geometry and procedural primitives.
//!
//! Every static element of the scene is built from a handful of primitives
//! (planes, cylinders, cones, circles), moved into place with affine
//! transforms and then merged so that one element is one draw call.
//!
//! The primitive layouts (vertex order, winding, uv mapping) follow the
//! conventions of the common WebGL primitives so that transforms applied in
//! the same order produce the same buffers:
//!
//! - planes lie in the XY plane facing +Z
//! - cylinders and cones stand on the Y axis, centred on the origin
//! - circles lie in the XY plane with the centre as vertex 0
//!
//! Transforms are applied immediately to the vertex data, so the order of
//! calls matters: `rotate_x` followed by `rotate_z` is not `rotate_z`
//! followed by `rotate_x`.

use std::f32::consts::TAU;

use cgmath::{Matrix4, Point3, Rad, Transform as _};

/// Describes the vertex layout of a GPU buffer.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// The GPU representation of a single vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex for MeshVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Indexed triangle geometry with positions and texture coordinates.
///
/// `positions` and `uvs` always have the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// A `width` × `height` rectangle in the XY plane, split into
    /// `width_segments` × `height_segments` cells.
    pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let grid_x = width_segments.max(1);
        let grid_y = height_segments.max(1);
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;

        let mut geometry = Self::default();
        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height / 2.0;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width / 2.0;
                geometry.positions.push([x, -y, 0.0]);
                geometry
                    .uvs
                    .push([ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32]);
            }
        }

        let row = grid_x + 1;
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = (ix + 1) + row * (iy + 1);
                let d = (ix + 1) + row * iy;
                geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        geometry
    }

    /// A (possibly tapered) tube around the Y axis.
    ///
    /// Only the side is generated when `open_ended` is set; otherwise the
    /// top and bottom caps are added as triangle fans.
    pub fn cylinder(
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
        height_segments: u32,
        open_ended: bool,
        theta_start: f32,
    ) -> Self {
        let radial = radial_segments.max(3);
        let rows = height_segments.max(1);
        let half_height = height / 2.0;

        let mut geometry = Self::default();
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(rows as usize + 1);
        for y in 0..=rows {
            let v = y as f32 / rows as f32;
            let radius = v * (radius_bottom - radius_top) + radius_top;
            let mut row = Vec::with_capacity(radial as usize + 1);
            for x in 0..=radial {
                let u = x as f32 / radial as f32;
                let theta = u * TAU + theta_start;
                row.push(geometry.positions.len() as u32);
                geometry.positions.push([
                    radius * theta.sin(),
                    -v * height + half_height,
                    radius * theta.cos(),
                ]);
                geometry.uvs.push([u, 1.0 - v]);
            }
            grid.push(row);
        }

        let last_row = rows as usize - 1;
        for x in 0..radial as usize {
            for y in 0..rows as usize {
                let a = grid[y][x];
                let b = grid[y + 1][x];
                let c = grid[y + 1][x + 1];
                let d = grid[y][x + 1];
                // a zero radius collapses one triangle of the quad into a line
                if radius_top > 0.0 || y != 0 {
                    geometry.indices.extend_from_slice(&[a, b, d]);
                }
                if radius_bottom > 0.0 || y != last_row {
                    geometry.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        if !open_ended {
            if radius_top > 0.0 {
                geometry.push_cap(radius_top, half_height, radial, theta_start, true);
            }
            if radius_bottom > 0.0 {
                geometry.push_cap(radius_bottom, -half_height, radial, theta_start, false);
            }
        }
        geometry
    }

    /// A cone is a cylinder whose top radius is zero.
    pub fn cone(
        radius: f32,
        height: f32,
        radial_segments: u32,
        height_segments: u32,
        open_ended: bool,
        theta_start: f32,
    ) -> Self {
        Self::cylinder(
            0.0,
            radius,
            height,
            radial_segments,
            height_segments,
            open_ended,
            theta_start,
        )
    }

    /// A flat disc fan in the XY plane; vertex 0 is the centre.
    pub fn circle(radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut geometry = Self::default();
        geometry.positions.push([0.0, 0.0, 0.0]);
        geometry.uvs.push([0.5, 0.5]);

        for s in 0..=segments {
            let angle = s as f32 / segments as f32 * TAU;
            let (x, y) = (radius * angle.cos(), radius * angle.sin());
            geometry.positions.push([x, y, 0.0]);
            geometry
                .uvs
                .push([(x / radius + 1.0) / 2.0, (y / radius + 1.0) / 2.0]);
        }
        for i in 1..=segments {
            geometry.indices.extend_from_slice(&[i, i + 1, 0]);
        }
        geometry
    }

    fn push_cap(&mut self, radius: f32, y: f32, radial: u32, theta_start: f32, top: bool) {
        let centre = self.positions.len() as u32;
        self.positions.push([0.0, y, 0.0]);
        self.uvs.push([0.5, 0.5]);
        let first = self.positions.len() as u32;
        for x in 0..=radial {
            let theta = x as f32 / radial as f32 * TAU + theta_start;
            let (sin, cos) = theta.sin_cos();
            self.positions.push([radius * sin, y, radius * cos]);
            let flip = if top { 1.0 } else { -1.0 };
            self.uvs.push([cos * 0.5 + 0.5, sin * 0.5 * flip + 0.5]);
        }
        for x in 0..radial {
            let (a, b) = (first + x, first + x + 1);
            if top {
                self.indices.extend_from_slice(&[a, b, centre]);
            } else {
                self.indices.extend_from_slice(&[b, a, centre]);
            }
        }
    }

    /// Applies an affine matrix to every position.
    pub fn apply(mut self, matrix: Matrix4<f32>) -> Self {
        for position in self.positions.iter_mut() {
            let p = matrix.transform_point(Point3::new(position[0], position[1], position[2]));
            *position = [p.x, p.y, p.z];
        }
        self
    }

    pub fn translate(self, x: f32, y: f32, z: f32) -> Self {
        self.apply(Matrix4::from_translation(cgmath::Vector3::new(x, y, z)))
    }

    pub fn rotate_x(self, angle: f32) -> Self {
        self.apply(Matrix4::from_angle_x(Rad(angle)))
    }

    pub fn rotate_y(self, angle: f32) -> Self {
        self.apply(Matrix4::from_angle_y(Rad(angle)))
    }

    pub fn rotate_z(self, angle: f32) -> Self {
        self.apply(Matrix4::from_angle_z(Rad(angle)))
    }

    pub fn scale(self, x: f32, y: f32, z: f32) -> Self {
        self.apply(Matrix4::from_nonuniform_scale(x, y, z))
    }

    /// Overwrites the Y coordinate of a single vertex. Out of range indices
    /// are ignored.
    pub fn set_y(mut self, index: usize, y: f32) -> Self {
        if let Some(position) = self.positions.get_mut(index) {
            position[1] = y;
        }
        self
    }

    /// Concatenates several geometries into one, offsetting indices so each
    /// part keeps referring to its own vertices.
    pub fn merge(parts: impl IntoIterator<Item = Geometry>) -> Self {
        let mut merged = Self::default();
        for part in parts {
            let offset = merged.positions.len() as u32;
            merged.positions.extend(part.positions);
            merged.uvs.extend(part.uvs);
            merged
                .indices
                .extend(part.indices.into_iter().map(|i| i + offset));
        }
        merged
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Interleaves positions and uvs for upload.
    pub fn to_vertices(&self) -> Vec<MeshVertex> {
        self.positions
            .iter()
            .zip(self.uvs.iter())
            .map(|(&position, &uv)| MeshVertex { position, uv })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use cgmath::InnerSpace;

    use super::*;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn plane_has_four_corners_and_two_triangles() {
        let plane = Geometry::plane(12.0, 300.0, 1, 1);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.triangle_count(), 2);
        assert_eq!(plane.positions[0], [-6.0, 150.0, 0.0]);
        assert_eq!(plane.positions[3], [6.0, -150.0, 0.0]);
        assert_eq!(plane.indices, vec![0, 2, 1, 2, 3, 1]);
    }

    #[test]
    fn lying_down_a_plane_pushes_its_y_offset_into_the_distance() {
        let plane = Geometry::plane(2.0, 2.0, 1, 1)
            .translate(0.0, 110.0, 0.5)
            .rotate_x(-PI * 0.5);
        for p in &plane.positions {
            assert!((p[1] - 0.5).abs() < 1e-4, "height should come from the old z");
            assert!(p[2] < -100.0, "old +y should become -z");
        }
    }

    #[test]
    fn rotation_order_matters() {
        let base = || Geometry::plane(0.5, 300.0, 1, 1).translate(0.06, 110.0, 6.0);
        let xz = base().rotate_x(-PI * 0.5).rotate_z(PI * 0.49);
        let zx = base().rotate_z(PI * 0.49).rotate_x(-PI * 0.5);
        assert!(!approx(xz.positions[0], zx.positions[0]));
    }

    #[test]
    fn open_cone_has_apex_ring_and_base_ring() {
        let cone = Geometry::cone(5.0, 5.0, 4, 1, true, 0.0);
        assert_eq!(cone.vertex_count(), 10);
        assert_eq!(cone.triangle_count(), 4);
        assert_eq!(cone.indices, vec![5, 6, 1, 6, 7, 2, 7, 8, 3, 8, 9, 4]);
        assert!(cone.positions[..5].iter().all(|p| approx(*p, [0.0, 2.5, 0.0])));
        assert!(cone.positions[5..].iter().all(|p| (p[1] + 2.5).abs() < 1e-6));
    }

    #[test]
    fn cone_sides_have_no_zero_area_triangles() {
        let cone = Geometry::cone(5.0, 5.0, 4, 1, true, 0.3);
        for tri in cone.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| cgmath::Vector3::from(cone.positions[tri[k] as usize]));
            let area = (b - a).cross(c - a).magnitude();
            assert!(area > 1e-3, "degenerate triangle {tri:?}");
        }

        // the same collapse at the bottom of an inverted cone
        let inverted = Geometry::cylinder(2.0, 0.0, 3.0, 6, 2, true, 0.0);
        assert_eq!(inverted.triangle_count(), 6 * 2 * 2 - 6);
    }

    #[test]
    fn closed_cylinder_adds_caps() {
        let open = Geometry::cylinder(1.0, 1.0, 2.0, 8, 1, true, 0.0);
        let closed = Geometry::cylinder(1.0, 1.0, 2.0, 8, 1, false, 0.0);
        assert_eq!(closed.triangle_count(), open.triangle_count() + 16);
    }

    #[test]
    fn circle_centre_is_first_vertex() {
        let leaf = Geometry::circle(1.25, 4);
        assert_eq!(leaf.vertex_count(), 6);
        assert_eq!(leaf.triangle_count(), 4);
        assert_eq!(leaf.positions[0], [0.0, 0.0, 0.0]);
        let moved = leaf.set_y(0, 0.25);
        assert_eq!(moved.positions[0], [0.0, 0.25, 0.0]);
    }

    #[test]
    fn merge_offsets_indices() {
        let a = Geometry::plane(1.0, 1.0, 1, 1);
        let b = Geometry::plane(1.0, 1.0, 1, 1).translate(5.0, 0.0, 0.0);
        let merged = Geometry::merge([a.clone(), b]);
        assert_eq!(merged.vertex_count(), 8);
        assert_eq!(&merged.indices[..6], &a.indices[..]);
        assert_eq!(merged.indices[6..], a.indices.iter().map(|i| i + 4).collect::<Vec<_>>()[..]);
    }
}
