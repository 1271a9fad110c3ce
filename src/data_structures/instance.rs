//! Per-instance offsets for instanced geometry.
//!
//! Instanced elements share one base geometry and translate it per instance
//! by an `(x, y, z)` offset read by the vertex stage. The offsets are built
//! once and never change; scrolling happens in the shader.

use anyhow::bail;

use crate::data_structures::geometry::Vertex;

/// One translation triple per instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceOffsets {
    offsets: Vec<[f32; 3]>,
}

impl InstanceOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds offsets from a flat `x, y, z, x, y, z, ...` buffer.
    ///
    /// A buffer whose length is not a multiple of three would shift every
    /// following instance, so it is rejected instead of silently truncated.
    pub fn from_flat(flat: &[f32]) -> anyhow::Result<Self> {
        if flat.len() % 3 != 0 {
            bail!(
                "instance buffer holds {} floats, which is not a whole number of (x, y, z) offsets",
                flat.len()
            );
        }
        Ok(Self {
            offsets: flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
        })
    }

    pub fn push(&mut self, x: f32, y: f32, z: f32) {
        self.offsets.push([x, y, z]);
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32; 3]> {
        self.offsets.iter()
    }

    pub fn to_raw(&self) -> Vec<InstanceRaw> {
        self.offsets
            .iter()
            .map(|&offset| InstanceRaw { offset })
            .collect()
    }
}

impl FromIterator<[f32; 3]> for InstanceOffsets {
    fn from_iter<T: IntoIterator<Item = [f32; 3]>>(iter: T) -> Self {
        Self {
            offsets: iter.into_iter().collect(),
        }
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    offset: [f32; 3],
}

impl Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // The shader only advances to the next offset when it starts a new instance
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 5,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_buffer_is_split_into_triples() {
        let offsets = InstanceOffsets::from_flat(&[0.0, 0.0, 0.0, 0.0, 0.0, 260.0]).unwrap();
        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets.iter().nth(1), Some(&[0.0, 0.0, 260.0]));
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        assert!(InstanceOffsets::from_flat(&[0.0; 8]).is_err());
    }
}
