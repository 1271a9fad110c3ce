//! Node transforms for the scene graph.
//!
//! A [`Transform`] is the local position/rotation/scale of a group or mesh.
//! World matrices are composed parent-first while walking the graph.

use cgmath::{One, Vector3};

/// Position, rotation (as quaternion) and scale of a scene node.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::new()
        }
    }

    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    /// Translate * Rotate * Scale, the same order the vertex stage expects.
    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector4;

    use super::*;

    #[test]
    fn mirrored_group_flips_y() {
        let group = Transform::at(-62.5, 90.0, -500.0).with_scale(0.11, -0.11, 0.11);
        let p = group.to_matrix() * Vector4::new(100.0, 100.0, 0.0, 1.0);
        assert!((p.x - (-62.5 + 11.0)).abs() < 1e-4);
        assert!((p.y - (90.0 - 11.0)).abs() < 1e-4);
        assert!((p.z + 500.0).abs() < 1e-4);
    }
}
