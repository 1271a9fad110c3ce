//! Scene data structures: geometry, materials, scene graph and GPU textures.
//!
//! - `geometry` holds CPU-side vertex data and the procedural primitives
//! - `transform` is the local position/rotation/scale of a node
//! - `instance` holds per-instance offsets for instanced meshes
//! - `material` pairs a shader program with its typed uniforms
//! - `scene_graph` is the owned node tree the renderer walks
//! - `shading` mirrors the shader maths on the CPU
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod geometry;
pub mod instance;
pub mod material;
pub mod scene_graph;
pub mod shading;
pub mod texture;
pub mod transform;
