//! synthwave
//!
//! An animated synthwave scene rendered with wgpu on native targets and on
//! the web: a road running towards the horizon over a scrolling neon grid,
//! instanced palm trees and pyramids that loop past the camera, a textured
//! sky, a parallax SVG skyline and a post-processing chain on top.
//!
//! High-level modules
//! - `scene`: the scene elements, their lifecycles and asset requests
//! - `data_structures`: geometry, materials, instances and the scene graph
//! - `animation`: frame clock and the time uniform driver
//! - `placement`: random prop layout with anti-repetition
//! - `render`: GPU buffers per mesh and the frame's draw calls
//! - `pipelines`: WGSL programs and pipeline caching
//! - `resources`: loading images and SVG documents
//! - `flow`: window, event loop and async asset plumbing
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod lifecycle;
pub mod pipelines;
pub mod placement;
pub mod render;
pub mod resources;
pub mod scene;

pub use config::SceneConfig;
pub use flow::{run, run_with_config};
pub use scene::{Component, SynthwaveScene};
