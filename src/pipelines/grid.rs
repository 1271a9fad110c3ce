use crate::{
    data_structures::geometry::{MeshVertex, Vertex},
    pipelines::{DEPTH, RenderState, SceneLayouts, mk_render_pipeline, untextured_layout},
};

/// Ground surfaces: the floor and the sidewalks.
pub fn mk_grid_pipeline(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    color_format: wgpu::TextureFormat,
    state: &RenderState,
) -> wgpu::RenderPipeline {
    let layout = untextured_layout(device, layouts, "Grid Pipeline Layout");
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Grid Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("grid.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        color_format,
        state,
        DEPTH,
        &[MeshVertex::desc()],
        shader,
    )
}
