use crate::{
    data_structures::geometry::{MeshVertex, Vertex},
    pipelines::{DEPTH, RenderState, SceneLayouts, mk_render_pipeline, untextured_layout},
};

pub fn mk_standard_pipeline(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    color_format: wgpu::TextureFormat,
    state: &RenderState,
) -> wgpu::RenderPipeline {
    let layout = untextured_layout(device, layouts, "Standard Pipeline Layout");
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Standard Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("standard.wgsl").into()),
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
