use crate::{
    data_structures::{
        geometry::{MeshVertex, Vertex},
        instance::InstanceRaw,
    },
    pipelines::{DEPTH, RenderState, SceneLayouts, mk_render_pipeline, untextured_layout},
};

/// Instanced props. Reads the per-instance offset from the second vertex
/// buffer.
pub fn mk_scroll_pipeline(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    color_format: wgpu::TextureFormat,
    state: &RenderState,
) -> wgpu::RenderPipeline {
    let layout = untextured_layout(device, layouts, "Scroll Pipeline Layout");
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Scroll Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("scroll.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        color_format,
        state,
        DEPTH,
        &[MeshVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
