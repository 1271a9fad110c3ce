use crate::{
    data_structures::geometry::{MeshVertex, Vertex},
    pipelines::{DEPTH, RenderState, SceneLayouts, mk_render_pipeline},
};

pub fn mk_textured_pipeline(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    color_format: wgpu::TextureFormat,
    state: &RenderState,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Textured Pipeline Layout"),
        bind_group_layouts: &[&layouts.camera, &layouts.model, &layouts.texture],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Textured Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("textured.wgsl").into()),
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
