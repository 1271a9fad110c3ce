//! Full-screen post-processing.
//!
//! The scene is drawn into an HDR target; this pass samples it once per
//! screen pixel and writes the final image to the surface. The effect order
//! is fixed: chromatic aberration, bloom, noise, vignette, tone mapping.

use wgpu::util::DeviceExt;

use crate::{
    config::PostProcessConfig,
    data_structures::texture::Texture,
    pipelines::{RenderState, mk_render_pipeline},
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PostUniform {
    chromatic_offset: [f32; 2],
    texel_size: [f32; 2],
    bloom_threshold: f32,
    bloom_intensity: f32,
    noise_opacity: f32,
    vignette_offset: f32,
    vignette_darkness: f32,
    white_point: f32,
    time: f32,
    enabled: f32,
}

impl PostUniform {
    pub fn new(config: &PostProcessConfig, size: [u32; 2]) -> Self {
        Self {
            chromatic_offset: config.chromatic_offset,
            texel_size: texel_size(size),
            bloom_threshold: config.bloom_threshold,
            bloom_intensity: config.bloom_intensity,
            noise_opacity: config.noise_opacity,
            vignette_offset: config.vignette_offset,
            vignette_darkness: config.vignette_darkness,
            white_point: config.white_point.max(1e-3),
            time: 0.0,
            enabled: if config.enabled { 1.0 } else { 0.0 },
        }
    }
}

fn texel_size(size: [u32; 2]) -> [f32; 2] {
    [1.0 / size[0].max(1) as f32, 1.0 / size[1].max(1) as f32]
}

#[derive(Debug)]
pub struct PostProcess {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform: PostUniform,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PostProcess {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        scene: &Texture,
        config: &PostProcessConfig,
        size: [u32; 2],
    ) -> anyhow::Result<Self> {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("post_bind_group_layout"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Post Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Post Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("post.wgsl").into()),
        };
        let state = RenderState {
            blend: Some(wgpu::BlendState::REPLACE),
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            depth_write: false,
        };
        let pipeline = mk_render_pipeline(
            device,
            &pipeline_layout,
            surface_format,
            &state,
            None,
            &[],
            shader,
        );

        let uniform = PostUniform::new(config, size);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Post Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = Self::bind(device, &layout, &buffer, scene)?;

        Ok(Self {
            pipeline,
            layout,
            uniform,
            buffer,
            bind_group,
        })
    }

    fn bind(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        scene: &Texture,
    ) -> anyhow::Result<wgpu::BindGroup> {
        let sampler = scene
            .sampler
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("scene target has no sampler"))?;
        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&scene.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("post_bind_group"),
        }))
    }

    /// Rebinds a recreated scene target.
    pub fn resize(&mut self, device: &wgpu::Device, scene: &Texture, size: [u32; 2]) -> anyhow::Result<()> {
        self.uniform.texel_size = texel_size(size);
        self.bind_group = Self::bind(device, &self.layout, &self.buffer, scene)?;
        Ok(())
    }

    pub fn render(&mut self, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, time: f32) {
        self.uniform.time = time;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Post Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_the_wgsl_struct() {
        assert_eq!(std::mem::size_of::<PostUniform>(), 48);
        let uniform = PostUniform::new(&PostProcessConfig::default(), [800, 600]);
        assert_eq!(uniform.texel_size, [1.0 / 800.0, 1.0 / 600.0]);
        assert_eq!(uniform.enabled, 1.0);
        assert_eq!(uniform.white_point, 2.0);
    }

    #[test]
    fn disabled_chain_is_flagged() {
        let config = PostProcessConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(PostUniform::new(&config, [1, 1]).enabled, 0.0);
    }
}
