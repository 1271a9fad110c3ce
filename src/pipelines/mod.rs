//! Render pipelines.
//!
//! There is one WGSL shader per [`ShaderProgram`]. The fixed-function state
//! a material asks for (culling, blending, depth writes, wireframe) is baked
//! into the pipeline, so pipelines are created lazily per [`PipelineKey`]
//! and cached for the lifetime of the renderer.
//!
//! Bind groups are shared by all scene programs:
//!
//! - group 0: camera
//! - group 1: model matrix (binding 0) and packed material uniforms (binding 1)
//! - group 2: colour map, textured program only

use std::collections::HashMap;

use crate::{
    data_structures::{
        material::{Material, ShaderProgram, Side},
        texture::Texture,
    },
    resources::texture::texture_layout,
};

pub mod grid;
pub mod post;
pub mod scroll;
pub mod standard;
pub mod textured;

/// Everything about a material that needs a distinct pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub program: ShaderProgram,
    pub side: Side,
    pub transparent: bool,
    pub depth_write: bool,
    pub wireframe: bool,
}

impl PipelineKey {
    pub fn of(material: &Material) -> Self {
        Self {
            program: material.program(),
            side: material.side,
            transparent: material.transparent,
            depth_write: material.depth_write,
            wireframe: material.wireframe,
        }
    }

    /// Fixed-function state for this key. Wireframe falls back to filled
    /// triangles when the adapter cannot rasterise lines.
    pub fn state(&self, line_mode: bool) -> RenderState {
        RenderState {
            blend: Some(if self.transparent {
                wgpu::BlendState::ALPHA_BLENDING
            } else {
                wgpu::BlendState::REPLACE
            }),
            cull_mode: match self.side {
                Side::Front => Some(wgpu::Face::Back),
                Side::Double => None,
            },
            polygon_mode: if self.wireframe && line_mode {
                wgpu::PolygonMode::Line
            } else {
                wgpu::PolygonMode::Fill
            },
            depth_write: self.depth_write,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    pub blend: Option<wgpu::BlendState>,
    pub cull_mode: Option<wgpu::Face>,
    pub polygon_mode: wgpu::PolygonMode,
    pub depth_write: bool,
}

/// Bind group layouts shared by the scene programs.
#[derive(Debug)]
pub struct SceneLayouts {
    pub camera: wgpu::BindGroupLayout,
    pub model: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let camera = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
            label: Some("camera_bind_group_layout"),
        });
        let model = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                uniform_entry(1, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            ],
            label: Some("model_bind_group_layout"),
        });
        Self {
            camera,
            model,
            texture: texture_layout(device),
        }
    }
}

/// Lazily built scene pipelines.
#[derive(Debug)]
pub struct Pipelines {
    pub layouts: SceneLayouts,
    color_format: wgpu::TextureFormat,
    line_mode: bool,
    cache: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, line_mode: bool) -> Self {
        Self {
            layouts: SceneLayouts::new(device),
            color_format,
            line_mode,
            cache: HashMap::new(),
        }
    }

    /// Makes sure a pipeline for `key` exists.
    pub fn prepare(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.cache.contains_key(&key) {
            return;
        }
        if key.wireframe && !self.line_mode {
            log::warn!("adapter cannot draw lines, {:?} wireframe is drawn filled", key.program);
        }
        let state = key.state(self.line_mode);
        let pipeline = match key.program {
            ShaderProgram::Standard => {
                standard::mk_standard_pipeline(device, &self.layouts, self.color_format, &state)
            }
            ShaderProgram::Textured => {
                textured::mk_textured_pipeline(device, &self.layouts, self.color_format, &state)
            }
            ShaderProgram::Grid => {
                grid::mk_grid_pipeline(device, &self.layouts, self.color_format, &state)
            }
            ShaderProgram::Scroll => {
                scroll::mk_scroll_pipeline(device, &self.layouts, self.color_format, &state)
            }
        };
        log::debug!("created pipeline for {key:?}");
        self.cache.insert(key, pipeline);
    }

    pub fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.cache.get(key)
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    state: &RenderState,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let label = shader.label;
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label,
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: state.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: state.cull_mode,
            polygon_mode: state.polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: state.depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// Pipeline layout for the programs without a colour map.
pub(crate) fn untextured_layout(device: &wgpu::Device, layouts: &SceneLayouts, label: &str) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[&layouts.camera, &layouts.model],
        push_constant_ranges: &[],
    })
}

pub(crate) const DEPTH: Option<wgpu::TextureFormat> = Some(Texture::DEPTH_FORMAT);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::material::Uniform;

    #[test]
    fn keys_follow_material_flags() {
        let sidewalk = Material::new(ShaderProgram::Grid)
            .double_sided()
            .transparent(0.8);
        let key = PipelineKey::of(&sidewalk);
        let state = key.state(true);
        assert_eq!(state.cull_mode, None);
        assert_eq!(state.blend, Some(wgpu::BlendState::ALPHA_BLENDING));
        assert!(state.depth_write);

        let floor = Material::new(ShaderProgram::Grid).with(Uniform::Speed, 10.0);
        assert_ne!(PipelineKey::of(&floor), key);
        assert_eq!(PipelineKey::of(&floor).state(true).cull_mode, Some(wgpu::Face::Back));
    }

    #[test]
    fn wireframe_needs_line_support() {
        let palms = Material::new(ShaderProgram::Scroll).with_wireframe();
        let key = PipelineKey::of(&palms);
        assert_eq!(key.state(true).polygon_mode, wgpu::PolygonMode::Line);
        assert_eq!(key.state(false).polygon_mode, wgpu::PolygonMode::Fill);
    }
}
