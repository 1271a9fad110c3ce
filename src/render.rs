//! Drawing the scene graph.
//!
//! The [`Renderer`] keeps one set of GPU buffers per mesh, keyed by the
//! mesh's [`NodeId`]. Every frame it walks the graph in child order,
//! uploads buffers for meshes it has not seen yet, drops buffers of meshes
//! that left the graph, rewrites model and material uniforms, and records
//! one draw call per mesh. The scene pass renders into an HDR target which
//! the post-processing pass resolves onto the surface.

use std::collections::{HashMap, HashSet};

use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use crate::{
    camera::CameraUniform,
    config::SceneConfig,
    data_structures::{
        instance::InstanceOffsets,
        material::ShaderProgram,
        scene_graph::{MeshNode, NodeId},
        texture::{Texture, create_default_sampler},
    },
    pipelines::{Pipelines, PipelineKey, post::PostProcess},
    resources::texture::texture_bind_group,
    scene::SynthwaveScene,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
}

/// GPU resources of a single mesh.
#[derive(Debug)]
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: Option<wgpu::Buffer>,
    instance_count: u32,
    model_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture_bind_group: Option<wgpu::BindGroup>,
    key: PipelineKey,
}

pub struct Renderer {
    pipelines: Pipelines,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    meshes: HashMap<NodeId, GpuMesh>,
    draw_order: Vec<NodeId>,
    depth_texture: Texture,
    hdr_target: Texture,
    post: PostProcess,
    clear_colour: wgpu::Color,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        size: [u32; 2],
        line_mode: bool,
        config: &SceneConfig,
    ) -> anyhow::Result<Self> {
        let pipelines = Pipelines::new(device, Texture::HDR_FORMAT, line_mode);

        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipelines.layouts.camera,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let depth_texture = Texture::create_depth_texture(device, size, "depth_texture");
        let hdr_target = Texture::create_hdr_target(device, size, "hdr_target");
        let post = PostProcess::new(device, surface_format, &hdr_target, &config.post, size)?;

        Ok(Self {
            pipelines,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            sampler: create_default_sampler(device),
            meshes: HashMap::new(),
            draw_order: Vec::new(),
            depth_texture,
            hdr_target,
            post,
            clear_colour: config.clear_colour,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: [u32; 2]) -> anyhow::Result<()> {
        self.depth_texture = Texture::create_depth_texture(device, size, "depth_texture");
        self.hdr_target = Texture::create_hdr_target(device, size, "hdr_target");
        self.post.resize(device, &self.hdr_target, size)
    }

    /// Number of meshes with live GPU buffers.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Brings GPU state in line with the scene graph.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &SynthwaveScene) {
        self.camera_uniform.update_view_proj(&scene.camera);
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );

        self.draw_order.clear();
        let mut live = HashSet::new();
        let mut visits: Vec<(&MeshNode, Matrix4<f32>)> = Vec::new();
        scene.root().walk(&mut |mesh, world| visits.push((mesh, world)));

        for (mesh, world) in visits {
            if mesh.geometry.is_empty() {
                continue;
            }
            live.insert(mesh.id());
            if !self.meshes.contains_key(&mesh.id()) {
                let gpu = self.upload(device, queue, mesh);
                self.meshes.insert(mesh.id(), gpu);
            }
            let Some(gpu) = self.meshes.get(&mesh.id()) else {
                continue;
            };
            let model = ModelUniform { model: world.into() };
            queue.write_buffer(&gpu.model_buffer, 0, bytemuck::cast_slice(&[model]));
            queue.write_buffer(&gpu.material_buffer, 0, &mesh.material.pack());
            self.pipelines.prepare(device, gpu.key);
            self.draw_order.push(mesh.id());
        }

        let before = self.meshes.len();
        self.meshes.retain(|id, _| live.contains(id));
        if self.meshes.len() != before {
            log::debug!("released {} meshes", before - self.meshes.len());
        }
    }

    fn upload(&self, device: &wgpu::Device, queue: &wgpu::Queue, mesh: &MeshNode) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.geometry.to_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let program = mesh.material.program();
        // the scroll program always reads an instance offset
        let instances = match (&mesh.instances, program) {
            (Some(offsets), _) if !offsets.is_empty() => Some(offsets.to_raw()),
            (_, ShaderProgram::Scroll) => Some(InstanceOffsets::from_iter([[0.0; 3]]).to_raw()),
            _ => None,
        };
        let instance_count = instances.as_ref().map_or(1, Vec::len) as u32;
        let instance_buffer = instances.map(|raw| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Instance Buffer", mesh.name)),
                contents: bytemuck::cast_slice(&raw),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} Model Buffer", mesh.name)),
            size: std::mem::size_of::<ModelUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let material_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} Material Buffer", mesh.name)),
            size: program.uniform_size() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.pipelines.layouts.model,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material_buffer.as_entire_binding(),
                },
            ],
            label: Some("model_bind_group"),
        });

        let texture_bind_group = (program == ShaderProgram::Textured).then(|| {
            let texture = match &mesh.material.texture {
                Some(image) => Texture::from_rgba(device, queue, image, Some(&mesh.name)),
                None => {
                    log::warn!("{} uses a textured material without a texture", mesh.name);
                    Texture::create_blank(device, queue)
                }
            };
            texture_bind_group(
                device,
                &self.pipelines.layouts.texture,
                &texture,
                &self.sampler,
                "texture_bind_group",
            )
        });

        log::debug!(
            "uploaded {}: {} vertices, {} instances",
            mesh.name,
            mesh.geometry.vertex_count(),
            instance_count
        );

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: mesh.geometry.indices.len() as u32,
            instance_buffer,
            instance_count,
            model_buffer,
            material_buffer,
            bind_group,
            texture_bind_group,
            key: PipelineKey::of(&mesh.material),
        }
    }

    /// Records and submits the scene pass and the post pass onto `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        time: f32,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.hdr_target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for id in &self.draw_order {
                let Some(gpu) = self.meshes.get(id) else {
                    continue;
                };
                let Some(pipeline) = self.pipelines.get(&gpu.key) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &gpu.bind_group, &[]);
                if let Some(group) = &gpu.texture_bind_group {
                    pass.set_bind_group(2, group, &[]);
                }
                pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                if let Some(instances) = &gpu.instance_buffer {
                    pass.set_vertex_buffer(1, instances.slice(..));
                }
                pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu.index_count, 0, 0..gpu.instance_count);
            }
        }

        self.post.render(queue, &mut encoder, target, time);
        queue.submit(std::iter::once(encoder.finish()));
    }
}
