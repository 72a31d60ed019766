//! wgpu backend: surface, pipelines and the per-frame draw.
//!
//! Particle attributes live in one vertex buffer per column, managed by
//! [`RenderSync`]. The ground quad shares those buffers through their static
//! tail region.
//!
//! Draw order per frame:
//!
//! | Pass | Pipeline | Depth write |
//! |------|----------|-------------|
//! | Ground | `vs_ground` / `fs_ground`, triangle strip | on |
//! | Opaque particles | `fs_opaque` (alpha == 1) | on |
//! | Translucent particles | `fs_translucent` (alpha < 1) | off |

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::CameraState;
use crate::error::GpuError;
use crate::store::ParticleStore;
use crate::sync::{ParticleAttribute, RenderSync, SceneLayout, StaticGeometry, UploadBuffer};

pub const PARTICLE_SHADER: &str = include_str!("particles.wgsl");

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::WHITE;
const LIGHT_DIR: Vec3 = Vec3::new(1.0, -1.0, 1.0);
const AMBIENT: f32 = 0.2;
const LIGHT_INTENSITY: f32 = 1.0;
const SPEC_TERM: f32 = 80.0;
/// World radius per unit of particle size.
const SPRITE_SCALE: f32 = 0.005;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    view_dir: [f32; 3],
    spec_term: f32,
    camera_right: [f32; 3],
    sprite_scale: f32,
    camera_up: [f32; 3],
    ambient: f32,
    light_dir: [f32; 3],
    light_intensity: f32,
}

impl Uniforms {
    fn new(camera: &CameraState, aspect: f32) -> Self {
        Self {
            view_proj: camera.view_projection(aspect).to_cols_array_2d(),
            view_dir: camera.view_dir().to_array(),
            spec_term: SPEC_TERM,
            camera_right: camera.right_dir().to_array(),
            sprite_scale: SPRITE_SCALE,
            camera_up: camera.up_dir().to_array(),
            ambient: AMBIENT,
            light_dir: LIGHT_DIR.to_array(),
            light_intensity: LIGHT_INTENSITY,
        }
    }
}

/// A vertex buffer plus the queue that writes into it.
pub struct GpuBuffer {
    buffer: wgpu::Buffer,
    queue: wgpu::Queue,
}

impl GpuBuffer {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, size: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            queue: queue.clone(),
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl UploadBuffer for GpuBuffer {
    fn write(&mut self, offset: u64, data: &[u8]) {
        if !data.is_empty() {
            self.queue.write_buffer(&self.buffer, offset, data);
        }
    }
}

fn vertex_format(attribute: ParticleAttribute) -> wgpu::VertexFormat {
    match attribute.element_size() {
        16 => wgpu::VertexFormat::Float32x4,
        12 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32,
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    ground_pipeline: wgpu::RenderPipeline,
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    sync: RenderSync<GpuBuffer>,
    ground_vertices: u32,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, capacity: usize) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        tracing::info!(adapter = ?adapter.get_info().name, "GPU adapter selected");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        // Attribute buffers, ground geometry in the tail
        let ground = StaticGeometry::ground();
        let layout = SceneLayout::new(capacity, ground.vertex_count());
        let mut sync = RenderSync::new(layout, |attribute, size| {
            GpuBuffer::new(&device, &queue, attribute.label(), size)
        });
        sync.write_static(&ground);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        // One instance-rate buffer per attribute, bound at its own location
        let particle_attributes = ParticleAttribute::ALL.map(|a| {
            [wgpu::VertexAttribute {
                offset: 0,
                shader_location: a.location(),
                format: vertex_format(a),
            }]
        });
        let particle_buffers: Vec<wgpu::VertexBufferLayout> = ParticleAttribute::ALL
            .iter()
            .zip(particle_attributes.iter())
            .map(|(a, attributes)| wgpu::VertexBufferLayout {
                array_stride: a.element_size(),
                step_mode: wgpu::VertexStepMode::Instance,
                attributes,
            })
            .collect();

        let ground_attributes = [
            [wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
            [wgpu::VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            }],
        ];
        let ground_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: ParticleAttribute::Position.element_size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &ground_attributes[0],
            },
            wgpu::VertexBufferLayout {
                array_stride: ParticleAttribute::StartColor.element_size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &ground_attributes[1],
            },
        ];

        let format = config.format;
        let ground_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            PipelineDesc {
                label: "Ground Pipeline",
                vs: "vs_ground",
                fs: "fs_ground",
                buffers: &ground_buffers,
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                depth_write: true,
            },
        );
        let opaque_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            PipelineDesc {
                label: "Opaque Particle Pipeline",
                vs: "vs_particle",
                fs: "fs_opaque",
                buffers: &particle_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: true,
            },
        );
        let translucent_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            PipelineDesc {
                label: "Translucent Particle Pipeline",
                vs: "vs_particle",
                fs: "fs_translucent",
                buffers: &particle_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: false,
            },
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            ground_pipeline,
            opaque_pipeline,
            translucent_pipeline,
            uniform_buffer,
            uniform_bind_group,
            depth_texture,
            sync,
            ground_vertices: ground.vertex_count() as u32,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface at its current size.
    pub fn reconfigure(&mut self) {
        self.resize(winit::dpi::PhysicalSize::new(self.config.width, self.config.height));
    }

    /// Upload the live particles. Skip while paused to keep drawing the last state.
    pub fn upload<const N: usize>(&mut self, store: &ParticleStore<N>) {
        self.sync.sync(store);
    }

    fn update_uniforms(&mut self, camera: &CameraState) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let uniforms = Uniforms::new(camera, aspect);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn render(&mut self, camera: &CameraState) -> Result<(), wgpu::SurfaceError> {
        self.update_uniforms(camera);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            let buffers = self.sync.buffers();

            // Ground: static tail of the position and colour buffers
            let first = self.sync.layout().static_first_vertex();
            render_pass.set_pipeline(&self.ground_pipeline);
            render_pass.set_vertex_buffer(0, buffers.position.buffer().slice(..));
            render_pass.set_vertex_buffer(1, buffers.start_color.buffer().slice(..));
            render_pass.draw(first..first + self.ground_vertices, 0..1);

            let count = self.sync.draw_count();
            if count > 0 {
                for attribute in ParticleAttribute::ALL {
                    render_pass.set_vertex_buffer(
                        attribute.location(),
                        buffers.get(attribute).buffer().slice(..),
                    );
                }

                render_pass.set_pipeline(&self.opaque_pipeline);
                render_pass.draw(0..6, 0..count);

                render_pass.set_pipeline(&self.translucent_pipeline);
                render_pass.draw(0..6, 0..count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth_write: bool,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    desc: PipelineDesc<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(desc.vs),
            buffers: desc.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(desc.fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
