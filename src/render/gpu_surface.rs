use std::collections::HashMap;
use std::mem::size_of;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, Surface, SurfaceConfiguration,
    TextureFormat, TextureView,
};
use winit::window::Window;

use super::{FrameView, RenderSurface};
use crate::config::EngineConfig;
use crate::core::{GpuContext, Viewport};
use crate::error::{EngineError, FrameError};
use crate::scene::{LightKind, Mesh, NodeKey, ParticleCloud, Texture, TextureHandle, Wrap};

const MAX_LIGHTS: usize = 8;
const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
/// World-space sprite extent per unit of point size × material size
const SPRITE_WORLD_SCALE: f32 = 0.1;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct LightUniform {
    position: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct GlobalsUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    light_count: [u32; 4],
    lights: [LightUniform; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    emissive: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct PointInstance {
    position: [f32; 3],
    color: [f32; 3],
    size: f32,
}

struct GpuMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    vertex_count: usize,
    index_count: u32,
    revision: u64,
}

struct GpuPoints {
    buffer: Buffer,
    count: u32,
    revision: u64,
}

/// Forward renderer presenting frames on a window surface
///
/// Vertex buffers are cached per scene node and re-uploaded only when the
/// mesh revision changes. Textures are uploaded once per handle.
pub struct GpuSurface {
    gpu: GpuContext,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    viewport: Viewport,
    max_pixel_ratio: f32,
    sample_count: u32,
    depth_view: TextureView,
    msaa_view: Option<TextureView>,
    globals_buffer: Buffer,
    globals_bind_group: BindGroup,
    object_layout: BindGroupLayout,
    object_buffer: Buffer,
    object_bind_group: BindGroup,
    object_stride: u64,
    object_capacity: usize,
    texture_layout: BindGroupLayout,
    fallback_texture: BindGroup,
    mesh_pipeline: RenderPipeline,
    points_pipeline: RenderPipeline,
    meshes: HashMap<NodeKey, GpuMesh>,
    points: Option<GpuPoints>,
    textures: HashMap<TextureHandle, BindGroup>,
    released: bool,
}

impl GpuSurface {
    /// Create a renderer bound to `window`
    pub async fn new(
        window: Arc<Window>,
        viewport: Viewport,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;
        let gpu = GpuContext::new_with_surface(&instance, &surface).await?;

        let caps = surface.get_capabilities(gpu.adapter());
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(EngineError::IncompatibleSurface)?;

        let alpha_mode = if config.transparent
            && caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };

        let (width, height) = viewport.physical_size();
        let surface_config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(gpu.device(), &surface_config);

        let sample_count = Self::supported_sample_count(&gpu, format, config.msaa_samples);
        let device = gpu.device();

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size_of::<ObjectUniform>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&GlobalsUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let object_stride = (size_of::<ObjectUniform>() as u64).div_ceil(alignment) * alignment;
        let object_capacity = 16;
        let (object_buffer, object_bind_group) =
            Self::create_object_buffer(device, &object_layout, object_stride, object_capacity);

        let white = Texture {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
            wrap: Wrap::Clamp,
        };
        let fallback_texture = Self::upload_texture(&gpu, &texture_layout, &white);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &object_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let mesh_pipeline = Self::create_mesh_pipeline(device, &layout, format, sample_count);
        let points_pipeline = Self::create_points_pipeline(device, &layout, format, sample_count);

        let (depth_view, msaa_view) = Self::create_targets(device, &surface_config, sample_count);

        log::info!(
            "Surface configured: {}x{} {:?}, {}x MSAA, {:?}",
            width,
            height,
            format,
            sample_count,
            alpha_mode
        );

        Ok(Self {
            gpu,
            surface,
            surface_config,
            viewport,
            max_pixel_ratio: config.max_pixel_ratio,
            sample_count,
            depth_view,
            msaa_view,
            globals_buffer,
            globals_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_stride,
            object_capacity,
            texture_layout,
            fallback_texture,
            mesh_pipeline,
            points_pipeline,
            meshes: HashMap::new(),
            points: None,
            textures: HashMap::new(),
            released: false,
        })
    }

    fn supported_sample_count(gpu: &GpuContext, format: TextureFormat, requested: u32) -> u32 {
        let color = gpu.adapter().get_texture_format_features(format).flags;
        let depth = gpu.adapter().get_texture_format_features(DEPTH_FORMAT).flags;
        let requested = requested.max(1);

        if requested == 1 || (color.sample_count_supported(requested) && depth.sample_count_supported(requested)) {
            requested
        } else {
            log::warn!("{}x MSAA unsupported for {:?}, rendering without it", requested, format);
            1
        }
    }

    fn create_targets(
        device: &Device,
        config: &SurfaceConfiguration,
        sample_count: u32,
    ) -> (TextureView, Option<TextureView>) {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let msaa = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("MSAA Color Texture"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: config.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        (depth.create_view(&wgpu::TextureViewDescriptor::default()), msaa)
    }

    fn create_object_buffer(
        device: &Device,
        layout: &BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (Buffer, BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<ObjectUniform>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    fn upload_texture(gpu: &GpuContext, layout: &BindGroupLayout, texture: &Texture) -> BindGroup {
        let size = wgpu::Extent3d {
            width: texture.width,
            height: texture.height,
            depth_or_array_layers: 1,
        };

        let gpu_texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Material Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue().write_texture(
            gpu_texture.as_image_copy(),
            &texture.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * texture.width),
                rows_per_image: Some(texture.height),
            },
            size,
        );

        let address_mode = match texture.wrap {
            Wrap::Repeat => wgpu::AddressMode::Repeat,
            Wrap::Clamp => wgpu::AddressMode::ClampToEdge,
        };
        let sampler = gpu.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());
        gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }

    fn create_mesh_pipeline(
        device: &Device,
        layout: &wgpu::PipelineLayout,
        format: TextureFormat,
        sample_count: u32,
    ) -> RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: size_of::<MeshVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_points_pipeline(
        device: &Device,
        layout: &wgpu::PipelineLayout,
        format: TextureFormat,
        sample_count: u32,
    ) -> RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Points Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("points.wgsl").into()),
        });

        let additive = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Points Pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: size_of::<PointInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState {
                        color: additive,
                        alpha: additive,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        })
    }

    fn write_globals(&self, frame: &FrameView<'_>) {
        let mut globals = GlobalsUniform::zeroed();
        globals.view = frame.view.to_cols_array_2d();
        globals.projection = frame.projection.to_cols_array_2d();
        globals.camera_position = frame.camera_position.extend(frame.exposure).to_array();

        let mut ambient = [0.0f32; 3];
        let mut count = 0;
        for light in &frame.lights {
            let radiance = light.color.scale(light.intensity).to_array();
            let (kind, range) = match light.kind {
                LightKind::Ambient => {
                    for (sum, c) in ambient.iter_mut().zip(radiance) {
                        *sum += c;
                    }
                    continue;
                }
                LightKind::Directional => (1.0, 0.0),
                LightKind::Point { range } => (2.0, range),
            };
            if count == MAX_LIGHTS {
                log::warn!("Dropping light beyond the first {}", MAX_LIGHTS);
                continue;
            }
            globals.lights[count] = LightUniform {
                position: light.position.extend(kind).to_array(),
                color: [radiance[0], radiance[1], radiance[2], range],
            };
            count += 1;
        }
        globals.ambient = [ambient[0], ambient[1], ambient[2], 1.0];
        globals.light_count = [count as u32, 0, 0, 0];

        self.gpu
            .queue()
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Pack one uniform slot per mesh plus one for the particles
    fn write_objects(&mut self, frame: &FrameView<'_>) {
        let needed = frame.meshes.len() + 1;
        if needed > self.object_capacity {
            self.object_capacity = needed.next_power_of_two();
            let (buffer, bind_group) = Self::create_object_buffer(
                self.gpu.device(),
                &self.object_layout,
                self.object_stride,
                self.object_capacity,
            );
            self.object_buffer = buffer;
            self.object_bind_group = bind_group;
        }

        let stride = self.object_stride as usize;
        let mut bytes = vec![0u8; stride * needed];

        for (slot, draw) in frame.meshes.iter().enumerate() {
            let material = draw.material;
            let [r, g, b] = material.color.to_array();
            let object = ObjectUniform {
                model: draw.model.to_cols_array_2d(),
                normal_matrix: draw.model.inverse().transpose().to_cols_array_2d(),
                color: [r, g, b, material.opacity],
                emissive: [material.emissive.r, material.emissive.g, material.emissive.b, 0.0],
                params: [material.roughness, material.metalness, 0.0, 0.0],
            };
            let offset = slot * stride;
            bytes[offset..offset + size_of::<ObjectUniform>()].copy_from_slice(bytemuck::bytes_of(&object));
        }

        if let Some(points) = &frame.points {
            let object = ObjectUniform {
                model: points.model.to_cols_array_2d(),
                normal_matrix: Mat4::IDENTITY.to_cols_array_2d(),
                color: [1.0, 1.0, 1.0, points.material.opacity],
                emissive: [0.0; 4],
                params: [0.0, 0.0, 0.0, points.material.size * SPRITE_WORLD_SCALE],
            };
            let offset = frame.meshes.len() * stride;
            bytes[offset..offset + size_of::<ObjectUniform>()].copy_from_slice(bytemuck::bytes_of(&object));
        }

        self.gpu.queue().write_buffer(&self.object_buffer, 0, &bytes);
    }

    fn prepare_meshes(&mut self, frame: &FrameView<'_>) {
        for draw in &frame.meshes {
            let up_to_date = self.meshes.get(&draw.node).is_some_and(|cached| {
                cached.revision == draw.mesh.revision() && cached.vertex_count == draw.mesh.vertex_count()
            });
            if up_to_date {
                continue;
            }

            let vertices = mesh_vertices(draw.mesh);
            let same_layout = self
                .meshes
                .get(&draw.node)
                .is_some_and(|cached| cached.vertex_count == draw.mesh.vertex_count());

            if same_layout {
                if let Some(cached) = self.meshes.get_mut(&draw.node) {
                    self.gpu
                        .queue()
                        .write_buffer(&cached.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
                    cached.revision = draw.mesh.revision();
                }
            } else {
                let mesh = self.create_mesh(draw.mesh, &vertices);
                self.meshes.insert(draw.node, mesh);
            }
        }
    }

    fn create_mesh(&self, mesh: &Mesh, vertices: &[MeshVertex]) -> GpuMesh {
        let device = self.gpu.device();
        GpuMesh {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            }),
            index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            vertex_count: mesh.vertex_count(),
            index_count: mesh.indices.len() as u32,
            revision: mesh.revision(),
        }
    }

    fn prepare_points(&mut self, frame: &FrameView<'_>) {
        let Some(points) = &frame.points else {
            return;
        };
        let cloud = points.cloud;

        if let Some(cached) = self.points.as_mut().filter(|c| c.count as usize == cloud.len()) {
            if cached.revision != cloud.revision() {
                self.gpu
                    .queue()
                    .write_buffer(&cached.buffer, 0, bytemuck::cast_slice(&point_instances(cloud)));
                cached.revision = cloud.revision();
            }
            return;
        }

        let buffer = self.gpu.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Instance Buffer"),
            contents: bytemuck::cast_slice(&point_instances(cloud)),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        self.points = Some(GpuPoints {
            buffer,
            count: cloud.len() as u32,
            revision: cloud.revision(),
        });
    }

    fn prepare_textures(&mut self, frame: &FrameView<'_>) {
        let maps = frame
            .meshes
            .iter()
            .filter_map(|draw| draw.material.map)
            .chain(frame.points.as_ref().and_then(|p| p.material.map));

        for handle in maps {
            if self.textures.contains_key(&handle) {
                continue;
            }
            if let Some(texture) = frame.materials.texture(handle) {
                let bind_group = Self::upload_texture(&self.gpu, &self.texture_layout, texture);
                self.textures.insert(handle, bind_group);
            }
        }
    }

    fn texture_for(&self, map: Option<TextureHandle>) -> &BindGroup {
        map.and_then(|handle| self.textures.get(&handle))
            .unwrap_or(&self.fallback_texture)
    }
}

impl RenderSurface for GpuSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        let viewport = viewport.with_pixel_ratio(viewport.pixel_ratio, self.max_pixel_ratio);
        let (width, height) = viewport.physical_size();
        self.viewport = viewport;
        if self.released {
            return;
        }

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(self.gpu.device(), &self.surface_config);

        let (depth_view, msaa_view) =
            Self::create_targets(self.gpu.device(), &self.surface_config, self.sample_count);
        self.depth_view = depth_view;
        self.msaa_view = msaa_view;
        log::debug!("Surface resized to {}x{}", width, height);
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), FrameError> {
        if self.released {
            return Err(FrameError::Released);
        }

        self.write_globals(frame);
        self.prepare_meshes(frame);
        self.prepare_points(frame);
        self.prepare_textures(frame);
        self.write_objects(frame);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                let err = FrameError::from(err);
                if err.needs_reconfigure() {
                    self.surface.configure(self.gpu.device(), &self.surface_config);
                }
                return Err(err);
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (view, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&surface_view)),
            None => (&surface_view, None),
        };
        let clear = if frame.transparent {
            wgpu::Color::TRANSPARENT
        } else {
            wgpu::Color::BLACK
        };

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.globals_bind_group, &[]);

            pass.set_pipeline(&self.mesh_pipeline);
            for (slot, draw) in frame.meshes.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&draw.node) else {
                    continue;
                };
                let offset = (slot as u64 * self.object_stride) as u32;
                pass.set_bind_group(1, &self.object_bind_group, &[offset]);
                pass.set_bind_group(2, self.texture_for(draw.material.map), &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if let (Some(points), Some(cached)) = (&frame.points, &self.points) {
                let offset = (frame.meshes.len() as u64 * self.object_stride) as u32;
                pass.set_pipeline(&self.points_pipeline);
                pass.set_bind_group(1, &self.object_bind_group, &[offset]);
                pass.set_bind_group(2, self.texture_for(points.material.map), &[]);
                pass.set_vertex_buffer(0, cached.buffer.slice(..));
                pass.draw(0..6, 0..cached.count);
            }
        }

        self.gpu.queue().submit(Some(encoder.finish()));
        surface_texture.present();

        Ok(())
    }

    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.meshes.clear();
        self.textures.clear();
        self.points = None;
        self.released = true;
        log::debug!("Released GPU surface bindings");
        true
    }
}

fn mesh_vertices(mesh: &Mesh) -> Vec<MeshVertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .zip(&mesh.uvs)
        .map(|((&position, &normal), &uv)| MeshVertex { position, normal, uv })
        .collect()
}

fn point_instances(cloud: &ParticleCloud) -> Vec<PointInstance> {
    cloud
        .positions
        .iter()
        .zip(&cloud.colors)
        .zip(&cloud.sizes)
        .map(|((position, color), &size)| PointInstance {
            position: position.to_array(),
            color: color.to_array(),
            size,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layouts_match_shader() {
        assert_eq!(size_of::<LightUniform>(), 32);
        assert_eq!(size_of::<GlobalsUniform>(), 432);
        assert_eq!(size_of::<ObjectUniform>(), 176);
        assert_eq!(size_of::<MeshVertex>(), 32);
        assert_eq!(size_of::<PointInstance>(), 28);
    }

    #[test]
    fn plane_vertices_interleave_attributes() {
        let mesh = crate::scene::primitives::plane(3.0, 2.0, 1, 1);
        let vertices = mesh_vertices(&mesh);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[0].position, [-1.5, 1.0, 0.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[0].uv, [0.0, 1.0]);
    }
}
