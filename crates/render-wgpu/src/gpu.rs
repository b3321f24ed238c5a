use crate::RenderError;
use crate::cube_target::{CUBE_FORMAT, CubeRenderTarget};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use mirrorscene_common::{Color, EnvMapId, GeometryId};
use mirrorscene_render::{CUBE_FACES, CubeCamera, PerspectiveCamera, SceneRenderer};
use mirrorscene_scene::{DrawItem, Lighting, LineItem, Material, Scene};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera slots: one per cube face, then the main view.
const CAMERA_SLOTS: u64 = 7;
const MAIN_CAMERA_SLOT: u32 = 6;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CameraUniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    sky_color: [f32; 4],
    ground_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ModelUniforms {
    world: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineVertex {
    position: [f32; 3],
    color: [f32; 4],
}

fn camera_uniforms(view_proj: Mat4, eye: Vec3, lighting: &Lighting) -> CameraUniforms {
    let black = Color::new(0.0, 0.0, 0.0);
    let (light_dir, light_color) = match lighting.directional {
        Some((dir, light)) => (dir, light.color.scaled(light.intensity)),
        None => (Vec3::Y, black),
    };
    let (sky, ground) = match lighting.hemisphere {
        Some(h) => (
            h.sky_color.scaled(h.intensity),
            h.ground_color.scaled(h.intensity),
        ),
        None => (black, black),
    };
    CameraUniforms {
        view_proj: view_proj.to_cols_array_2d(),
        eye: eye.extend(1.0).to_array(),
        light_dir: light_dir.extend(0.0).to_array(),
        light_color: light_color.to_rgba(),
        sky_color: sky.to_rgba(),
        ground_color: ground.to_rgba(),
    }
}

fn model_uniforms(world: Mat4, color: [f32; 4]) -> ModelUniforms {
    let normal = if world.determinant().abs() > f32::EPSILON {
        world.inverse().transpose()
    } else {
        world
    };
    ModelUniforms {
        world: world.to_cols_array_2d(),
        normal: normal.to_cols_array_2d(),
        color,
    }
}

/// Copy each value into its own `stride`-sized slot.
fn pack_slots<T: Pod>(values: &[T], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; values.len() * stride];
    for (i, v) in values.iter().enumerate() {
        let src = bytemuck::bytes_of(v);
        bytes[i * stride..i * stride + src.len()].copy_from_slice(src);
    }
    bytes
}

fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Axis lines of unit length: +X red, +Y green, +Z blue.
fn axes_mesh() -> Vec<LineVertex> {
    let axes = [
        ([1.0, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
        ([0.0, 1.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0]),
    ];
    axes.iter()
        .flat_map(|&(end, color)| {
            [
                LineVertex {
                    position: [0.0, 0.0, 0.0],
                    color,
                },
                LineVertex {
                    position: end,
                    color,
                },
            ]
        })
        .collect()
}

/// Whether the cube target must be (re)created before capturing at
/// `requested` texels, given the size of the existing target if any.
fn cube_target_stale(
    existing: Option<u32>,
    requested: u32,
    max: u32,
) -> Result<bool, RenderError> {
    if requested > max {
        return Err(RenderError::CubeTooLarge { requested, max });
    }
    Ok(existing != Some(requested))
}

/// A pass writing into `writing` must not sample that same cube map.
fn can_sample(env_map: EnvMapId, writing: Option<EnvMapId>) -> bool {
    writing != Some(env_map)
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Pipelines compiled for one colour format and winding.
struct PipelineSet {
    lit: wgpu::RenderPipeline,
    mirror: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
}

struct Layouts {
    camera: wgpu::BindGroupLayout,
    model: wgpu::BindGroupLayout,
    env: wgpu::BindGroupLayout,
}

impl Layouts {
    fn new(device: &wgpu::Device) -> Self {
        let dynamic_uniform = |label, size: usize| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(size as u64),
                    },
                    count: None,
                }],
            })
        };
        let camera = dynamic_uniform("camera_bind_group_layout", size_of::<CameraUniforms>());
        let model = dynamic_uniform("model_bind_group_layout", size_of::<ModelUniforms>());

        let env = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("env_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
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

        Self { camera, model, env }
    }
}

impl PipelineSet {
    fn new(
        device: &wgpu::Device,
        layouts: &Layouts,
        format: wgpu::TextureFormat,
        front_face: wgpu::FrontFace,
    ) -> Self {
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let base_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("base_pipeline_layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.model],
            push_constant_ranges: &[],
        });
        let mirror_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mirror_pipeline_layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.model, &layouts.env],
            push_constant_ranges: &[],
        });

        let depth_stencil = || {
            Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            })
        };
        let targets = [Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];
        let mesh_buffers = [wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![
                0 => Float32x3,
                1 => Float32x3,
            ],
        }];

        let mesh_pipeline = |label, layout: &wgpu::PipelineLayout, fragment_entry| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &mesh_shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &mesh_buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &mesh_shader,
                    entry_point: Some(fragment_entry),
                    compilation_options: Default::default(),
                    targets: &targets,
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: depth_stencil(),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };
        let lit = mesh_pipeline("lit_pipeline", &base_layout, "fs_lit");
        let mirror = mesh_pipeline("mirror_pipeline", &mirror_layout, "fs_mirror");

        let lines = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&base_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: depth_stencil(),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self { lit, mirror, lines }
    }
}

/// wgpu-based scene renderer.
///
/// GPU buffers are cached per [`GeometryId`], so one renderer serves one
/// scene. Frame work goes through [`WgpuRenderer::frame`].
pub struct WgpuRenderer {
    layouts: Layouts,
    surface_pipelines: PipelineSet,
    capture_pipelines: PipelineSet,
    uniform_stride: u64,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_capacity: u64,
    axes_buffer: wgpu::Buffer,
    axes_vertex_count: u32,
    meshes: HashMap<GeometryId, GpuMesh>,
    cube_targets: HashMap<EnvMapId, CubeRenderTarget>,
    env_sampler: wgpu::Sampler,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    max_cube_size: u32,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let layouts = Layouts::new(device);
        let limits = device.limits();
        let uniform_stride = align_to(
            size_of::<CameraUniforms>().max(size_of::<ModelUniforms>()) as u64,
            limits.min_uniform_buffer_offset_alignment as u64,
        );

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_buffer"),
            size: uniform_stride * CAMERA_SLOTS,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = Self::uniform_bind_group(
            device,
            "camera_bind_group",
            &layouts.camera,
            &camera_buffer,
            size_of::<CameraUniforms>(),
        );

        let model_capacity = 64;
        let (model_buffer, model_bind_group) =
            Self::create_model_buffer(device, &layouts, uniform_stride, model_capacity);

        let axes = axes_mesh();
        let axes_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("axes_vertex_buffer"),
            contents: bytemuck::cast_slice(&axes),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let env_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("env_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let surface_pipelines =
            PipelineSet::new(device, &layouts, surface_format, wgpu::FrontFace::Ccw);
        // The capture projection flips Y, which flips winding
        let capture_pipelines = PipelineSet::new(device, &layouts, CUBE_FORMAT, wgpu::FrontFace::Cw);

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            layouts,
            surface_pipelines,
            capture_pipelines,
            uniform_stride,
            camera_buffer,
            camera_bind_group,
            model_buffer,
            model_bind_group,
            model_capacity,
            axes_buffer,
            axes_vertex_count: axes.len() as u32,
            meshes: HashMap::new(),
            cube_targets: HashMap::new(),
            env_sampler,
            depth_texture,
            surface_format,
            max_cube_size: limits.max_texture_dimension_2d,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Resolution of the cube target for `env_map`, if one has been captured.
    pub fn cube_target_size(&self, env_map: EnvMapId) -> Option<u32> {
        self.cube_targets.get(&env_map).map(|t| t.resolution())
    }

    /// Borrow the renderer for one frame drawing into `target`.
    pub fn frame<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target: &'a wgpu::TextureView,
    ) -> WgpuFrame<'a> {
        WgpuFrame {
            renderer: self,
            device,
            queue,
            target,
        }
    }

    fn uniform_bind_group(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        size: usize,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size as u64),
                }),
            }],
        })
    }

    fn create_model_buffer(
        device: &wgpu::Device,
        layouts: &Layouts,
        stride: u64,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("model_buffer"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = Self::uniform_bind_group(
            device,
            "model_bind_group",
            &layouts.model,
            &buffer,
            size_of::<ModelUniforms>(),
        );
        (buffer, bind_group)
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    /// Upload geometry the GPU has not seen yet.
    fn upload_meshes(&mut self, device: &wgpu::Device, scene: &Scene, draws: &[DrawItem]) {
        for item in draws {
            if self.meshes.contains_key(&item.geometry) {
                continue;
            }
            let Some(geometry) = scene.geometry(item.geometry) else {
                tracing::warn!("draw references missing geometry {:?}", item.geometry);
                continue;
            };
            let vertices: Vec<Vertex> = geometry
                .positions
                .iter()
                .zip(&geometry.normals)
                .map(|(&position, &normal)| Vertex { position, normal })
                .collect();
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_index_buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            self.meshes.insert(
                item.geometry,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: geometry.indices.len() as u32,
                },
            );
        }
    }

    /// Write model uniforms: draws first, then lines, one slot each.
    fn write_models(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        draws: &[DrawItem],
        lines: &[LineItem],
    ) {
        let mut models: Vec<ModelUniforms> = draws
            .iter()
            .map(|d| {
                let color = match d.material {
                    Material::Standard { base_color } => base_color,
                    Material::Mirror { .. } => [1.0, 1.0, 1.0, 1.0],
                };
                model_uniforms(d.world, color)
            })
            .collect();
        models.extend(lines.iter().map(|l| {
            model_uniforms(l.world * Mat4::from_scale(Vec3::splat(l.size)), [1.0; 4])
        }));

        let needed = models.len() as u64;
        if needed > self.model_capacity {
            let capacity = needed.next_power_of_two();
            let (buffer, bind_group) =
                Self::create_model_buffer(device, &self.layouts, self.uniform_stride, capacity);
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
            self.model_capacity = capacity;
            tracing::debug!(capacity, "model buffer grown");
        }
        if !models.is_empty() {
            queue.write_buffer(
                &self.model_buffer,
                0,
                &pack_slots(&models, self.uniform_stride),
            );
        }
    }

    /// Make sure the cube target for `camera` exists at the camera's resolution.
    fn prepare_cube_target(
        &mut self,
        device: &wgpu::Device,
        camera: &CubeCamera,
    ) -> Result<(), RenderError> {
        let existing = self.cube_targets.get(&camera.target()).map(|t| t.resolution());
        let requested = camera.resolution();
        let stale = cube_target_stale(existing, requested, self.max_cube_size)?;
        if stale {
            tracing::debug!(?existing, requested, "recreating cube target");
            let target =
                CubeRenderTarget::new(device, requested, &self.layouts.env, &self.env_sampler);
            self.cube_targets.insert(camera.target(), target);
        }
        Ok(())
    }

    /// Record draws for one pass.
    fn draw_scene(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipelines: &PipelineSet,
        camera_slot: u32,
        draws: &[DrawItem],
        lines: &[LineItem],
        writing: Option<EnvMapId>,
    ) {
        let stride = self.uniform_stride as u32;
        pass.set_bind_group(0, &self.camera_bind_group, &[camera_slot * stride]);

        for (slot, item) in draws.iter().enumerate() {
            let Some(mesh) = self.meshes.get(&item.geometry) else {
                continue;
            };
            match item.material {
                Material::Standard { .. } => pass.set_pipeline(&pipelines.lit),
                Material::Mirror { env_map } => {
                    if !can_sample(env_map, writing) {
                        continue;
                    }
                    let Some(target) = self.cube_targets.get(&env_map) else {
                        // Not captured yet
                        continue;
                    };
                    pass.set_pipeline(&pipelines.mirror);
                    pass.set_bind_group(2, target.bind_group(), &[]);
                }
            }
            pass.set_bind_group(1, &self.model_bind_group, &[slot as u32 * stride]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        if !lines.is_empty() {
            pass.set_pipeline(&pipelines.lines);
            pass.set_vertex_buffer(0, self.axes_buffer.slice(..));
            for i in 0..lines.len() {
                let slot = (draws.len() + i) as u32;
                pass.set_bind_group(1, &self.model_bind_group, &[slot * stride]);
                pass.draw(0..self.axes_vertex_count, 0..1);
            }
        }
    }
}

/// One frame's view of a [`WgpuRenderer`]: the device, queue and surface
/// texture it draws into.
pub struct WgpuFrame<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    target: &'a wgpu::TextureView,
}

fn clear_color(color: Color) -> wgpu::Color {
    wgpu::Color {
        r: color.r as f64,
        g: color.g as f64,
        b: color.b as f64,
        a: 1.0,
    }
}

impl SceneRenderer for WgpuFrame<'_> {
    type Error = RenderError;

    fn capture_cube(&mut self, scene: &Scene, camera: &CubeCamera) -> Result<(), RenderError> {
        let renderer = &mut *self.renderer;
        renderer.prepare_cube_target(self.device, camera)?;

        let draws = scene.draw_list();
        let lines = scene.line_list();
        let lighting = scene.lighting();
        renderer.upload_meshes(self.device, scene, &draws);
        renderer.write_models(self.device, self.queue, &draws, &lines);

        let faces: Vec<CameraUniforms> = camera
            .face_view_projections()
            .iter()
            .map(|vp| camera_uniforms(*vp, camera.position, &lighting))
            .collect();
        self.queue.write_buffer(
            &renderer.camera_buffer,
            0,
            &pack_slots(&faces, renderer.uniform_stride),
        );

        let renderer = &*renderer;
        let Some(target) = renderer.cube_targets.get(&camera.target()) else {
            return Ok(());
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("cube_capture_encoder"),
            });
        for face in CUBE_FACES {
            let layer = face.layer() as usize;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube_face_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.face_view(layer),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background())),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: target.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            renderer.draw_scene(
                &mut pass,
                &renderer.capture_pipelines,
                face.layer(),
                &draws,
                &lines,
                Some(camera.target()),
            );
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let renderer = &mut *self.renderer;
        let draws = scene.draw_list();
        let lines = scene.line_list();
        let lighting = scene.lighting();
        renderer.upload_meshes(self.device, scene, &draws);
        renderer.write_models(self.device, self.queue, &draws, &lines);

        let main = camera_uniforms(camera.view_projection(), camera.position, &lighting);
        self.queue.write_buffer(
            &renderer.camera_buffer,
            MAIN_CAMERA_SLOT as u64 * renderer.uniform_stride,
            bytemuck::bytes_of(&main),
        );

        let renderer = &*renderer;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background())),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &renderer.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            renderer.draw_scene(
                &mut pass,
                &renderer.surface_pipelines,
                MAIN_CAMERA_SLOT,
                &draws,
                &lines,
                None,
            );
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
