use fnv::FnvHashMap;
use glam::{EulerRot, Mat4, Vec3};
use web_sys as web;
use wgpu;

use crate::camera;
use crate::constants::{PARTICLE_BASE_SIZE, PHOTO_BASE_WIDTH};
use crate::core::{FormationEngine, ParticleShape, PhotoId, PALETTE};

const SCENE_WGSL: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
    group: mat4x4<f32>,
    cam_right: vec4<f32>,
    cam_up: vec4<f32>,
};
@group(0) @binding(0) var<uniform> scene: Scene;

// Billboarded ornament particles, one quad per instance. shape flag in
// color_shape.w: 0 = sphere (disc mask), 1 = cube (full quad).
struct ParticleIn {
    @location(0) pos_scale: vec4<f32>,
    @location(1) color_shape: vec4<f32>,
};

struct ParticleOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec3<f32>,
    @location(2) shape: f32,
};

@vertex
fn vs_particle(@builtin(vertex_index) vi: u32, inst: ParticleIn) -> ParticleOut {
    var corners = array<vec2<f32>, 4>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(-1.0, 1.0),
        vec2<f32>(1.0, 1.0),
    );
    let c = corners[vi];
    let center = (scene.group * vec4<f32>(inst.pos_scale.xyz, 1.0)).xyz;
    let half = inst.pos_scale.w;
    let world = center + scene.cam_right.xyz * c.x * half + scene.cam_up.xyz * c.y * half;
    var out: ParticleOut;
    out.pos = scene.view_proj * vec4<f32>(world, 1.0);
    out.uv = c;
    out.color = inst.color_shape.rgb;
    out.shape = inst.color_shape.w;
    return out;
}

@fragment
fn fs_particle(in: ParticleOut) -> @location(0) vec4<f32> {
    let r2 = dot(in.uv, in.uv);
    if in.shape < 0.5 && r2 > 1.0 {
        discard;
    }
    // Fake a lit volume with a radial falloff.
    let shade = 1.0 - 0.35 * r2;
    return vec4<f32>(in.color * shade, 0.92);
}

// Textured photo quads, one draw per photo with its own model matrix.
struct PhotoModel {
    model: mat4x4<f32>,
};
@group(1) @binding(0) var<uniform> photo: PhotoModel;
@group(1) @binding(1) var photo_tex: texture_2d<f32>;
@group(1) @binding(2) var photo_samp: sampler;

struct PhotoOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_photo(@builtin(vertex_index) vi: u32) -> PhotoOut {
    var corners = array<vec2<f32>, 4>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, -0.5),
        vec2<f32>(-0.5, 0.5),
        vec2<f32>(0.5, 0.5),
    );
    let c = corners[vi];
    var out: PhotoOut;
    out.pos = scene.view_proj * photo.model * vec4<f32>(c, 0.0, 1.0);
    out.uv = vec2<f32>(c.x + 0.5, 0.5 - c.y);
    return out;
}

@fragment
fn fs_photo(in: PhotoOut) -> @location(0) vec4<f32> {
    return textureSample(photo_tex, photo_samp, in.uv);
}
"#;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    group: [[f32; 4]; 4],
    cam_right: [f32; 4],
    cam_up: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ParticleInstance {
    pos_scale: [f32; 4],
    color_shape: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PhotoUniforms {
    model: [[f32; 4]; 4],
}

/// GPU-side resources for one uploaded photo.
struct PhotoTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    model_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    scene_uniform_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,

    particle_pipeline: wgpu::RenderPipeline,
    particle_instance_buffer: wgpu::Buffer,
    particle_capacity: usize,

    photo_pipeline: wgpu::RenderPipeline,
    photo_bgl: wgpu::BindGroupLayout,
    photo_sampler: wgpu::Sampler,
    photo_textures: FnvHashMap<PhotoId, PhotoTexture>,

    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl<'a> GpuState<'a> {
    pub async fn new(
        canvas: &'a web::HtmlCanvasElement,
        particle_capacity: usize,
    ) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits so older WebGPU impls accept the request
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });

        let scene_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let scene_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: &scene_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_uniform_buffer.as_entire_binding(),
            }],
        });

        let photo_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("photo_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
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
        });
        let photo_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("photo_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let particle_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particle_pl"),
            bind_group_layouts: &[&scene_bgl],
            push_constant_ranges: &[],
        });
        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particle_pipeline"),
            layout: Some(&particle_pl),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_particle"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<ParticleInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                // Blended, so particles test against photos but not each other
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_particle"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let photo_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("photo_pl"),
            bind_group_layouts: &[&scene_bgl, &photo_bgl],
            push_constant_ranges: &[],
        });
        let photo_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("photo_pipeline"),
            layout: Some(&photo_pl),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_photo"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                // Photos stay visible from behind while the group spins
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_photo"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let particle_instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_instances"),
            size: (particle_capacity.max(1) * std::mem::size_of::<ParticleInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_view = create_depth_view(&device, width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            scene_uniform_buffer,
            scene_bind_group,
            particle_pipeline,
            particle_instance_buffer,
            particle_capacity: particle_capacity.max(1),
            photo_pipeline,
            photo_bgl,
            photo_sampler,
            photo_textures: FnvHashMap::default(),
            depth_view,
            width,
            height,
            clear_color: wgpu::Color {
                r: 0.015,
                g: 0.015,
                b: 0.035,
                a: 1.0,
            },
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, width, height);
        }
    }

    /// Copy a decoded `ImageBitmap` into a fresh srgb texture and build the
    /// photo's bind group. Replaces any previous texture for the id.
    pub fn upload_photo(&mut self, id: PhotoId, bitmap: &web::ImageBitmap) {
        let width = bitmap.width().max(1);
        let height = bitmap.height().max(1);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("photo_tex"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            // copyExternalImageToTexture needs COPY_DST and RENDER_ATTACHMENT
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        self.queue.copy_external_image_to_texture(
            &wgpu::CopyExternalImageSourceInfo {
                source: wgpu::ExternalImageSource::ImageBitmap(bitmap.clone()),
                origin: wgpu::Origin2d::ZERO,
                flip_y: false,
            },
            wgpu::CopyExternalImageDestInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
                color_space: wgpu::PredefinedColorSpace::Srgb,
                premultiplied_alpha: false,
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let model_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("photo_model"),
            size: std::mem::size_of::<PhotoUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("photo_bg"),
            layout: &self.photo_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.photo_sampler),
                },
            ],
        });
        self.photo_textures.insert(
            id,
            PhotoTexture {
                texture,
                model_buffer,
                bind_group,
            },
        );
    }

    /// Draw one frame of the formation. Transforms are read straight from
    /// the engine; this function writes GPU buffers but never mutates scene
    /// state.
    pub fn render(&mut self, engine: &FormationEngine) -> Result<(), wgpu::SurfaceError> {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        let view_proj = camera::view_proj(aspect);
        let group = Mat4::from_mat3(engine.group_matrix());
        // Fixed camera, so the billboard basis comes straight from the view
        // matrix rows.
        let view = Mat4::look_at_rh(camera::camera_eye(), Vec3::ZERO, Vec3::Y);
        let cam_right = Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x);
        let cam_up = Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y);
        let uniforms = SceneUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            group: group.to_cols_array_2d(),
            cam_right: cam_right.extend(0.0).to_array(),
            cam_up: cam_up.extend(0.0).to_array(),
        };
        self.queue
            .write_buffer(&self.scene_uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let instance_count = engine.particles.len().min(self.particle_capacity);
        let instances: Vec<ParticleInstance> = engine.particles[..instance_count]
            .iter()
            .map(|p| {
                let color = PALETTE[p.palette_index % PALETTE.len()];
                let shape = match p.shape {
                    ParticleShape::Sphere => 0.0,
                    ParticleShape::Cube => 1.0,
                };
                ParticleInstance {
                    pos_scale: [
                        p.transform.position.x,
                        p.transform.position.y,
                        p.transform.position.z,
                        PARTICLE_BASE_SIZE * p.transform.scale,
                    ],
                    color_shape: [color[0], color[1], color[2], shape],
                }
            })
            .collect();
        self.queue.write_buffer(
            &self.particle_instance_buffer,
            0,
            bytemuck::cast_slice(&instances),
        );

        for (i, photo) in engine.photos.iter().enumerate() {
            let Some(tex) = self.photo_textures.get(&(i as PhotoId)) else {
                continue;
            };
            let t = &photo.transform;
            let model = group
                * Mat4::from_translation(t.position)
                * Mat4::from_euler(EulerRot::XYZ, t.rotation.x, t.rotation.y, t.rotation.z)
                * Mat4::from_scale(Vec3::new(
                    PHOTO_BASE_WIDTH * photo.aspect * t.scale,
                    PHOTO_BASE_WIDTH * t.scale,
                    1.0,
                ));
            let u = PhotoUniforms {
                model: model.to_cols_array_2d(),
            };
            self.queue
                .write_buffer(&tex.model_buffer, 0, bytemuck::bytes_of(&u));
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(&self.photo_pipeline);
            rpass.set_bind_group(0, &self.scene_bind_group, &[]);
            for i in 0..engine.photos.len() {
                if let Some(tex) = self.photo_textures.get(&(i as PhotoId)) {
                    rpass.set_bind_group(1, &tex.bind_group, &[]);
                    rpass.draw(0..4, 0..1);
                }
            }

            rpass.set_pipeline(&self.particle_pipeline);
            rpass.set_bind_group(0, &self.scene_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.particle_instance_buffer.slice(..));
            rpass.draw(0..4, 0..instance_count as u32);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_tex"),
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
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}
