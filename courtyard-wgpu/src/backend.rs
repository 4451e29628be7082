use courtyard_shared::input::CameraPose;
use courtyard_shared::material::UnlitMaterial;
use courtyard_shared::math::Projection;
use courtyard_shared::uniforms::{DrawUniforms, FrameUniforms, SkyUniforms};
use courtyard_shared::MeshData;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::handle::HandleStore;
use crate::pipeline::{SkyPipeline, UnlitPipeline, DEPTH_FORMAT};
use crate::texture::TextureData;

/// GPU mesh with separate position and UV streams.
pub struct GPUMesh {
    pub position_buffer: wgpu::Buffer,
    pub uv_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// GPU texture with its default view.
pub struct GPUTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// A mesh placed in the world with its material bound.
struct DrawItem {
    mesh: u64,
    bind_group: wgpu::BindGroup,
    transparent: bool,
    center: Vec3,
    // Keeps the uniform buffer alive for the bind group.
    _uniforms: wgpu::Buffer,
}

/// Main renderer state. Owns every wgpu resource.
pub struct RendererState {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub width: u32,
    pub height: u32,
    pub projection: Projection,
    pub clear_color: wgpu::Color,

    depth_view: wgpu::TextureView,

    meshes: HandleStore<GPUMesh>,
    textures: HandleStore<GPUTexture>,

    unlit: UnlitPipeline,
    sky: SkyPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sky_buffer: wgpu::Buffer,
    sky_uniform_bind_group: wgpu::BindGroup,
    sky_texture_bind_group: Option<wgpu::BindGroup>,
    default_sampler: wgpu::Sampler,
    white_texture: u64,
    draws: Vec<DrawItem>,
}

impl RendererState {
    /// Create the renderer for a surface target: a winit window natively,
    /// a canvas element on the web.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        projection: Projection,
    ) -> Result<Self, String> {
        let backends = if cfg!(target_arch = "wasm32") {
            wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL
        } else {
            wgpu::Backends::all()
        };
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| format!("Failed to create surface: {e}"))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or("Failed to find suitable GPU adapter")?;

        // WebGL2 cannot meet the default limits.
        let required_limits = if cfg!(target_arch = "wasm32") {
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
        } else {
            wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Courtyard Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| format!("Failed to create device: {e}"))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or("Surface reports no supported formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, surface_config.width, surface_config.height);

        let unlit = UnlitPipeline::new(&device, surface_format);
        let sky = SkyPipeline::new(&device, surface_format);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &unlit.frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let sky_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sky Uniforms"),
            size: std::mem::size_of::<SkyUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sky_uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sky Uniform Bind Group"),
            layout: &sky.uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: sky_buffer.as_entire_binding(),
            }],
        });

        let default_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Default Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::info!(
            "Renderer initialized: {} ({}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend.to_str(),
            surface_format,
            surface_config.width,
            surface_config.height,
        );

        let mut state = Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            width,
            height,
            projection,
            clear_color: wgpu::Color::BLACK,
            depth_view,
            meshes: HandleStore::new(),
            textures: HandleStore::new(),
            unlit,
            sky,
            frame_buffer,
            frame_bind_group,
            sky_buffer,
            sky_uniform_bind_group,
            sky_texture_bind_group: None,
            default_sampler,
            white_texture: 0,
            draws: Vec::new(),
        };
        state.white_texture = state.upload_texture(&TextureData::white(), false);
        state.projection.set_viewport(width, height);
        Ok(state)
    }

    /// Resize the surface, depth buffer and projection aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.device, &self.surface_config);
            self.depth_view = create_depth_view(&self.device, width, height);
            self.projection.set_viewport(width, height);
        }
    }

    /// Upload mesh data to GPU buffers.
    pub fn upload_mesh(&mut self, mesh: &MeshData) -> u64 {
        let position_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Position Buffer"),
                contents: bytemuck::cast_slice(&mesh.positions),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let uv_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex UV Buffer"),
                contents: bytemuck::cast_slice(&mesh.uvs),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        self.meshes.insert(GPUMesh {
            position_buffer,
            uv_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }

    /// Upload RGBA8 pixels. Color maps go up as sRGB so sampling returns
    /// linear values.
    pub fn upload_texture(&mut self, data: &TextureData, srgb: bool) -> u64 {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Uploaded Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: if srgb {
                wgpu::TextureFormat::Rgba8UnormSrgb
            } else {
                wgpu::TextureFormat::Rgba8Unorm
            },
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.textures.insert(GPUTexture {
            texture,
            view,
            width: data.width,
            height: data.height,
        })
    }

    /// Place an uploaded mesh in the world. `texture` is ignored unless the
    /// material has a map. Returns false when a handle is unknown.
    pub fn add_draw(
        &mut self,
        mesh: u64,
        transform: Mat4,
        material: &UnlitMaterial,
        texture: Option<u64>,
    ) -> bool {
        let Some(gpu_mesh) = self.meshes.get(mesh) else {
            log::warn!("add_draw: unknown mesh handle {mesh}");
            return false;
        };
        if gpu_mesh.index_count == 0 {
            return false;
        }

        let texture_handle = match (material.map, texture) {
            (Some(_), Some(handle)) => handle,
            _ => self.white_texture,
        };
        let Some(gpu_texture) = self.textures.get(texture_handle) else {
            log::warn!("add_draw: unknown texture handle {texture_handle}");
            return false;
        };

        // A map index without an uploaded texture samples white.
        let mut material = *material;
        if texture_handle == self.white_texture {
            material.map = None;
        }

        let uniforms = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Draw Uniforms"),
                contents: bytemuck::bytes_of(&DrawUniforms::new(transform, &material)),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout: &self.unlit.draw_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&gpu_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.default_sampler),
                },
            ],
        });

        self.draws.push(DrawItem {
            mesh,
            bind_group,
            transparent: material.transparent,
            center: transform.transform_point3(Vec3::ZERO),
            _uniforms: uniforms,
        });
        true
    }

    /// Install the equirectangular sky panorama (sRGB color data).
    pub fn set_sky(&mut self, data: &TextureData) {
        let handle = self.upload_texture(data, true);
        let Some(texture) = self.textures.get(handle) else {
            return;
        };

        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sky Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        self.sky_texture_bind_group = Some(self.device.create_bind_group(
            &wgpu::BindGroupDescriptor {
                label: Some("Sky Texture Bind Group"),
                layout: &self.sky.texture_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            },
        ));
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Render one frame from `pose`.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(&mut self, pose: &CameraPose) -> Result<(), String> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(e) => return Err(format!("Surface texture error: {e}")),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = FrameUniforms::new(self.projection.view_projection(pose));
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
        let sky = SkyUniforms::new(self.projection.inverse_sky_view_projection(pose));
        self.queue
            .write_buffer(&self.sky_buffer, 0, bytemuck::bytes_of(&sky));

        let order = draw_order(&self.draws, pose.position);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
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
                ..Default::default()
            });

            if let Some(sky_textures) = &self.sky_texture_bind_group {
                pass.set_pipeline(&self.sky.pipeline);
                pass.set_bind_group(0, &self.sky_uniform_bind_group, &[]);
                pass.set_bind_group(1, sky_textures, &[]);
                pass.draw(0..3, 0..1);
            }

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            let mut blending = None;
            for index in order {
                let item = &self.draws[index];
                let Some(mesh) = self.meshes.get(item.mesh) else {
                    continue;
                };
                if blending != Some(item.transparent) {
                    pass.set_pipeline(if item.transparent {
                        &self.unlit.blended
                    } else {
                        &self.unlit.opaque
                    });
                    blending = Some(item.transparent);
                }
                pass.set_bind_group(1, &item.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.position_buffer.slice(..));
                pass.set_vertex_buffer(1, mesh.uv_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
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
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Opaque draws first in insertion order, then transparent ones back to
/// front from `eye`.
fn draw_order(draws: &[DrawItem], eye: Vec3) -> Vec<usize> {
    sort_for_blending(draws.iter().map(|d| (d.transparent, d.center)), eye)
}

fn sort_for_blending(items: impl Iterator<Item = (bool, Vec3)>, eye: Vec3) -> Vec<usize> {
    let items: Vec<(bool, Vec3)> = items.collect();
    let mut opaque: Vec<usize> = Vec::new();
    let mut blended: Vec<(usize, f32)> = Vec::new();
    for (i, (transparent, center)) in items.iter().enumerate() {
        if *transparent {
            blended.push((i, center.distance_squared(eye)));
        } else {
            opaque.push(i);
        }
    }
    blended.sort_by(|a, b| b.1.total_cmp(&a.1));
    opaque.extend(blended.into_iter().map(|(i, _)| i));
    opaque
}
