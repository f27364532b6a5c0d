//! GPU-side mirrors of scene resources.
//!
//! Textures and samplers are uploaded once and shared by uuid / sampler state;
//! every mesh node gets its own vertex, index and uniform buffers.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use uuid::Uuid;
use wgpu::util::DeviceExt;

use crate::renderer::uniforms::ObjectUniforms;
use crate::renderer::vertex::Vertex;
use crate::resources::geometry::Geometry;
use crate::resources::mesh::Mesh;
use crate::resources::texture::{Texture, TextureSampler};

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Buffers and bind group of one mesh node.
pub struct GpuMesh {
    /// Geometry the buffers were built from; a different one forces a rebuild.
    pub geometry_id: Uuid,
    pub material_id: Uuid,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub draw_count: u32,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    /// Scratch space for CPU skinning, reused every frame.
    pub skinned: Vec<Vertex>,
}

pub struct ResourceManager {
    pub object_layout: wgpu::BindGroupLayout,
    textures: FxHashMap<Uuid, GpuTexture>,
    samplers: FxHashMap<TextureSampler, wgpu::Sampler>,
    white: Arc<Texture>,
}

impl ResourceManager {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object BindGroup Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
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

        Self {
            object_layout,
            textures: FxHashMap::default(),
            samplers: FxHashMap::default(),
            white: Arc::new(Texture::solid("White", [255, 255, 255, 255])),
        }
    }

    fn texture(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, texture: &Texture) -> &GpuTexture {
        self.textures.entry(texture.uuid).or_insert_with(|| {
            let size = wgpu::Extent3d {
                width: texture.width.max(1),
                height: texture.height.max(1),
                depth_or_array_layers: 1,
            };
            let gpu = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&texture.name),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: texture.wgpu_format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &gpu,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &texture.data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * size.width),
                    rows_per_image: Some(size.height),
                },
                size,
            );
            let view = gpu.create_view(&wgpu::TextureViewDescriptor::default());
            GpuTexture { texture: gpu, view }
        })
    }

    fn sampler(&mut self, device: &wgpu::Device, state: TextureSampler) -> &wgpu::Sampler {
        self.samplers.entry(state).or_insert_with(|| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Material Sampler"),
                address_mode_u: state.address_mode_u,
                address_mode_v: state.address_mode_v,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: state.mag_filter,
                min_filter: state.min_filter,
                ..Default::default()
            })
        })
    }

    /// Returns the GPU mesh for `mesh`, (re)building it when the geometry or
    /// material changed.
    pub fn prepare_mesh<'a>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cache: &'a mut Option<GpuMesh>,
        mesh: &Mesh,
    ) -> &'a mut GpuMesh {
        let stale = cache
            .as_ref()
            .is_none_or(|gpu| gpu.geometry_id != mesh.geometry.uuid || gpu.material_id != mesh.material.uuid);
        if stale {
            *cache = None;
        }
        cache.get_or_insert_with(|| self.create_mesh(device, queue, mesh))
    }

    fn create_mesh(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, mesh: &Mesh) -> GpuMesh {
        let geometry: &Geometry = &mesh.geometry;

        let vertices = Vertex::from_geometry(geometry);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&mesh.name),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = (!geometry.indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&mesh.name),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniforms"),
            size: std::mem::size_of::<ObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let map = mesh.material.map.clone().unwrap_or_else(|| Arc::clone(&self.white));
        let sampler = self.sampler(device, map.sampler).clone();
        let view = self.texture(device, queue, &map).view.clone();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object BindGroup"),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        GpuMesh {
            geometry_id: geometry.uuid,
            material_id: mesh.material.uuid,
            vertex_buffer,
            index_buffer,
            draw_count: geometry.draw_count(),
            uniform_buffer,
            bind_group,
            skinned: Vec::new(),
        }
    }
}
