//! Rendering Module
//!
//! A small forward renderer built directly on wgpu:
//!
//! 1. **Prepare**: upload new meshes and textures, CPU-skin skinned meshes,
//!    write per-object and global uniforms
//! 2. **Shadow pass**: depth-only render of shadow casters from the spot light
//! 3. **Forward pass**: shaded draw of every visible mesh into the (MSAA) surface
//!
//! The render loop talks to it through [`FrameRenderer`], so the loop can be
//! driven without a GPU.

pub mod context;
pub mod pipeline;
pub mod resources;
pub mod settings;
pub mod skinning;
pub mod uniforms;
pub mod vertex;

use std::sync::Arc;

use glam::Mat4;
use rustc_hash::FxHashMap;
use winit::window::Window;

use crate::errors::{Result, StageError};
use crate::renderer::context::WgpuContext;
use crate::renderer::pipeline::{ForwardPipelines, ShadowMap, ShadowPipeline};
use crate::renderer::resources::{GpuMesh, ResourceManager};
use crate::renderer::uniforms::{GlobalUniforms, ObjectUniforms, ShadowUniforms};
use crate::resources::material::Side;
use crate::scene::{NodeHandle, Scene};

pub use settings::{RendererSettings, ShadowMapSettings, ShadowMapType};

/// Draws one frame of `scene` as seen from the camera node `camera`.
pub trait FrameRenderer {
    fn render(&mut self, scene: &Scene, camera: NodeHandle) -> Result<()>;
}

/// wgpu renderer.
///
/// Created with its settings up front; GPU resources are allocated by
/// [`init`](Self::init) once a window exists. Rendering before `init` is a
/// no-op.
pub struct Renderer {
    settings: RendererSettings,
    state: Option<GpuState>,
}

struct GpuState {
    wgpu_ctx: WgpuContext,
    resources: ResourceManager,
    forward: ForwardPipelines,
    shadow: ShadowPipeline,
    shadow_map: ShadowMap,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    meshes: FxHashMap<NodeHandle, Option<GpuMesh>>,
    draw_list: Vec<DrawItem>,
}

struct DrawItem {
    node: NodeHandle,
    cast_shadow: bool,
    double_sided: bool,
}

impl Renderer {
    #[must_use]
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings, state: None }
    }

    /// Creates the device, the surface for `window` and every pipeline.
    pub async fn init(&mut self, window: Arc<Window>) -> Result<()> {
        if self.state.is_some() {
            return Ok(());
        }

        let wgpu_ctx = WgpuContext::new(window, &self.settings).await?;
        let device = &wgpu_ctx.device;

        let resources = ResourceManager::new(device);
        let forward = ForwardPipelines::new(
            device,
            &resources.object_layout,
            wgpu_ctx.color_format(),
            wgpu_ctx.depth_format,
            wgpu_ctx.sample_count,
        );
        let shadow = ShadowPipeline::new(device, &resources.object_layout);
        let shadow_map = ShadowMap::new(device, self.settings.shadow_map.map_size);

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Global Uniforms"),
            size: std::mem::size_of::<GlobalUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global BindGroup"),
            layout: &forward.global_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: global_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
        });

        log::info!(
            "Renderer initialized: {}x{}, {:?}, {}x MSAA, shadow map {}",
            wgpu_ctx.config.width,
            wgpu_ctx.config.height,
            wgpu_ctx.color_format(),
            wgpu_ctx.sample_count,
            shadow_map.size
        );

        self.state = Some(GpuState {
            wgpu_ctx,
            resources,
            forward,
            shadow,
            shadow_map,
            global_buffer,
            global_bind_group,
            meshes: FxHashMap::default(),
            draw_list: Vec::new(),
        });
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Resizes the drawing buffer. The camera projection is not touched.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.settings.width = width;
        self.settings.height = height;
        if let Some(state) = &mut self.state {
            state.wgpu_ctx.resize(width, height);
        }
    }
}

impl FrameRenderer for Renderer {
    fn render(&mut self, scene: &Scene, camera: NodeHandle) -> Result<()> {
        let Some(state) = &mut self.state else {
            return Ok(());
        };
        let Some(camera) = scene.cameras.get(camera) else {
            log::warn!("Render skipped: camera node has no camera component");
            return Ok(());
        };

        let (globals, shadow_matrix) = GlobalUniforms::from_scene(scene, camera, &self.settings.shadow_map);
        state.prepare(scene, &globals, shadow_matrix);

        let output = match state.wgpu_ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                let (width, height) = state.wgpu_ctx.size();
                state.wgpu_ctx.resize(width, height);
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Timeout => return Err(StageError::Surface("surface texture acquisition timed out".to_string())),
            wgpu::CurrentSurfaceTexture::Occluded => return Err(StageError::Surface("surface is occluded".to_string())),
            wgpu::CurrentSurfaceTexture::Validation => return Err(StageError::Surface("surface texture acquisition raised a validation error".to_string())),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = state
            .wgpu_ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        if shadow_matrix.is_some() {
            state.encode_shadow_pass(&mut encoder);
        }
        state.encode_forward_pass(&mut encoder, &view);

        state.wgpu_ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl GpuState {
    fn prepare(&mut self, scene: &Scene, globals: &GlobalUniforms, shadow_matrix: Option<Mat4>) {
        let device = &self.wgpu_ctx.device;
        let queue = &self.wgpu_ctx.queue;

        queue.write_buffer(&self.global_buffer, 0, bytemuck::bytes_of(globals));
        if let Some(matrix) = shadow_matrix {
            let shadow = ShadowUniforms {
                light_view_projection: matrix.to_cols_array_2d(),
            };
            queue.write_buffer(&self.shadow.uniform_buffer, 0, bytemuck::bytes_of(&shadow));
        }

        // Meshes removed from the scene release their buffers
        self.meshes.retain(|handle, _| scene.meshes.contains_key(*handle));
        self.draw_list.clear();

        for (handle, mesh) in &scene.meshes {
            if !mesh.visible || !scene.is_visible(handle) {
                continue;
            }
            let Some(node) = scene.get_node(handle) else {
                continue;
            };

            let cache = self.meshes.entry(handle).or_default();
            let gpu = self.resources.prepare_mesh(device, queue, cache, mesh);

            let skeleton = scene
                .skins
                .get(handle)
                .and_then(|skin| scene.skeletons.get(skin.skeleton))
                .filter(|_| mesh.geometry.is_skinned());

            let model = if let Some(skeleton) = skeleton {
                skinning::skin_vertices(&mesh.geometry, skeleton.joint_matrices(), &mut gpu.skinned);
                queue.write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(&gpu.skinned));
                Mat4::IDENTITY
            } else {
                node.transform.world_matrix_as_mat4()
            };

            let uniforms = ObjectUniforms::new(model, mesh);
            queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

            self.draw_list.push(DrawItem {
                node: handle,
                cast_shadow: mesh.cast_shadow,
                double_sided: mesh.material.side == Side::Double,
            });
        }
    }

    fn encode_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_map.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.shadow.pipeline);
        pass.set_bind_group(0, &self.shadow.bind_group, &[]);

        for item in self.draw_list.iter().filter(|item| item.cast_shadow) {
            if let Some(Some(gpu)) = self.meshes.get(&item.node) {
                draw_mesh(&mut pass, gpu);
            }
        }
    }

    fn encode_forward_pass(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let ctx = &self.wgpu_ctx;
        let (view, resolve_target, store) = match &ctx.msaa_texture_view {
            Some(msaa) => (msaa, Some(surface_view), wgpu::StoreOp::Discard),
            None => (surface_view, None, wgpu::StoreOp::Store),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Forward Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_color),
                    store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_texture_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_bind_group(0, &self.global_bind_group, &[]);

        for item in &self.draw_list {
            let Some(Some(gpu)) = self.meshes.get(&item.node) else {
                continue;
            };
            let pipeline = if item.double_sided {
                &self.forward.double_sided
            } else {
                &self.forward.single_sided
            };
            pass.set_pipeline(pipeline);
            draw_mesh(&mut pass, gpu);
        }
    }
}

fn draw_mesh(pass: &mut wgpu::RenderPass<'_>, gpu: &GpuMesh) {
    pass.set_bind_group(1, &gpu.bind_group, &[]);
    pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
    match &gpu.index_buffer {
        Some(index_buffer) => {
            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..gpu.draw_count, 0, 0..1);
        }
        None => pass.draw(0..gpu.draw_count, 0..1),
    }
}
