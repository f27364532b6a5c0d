//! GPU device, window surface and the size-dependent frame targets.

use std::sync::Arc;

use winit::window::Window;

use crate::errors::{Result, StageError};
use crate::renderer::settings::RendererSettings;

/// Device, queue and configured surface of the stage window.
///
/// Also owns the per-size frame targets too: the depth buffer and, when MSAA is
/// on, the multisampled color buffer that resolves into the surface. Both
/// are recreated on resize.
pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,

    pub sample_count: u32,
    pub depth_format: wgpu::TextureFormat,
    /// Depth buffer texture view (recreated on resize)
    pub depth_texture_view: wgpu::TextureView,
    /// Multisampled color target, `None` without MSAA
    pub msaa_texture_view: Option<wgpu::TextureView>,
    pub clear_color: wgpu::Color,
}

impl WgpuContext {
    pub async fn new(window: Arc<Window>, settings: &RendererSettings) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| StageError::AdapterRequestFailed(e.to_string()))?;

        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, settings.width, settings.height)
            .ok_or_else(|| StageError::Surface("Surface not supported by adapter".to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        if settings.output_srgb
            && let Some(format) = caps.formats.iter().copied().find(wgpu::TextureFormat::is_srgb)
        {
            config.format = format;
        }
        if settings.alpha
            && let Some(mode) = caps.alpha_modes.iter().copied().find(|m| {
                matches!(
                    m,
                    wgpu::CompositeAlphaMode::PreMultiplied | wgpu::CompositeAlphaMode::PostMultiplied
                )
            })
        {
            config.alpha_mode = mode;
        }
        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        let sample_count = Self::supported_sample_count(&adapter, config.format, settings.msaa_samples());
        let depth_texture_view = Self::create_depth_texture(&device, &config, settings.depth_format, sample_count);
        let msaa_texture_view = Self::create_msaa_texture(&device, &config, sample_count);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            sample_count,
            depth_format: settings.depth_format,
            depth_texture_view,
            msaa_texture_view,
            clear_color: settings.clear_color(),
        })
    }

    fn supported_sample_count(adapter: &wgpu::Adapter, format: wgpu::TextureFormat, requested: u32) -> u32 {
        if requested <= 1 {
            return 1;
        }
        let flags = adapter.get_texture_format_features(format).flags;
        if flags.sample_count_supported(requested) {
            requested
        } else {
            log::warn!("{requested}x MSAA not supported for {format:?}, falling back to 1x");
            1
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture_view =
                Self::create_depth_texture(&self.device, &self.config, self.depth_format, self.sample_count);
            self.msaa_texture_view = Self::create_msaa_texture(&self.device, &self.config, self.sample_count);
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> wgpu::TextureView {
        Self::create_frame_target(device, config, "Depth Texture", format, sample_count)
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        (sample_count > 1)
            .then(|| Self::create_frame_target(device, config, "MSAA Color Texture", config.format, sample_count))
    }

    /// A render attachment matching the surface size.
    fn create_frame_target(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: config.width,
                    height: config.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Returns the surface color format.
    #[inline]
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current surface dimensions.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
