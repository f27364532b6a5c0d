//! Renderer Settings
//!
//! [`RendererSettings`] is consumed once by [`Renderer::init`](crate::renderer::Renderer::init)
//! to set up the GPU context and allocate the frame targets.
//!
//! ```rust,ignore
//! use avatar_stage::renderer::settings::{RendererSettings, ShadowMapType};
//!
//! // Sized to a 800x600 container on a 2x display
//! let settings = RendererSettings::for_container(800, 600, 2.0);
//! assert_eq!(settings.width, 1600);
//! assert_eq!(settings.shadow_map.kind, ShadowMapType::PcfSoft);
//! ```

// ---------------------------------------------------------------------------
// Shadow maps
// ---------------------------------------------------------------------------

/// Shadow map filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowMapType {
    /// Single comparison tap; hard edges.
    Basic,
    /// 3x3 percentage-closer filtering.
    Pcf,
    /// 5x5 percentage-closer filtering with a wider kernel; soft edges.
    #[default]
    PcfSoft,
}

impl ShadowMapType {
    /// Kernel radius in texels, read by the shader.
    #[inline]
    #[must_use]
    pub fn kernel_radius(self) -> u32 {
        match self {
            Self::Basic => 0,
            Self::Pcf => 1,
            Self::PcfSoft => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowMapSettings {
    pub enabled: bool,
    pub kind: ShadowMapType,
    /// Edge length of the square shadow map in texels.
    pub map_size: u32,
}

impl Default for ShadowMapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: ShadowMapType::PcfSoft,
            map_size: 2048,
        }
    }
}

// ---------------------------------------------------------------------------
// RendererSettings
// ---------------------------------------------------------------------------

/// Global configuration for renderer initialization.
///
/// | Field              | Description                              | Default            |
/// |--------------------|------------------------------------------|--------------------|
/// | `width`/`height`   | Drawing buffer size in physical pixels   | 1280x720           |
/// | `pixel_ratio`      | Physical pixels per container pixel      | 1.0                |
/// | `antialias`        | 4x MSAA                                  | `true`             |
/// | `alpha`            | Transparent clear                        | `true`             |
/// | `output_srgb`      | Prefer an sRGB surface format            | `true`             |
/// | `shadow_map`       | Shadow map configuration                 | PCF soft, 2048     |
/// | `vsync`            | Vertical sync enabled                    | `true`             |
/// | `power_preference` | GPU adapter selection strategy           | `HighPerformance`  |
/// | `depth_format`     | Depth buffer texture format              | `Depth32Float`     |
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,

    /// Enable multi-sample anti-aliasing.
    pub antialias: bool,

    /// Clear to transparent black so the host background shows through.
    pub alpha: bool,

    /// Pick an `*Srgb` surface format so lighting is written in linear space
    /// and encoded on store.
    pub output_srgb: bool,

    pub shadow_map: ShadowMapSettings,

    /// When `true`, the frame rate is capped to the display refresh rate.
    pub vsync: bool,

    pub power_preference: wgpu::PowerPreference,

    pub depth_format: wgpu::TextureFormat,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            pixel_ratio: 1.0,
            antialias: true,
            alpha: true,
            output_srgb: true,
            shadow_map: ShadowMapSettings::default(),
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}

impl RendererSettings {
    /// Settings whose drawing buffer covers a container of `width x height`
    /// logical pixels on a display with the given pixel density.
    #[must_use]
    pub fn for_container(width: u32, height: u32, pixel_ratio: f32) -> Self {
        let ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        Self {
            width: ((width as f32 * ratio).round() as u32).max(1),
            height: ((height as f32 * ratio).round() as u32).max(1),
            pixel_ratio: ratio,
            ..Self::default()
        }
    }

    /// Effective MSAA sample count.
    #[inline]
    #[must_use]
    pub fn msaa_samples(&self) -> u32 {
        if self.antialias { 4 } else { 1 }
    }

    #[must_use]
    pub fn clear_color(&self) -> wgpu::Color {
        if self.alpha {
            wgpu::Color::TRANSPARENT
        } else {
            wgpu::Color::BLACK
        }
    }
}
