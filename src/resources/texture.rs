use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// Color data (base color maps): sampled through an `*Srgb` format.
    #[default]
    Srgb,
    /// Non-color data.
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
        }
    }
}

/// Decoded RGBA8 image plus sampling state.
#[derive(Debug, Clone)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, `width * height * 4` bytes.
    pub data: Vec<u8>,
    pub color_space: ColorSpace,
    pub sampler: TextureSampler,
}

impl Texture {
    #[must_use]
    pub fn new_rgba8(name: impl Into<String>, width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            width,
            height,
            data,
            color_space: ColorSpace::Srgb,
            sampler: TextureSampler::default(),
        }
    }

    /// 1x1 texture of a single color, bound when a material has no map.
    #[must_use]
    pub fn solid(name: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self::new_rgba8(name, 1, 1, rgba.to_vec())
    }

    #[must_use]
    pub fn wgpu_format(&self) -> wgpu::TextureFormat {
        match self.color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}
