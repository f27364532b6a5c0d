use std::sync::Arc;

use glam::{Vec3, Vec4};
use uuid::Uuid;

use crate::resources::texture::Texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Metallic-roughness material, the only kind the stage draws.
#[derive(Debug, Clone)]
pub struct MeshStandardMaterial {
    pub uuid: Uuid,
    pub name: String,
    /// Linear base color, multiplied with `map`.
    pub color: Vec4,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Vec3,
    pub map: Option<Arc<Texture>>,
    pub side: Side,
}

impl MeshStandardMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: "MeshStandardMaterial".to_string(),
            color,
            roughness: 1.0,
            metalness: 0.0,
            emissive: Vec3::ZERO,
            map: None,
            side: Side::Front,
        }
    }

    #[must_use]
    pub fn with_map(mut self, map: Arc<Texture>) -> Self {
        self.map = Some(map);
        self
    }

    #[must_use]
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    #[must_use]
    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }
}

impl Default for MeshStandardMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}
