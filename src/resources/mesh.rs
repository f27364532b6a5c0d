use std::sync::Arc;

use crate::resources::geometry::Geometry;
use crate::resources::material::MeshStandardMaterial;

/// Renderable component attached to a scene node.
///
/// Geometry and material are shared; the shadow flags and visibility are per
/// instance.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,

    pub geometry: Arc<Geometry>,
    pub material: Arc<MeshStandardMaterial>,

    pub visible: bool,
    /// Drawn into shadow maps.
    pub cast_shadow: bool,
    /// Darkened by shadow maps.
    pub receive_shadow: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: Arc<Geometry>, material: Arc<MeshStandardMaterial>) -> Self {
        Self {
            name: "Mesh".to_string(),
            geometry,
            material,
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}
