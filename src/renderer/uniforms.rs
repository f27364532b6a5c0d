//! Uniform block layouts and their CPU-side packing.
//!
//! Every struct here mirrors a WGSL struct in `shaders/stage.wgsl` or
//! `shaders/shadow.wgsl` field by field; all members are `vec4`/`mat4` sized
//! so no manual padding is needed.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::renderer::settings::ShadowMapSettings;
use crate::resources::mesh::Mesh;
use crate::scene::{Camera, LightKind, Scene};

/// Lights beyond this count are ignored by the forward shader.
pub const MAX_LIGHTS: usize = 4;

pub const LIGHT_TYPE_NONE: f32 = 0.0;
pub const LIGHT_TYPE_DIRECTIONAL: f32 = 1.0;
pub const LIGHT_TYPE_SPOT: f32 = 2.0;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    /// xyz: world position, w: light type
    pub position: [f32; 4],
    /// xyz: direction the light travels, w: cutoff distance (0 = none)
    pub direction: [f32; 4],
    /// rgb: color * intensity, w: decay exponent
    pub color: [f32; 4],
    /// x: cos(outer cone), y: cos(inner cone), z: casts the shadow map
    pub cone: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub shadow_view_projection: [[f32; 4]; 4],
    /// xyz: camera world position
    pub camera_position: [f32; 4],
    /// rgb: summed ambient irradiance
    pub ambient: [f32; 4],
    /// x: depth bias, y: normal bias, z: texel size, w: PCF kernel radius (-1 = no shadows)
    pub shadow_params: [f32; 4],
    /// x: light count
    pub light_count: [f32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// rgb: emissive
    pub emissive: [f32; 4],
    /// x: roughness, y: metalness, z: receives shadows, w: has base color map
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShadowUniforms {
    pub light_view_projection: [[f32; 4]; 4],
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

impl GlobalUniforms {
    /// Packs the camera and every light of `scene`.
    ///
    /// The first shadow-casting spot light owns the shadow map; its
    /// view-projection is also returned for the shadow pass.
    #[must_use]
    pub fn from_scene(scene: &Scene, camera: &Camera, shadow_map: &ShadowMapSettings) -> (Self, Option<Mat4>) {
        let mut uniforms = Self::zeroed();
        uniforms.view_projection = camera.view_projection_matrix().to_cols_array_2d();
        uniforms.camera_position = camera.world_position().extend(1.0).to_array();

        let mut ambient = Vec3::ZERO;
        let mut shadow_matrix = None;
        let mut shadow_bias = (0.0, 0.0);
        let mut count = 0;

        for (light, position) in scene.iter_lights() {
            let radiance = light.color * light.intensity;

            let packed = match &light.kind {
                LightKind::Ambient => {
                    ambient += radiance;
                    continue;
                }
                LightKind::Directional(dir) => LightUniform {
                    position: position.extend(LIGHT_TYPE_DIRECTIONAL).to_array(),
                    direction: (dir.target - position).normalize_or_zero().extend(0.0).to_array(),
                    color: radiance.extend(0.0).to_array(),
                    cone: [0.0; 4],
                },
                LightKind::Spot(spot) => {
                    let mut casts = false;
                    if shadow_map.enabled && light.cast_shadows && shadow_matrix.is_none() {
                        shadow_matrix = light.shadow_view_projection(position);
                        casts = shadow_matrix.is_some();
                        shadow_bias = (light.shadow.bias, light.shadow.normal_bias);
                    }
                    LightUniform {
                        position: position.extend(LIGHT_TYPE_SPOT).to_array(),
                        direction: (spot.target - position)
                            .normalize_or_zero()
                            .extend(spot.distance)
                            .to_array(),
                        color: radiance.extend(spot.decay).to_array(),
                        cone: [spot.outer_cone().cos(), spot.inner_cone().cos(), flag(casts), 0.0],
                    }
                }
            };

            if count == MAX_LIGHTS {
                log::warn!("More than {MAX_LIGHTS} direct lights in the scene; extra lights are ignored");
                break;
            }
            uniforms.lights[count] = packed;
            count += 1;
        }

        uniforms.ambient = ambient.extend(1.0).to_array();
        uniforms.light_count = [count as f32, 0.0, 0.0, 0.0];

        if let Some(matrix) = shadow_matrix {
            uniforms.shadow_view_projection = matrix.to_cols_array_2d();
            uniforms.shadow_params = [
                shadow_bias.0,
                shadow_bias.1,
                1.0 / shadow_map.map_size.max(1) as f32,
                shadow_map.kind.kernel_radius() as f32,
            ];
        } else {
            uniforms.shadow_params = [0.0, 0.0, 0.0, -1.0];
        }

        (uniforms, shadow_matrix)
    }

    #[must_use]
    pub fn light_count(&self) -> usize {
        self.light_count[0] as usize
    }
}

impl ObjectUniforms {
    /// `model` is identity for CPU-skinned meshes, whose vertices are
    /// already in world space.
    #[must_use]
    pub fn new(model: Mat4, mesh: &Mesh) -> Self {
        let material = &mesh.material;
        let normal_matrix = model.inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            base_color: material.color.to_array(),
            emissive: material.emissive.extend(0.0).to_array(),
            params: Vec4::new(
                material.roughness,
                material.metalness,
                flag(mesh.receive_shadow),
                flag(material.map.is_some()),
            )
            .to_array(),
        }
    }
}
