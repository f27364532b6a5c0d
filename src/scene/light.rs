use glam::{Mat4, Vec3};

/// Shadow map parameters of a shadow-casting light.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowConfig {
    pub bias: f32,
    pub normal_bias: f32,
    pub map_size: u32,
    /// Near plane of the light's shadow camera.
    pub near: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: -0.0005,
            normal_bias: 0.02,
            map_size: 2048,
            near: 0.5,
        }
    }
}

/// Light that comes from infinitely far away along `position -> target`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// World-space point the light is aimed at.
    pub target: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    /// Cutoff distance; `0.0` means unlimited.
    pub distance: f32,
    /// Outer cone half-angle in radians.
    pub angle: f32,
    /// Fraction of the cone, from the rim inwards, over which the light fades.
    pub penumbra: f32,
    pub decay: f32,
    pub target: Vec3,
}

impl SpotLight {
    /// Half-angle of the fully lit inner cone.
    #[must_use]
    pub fn inner_cone(&self) -> f32 {
        self.angle * (1.0 - self.penumbra.clamp(0.0, 1.0))
    }

    #[must_use]
    pub fn outer_cone(&self) -> f32 {
        self.angle
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Uniform light with no direction.
    Ambient,
    Directional(DirectionalLight),
    Spot(SpotLight),
}

/// Light component in the scene. Its position is the owning node's world position.
#[derive(Debug, Clone)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,

    pub cast_shadows: bool,
    pub shadow: ShadowConfig,
}

impl Light {
    fn with_kind(color: Vec3, intensity: f32, kind: LightKind) -> Self {
        Self {
            color,
            intensity,
            kind,
            cast_shadows: false,
            shadow: ShadowConfig::default(),
        }
    }

    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self::with_kind(color, intensity, LightKind::Ambient)
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32, target: Vec3) -> Self {
        Self::with_kind(color, intensity, LightKind::Directional(DirectionalLight { target }))
    }

    #[must_use]
    pub fn new_spot(color: Vec3, intensity: f32, distance: f32, angle: f32, penumbra: f32, decay: f32) -> Self {
        Self::with_kind(
            color,
            intensity,
            LightKind::Spot(SpotLight {
                distance,
                angle,
                penumbra,
                decay,
                target: Vec3::ZERO,
            }),
        )
    }

    /// Re-aims a directional or spot light; ambient lights ignore this.
    pub fn set_target(&mut self, target: Vec3) {
        match &mut self.kind {
            LightKind::Directional(d) => d.target = target,
            LightKind::Spot(s) => s.target = target,
            LightKind::Ambient => {}
        }
    }

    /// View-projection matrix of the shadow camera for a light at `position`.
    ///
    /// Only spot lights cast shadows in this renderer; the shadow camera is a
    /// perspective frustum covering the outer cone, reaching the cutoff distance.
    #[must_use]
    pub fn shadow_view_projection(&self, position: Vec3) -> Option<Mat4> {
        let LightKind::Spot(spot) = &self.kind else {
            return None;
        };

        let forward = (spot.target - position).normalize_or_zero();
        if forward == Vec3::ZERO {
            return None;
        }
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };

        let far = if spot.distance > 0.0 { spot.distance } else { 500.0 };
        let fov = (spot.angle * 2.0).min(std::f32::consts::PI - 0.01);
        let view = Mat4::look_at_rh(position, spot.target, up);
        let proj = Mat4::perspective_rh(fov, 1.0, self.shadow.near, far);
        Some(proj * view)
    }
}
