use glam::{Vec2, Vec3};
use winit::event::MouseButton;

use crate::app::input::Input;
use crate::config::ControlsConfig;
use crate::scene::transform::Transform;

/// Orbit camera controller in spherical coordinates around `target`.
///
/// `phi` is the polar angle from +Y, `theta` the azimuth around Y measured
/// from +Z. Both are clamped on every update, so a controller whose min and
/// max polar angle are equal only ever orbits horizontally.
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    pub target: Vec3,
    radius: f32,
    theta: f32,
    phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    #[must_use]
    pub fn new(target: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            enable_pan: true,
            enable_zoom: true,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::PI,

            target,
            radius,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,

            rotate_delta: Vec2::ZERO,
        }
    }

    /// Controller configured from `config`, starting from the spherical
    /// coordinates of `camera_position` relative to the configured target.
    #[must_use]
    pub fn from_config(config: &ControlsConfig, camera_position: Vec3) -> Self {
        let offset = camera_position - config.target;
        let radius = offset.length();

        let mut controls = Self::new(config.target, radius);
        controls.enable_damping = config.enable_damping;
        controls.damping_factor = config.damping_factor;
        controls.enable_pan = config.enable_pan;
        controls.enable_zoom = config.enable_zoom;
        controls.min_distance = config.min_distance;
        controls.max_distance = config.max_distance;
        controls.min_polar_angle = config.min_polar_angle;
        controls.max_polar_angle = config.max_polar_angle;

        if radius > 0.0 {
            controls.theta = offset.x.atan2(offset.z);
            controls.phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        }
        controls.apply_limits();
        controls
    }

    #[inline]
    #[must_use]
    pub fn phi(&self) -> f32 {
        self.phi
    }

    #[inline]
    #[must_use]
    pub fn theta(&self) -> f32 {
        self.theta
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn apply_limits(&mut self) {
        const EPS: f32 = 0.0001;
        let min_phi = self.min_polar_angle.max(EPS);
        let max_phi = self.max_polar_angle.min(std::f32::consts::PI - EPS).max(min_phi);
        self.phi = self.phi.clamp(min_phi, max_phi);
        self.radius = self.radius.clamp(self.min_distance, self.max_distance);
    }

    /// Applies this frame's pointer input and places `transform` on the orbit,
    /// looking at the target.
    pub fn update(&mut self, transform: &mut Transform, input: &Input, fov_degrees: f32, dt: f32) {
        let screen_height = input.screen_size.y.max(1.0);

        if input.is_button_pressed(MouseButton::Left) {
            let rotate_per_pixel = 2.0 * std::f32::consts::PI / screen_height;
            self.rotate_delta.x -= input.cursor_delta.x * rotate_per_pixel * self.rotate_speed;
            self.rotate_delta.y -= input.cursor_delta.y * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            let target_fps = 60.0;
            let retention = (1.0 - self.damping_factor).powf(dt * target_fps);
            let delta_apply = self.rotate_delta * (1.0 - retention);

            self.theta += delta_apply.x;
            self.phi += delta_apply.y;

            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        if self.enable_zoom && input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
        }

        self.apply_limits();

        if self.enable_pan && input.is_button_pressed(MouseButton::Right) {
            let half_fov = fov_degrees.to_radians() / 2.0;
            let target_world_height = 2.0 * self.radius * half_fov.tan();
            let pixels_to_world_ratio = target_world_height / screen_height;

            let forward = -self.offset_direction();
            let right = forward.cross(Vec3::Y).normalize();
            let up = right.cross(forward).normalize();

            self.target += (right * -input.cursor_delta.x + up * input.cursor_delta.y)
                * pixels_to_world_ratio
                * self.pan_speed;
        }

        transform.position = self.target + self.offset_direction() * self.radius;
        transform.look_at(self.target, Vec3::Y);
    }

    fn offset_direction(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }
}
