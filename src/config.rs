//! Stage Configuration
//!
//! Every constant that shapes the stage lives here, grouped by the part of the
//! setup that consumes it. [`StageConfig::default()`] reproduces the avatar
//! page exactly; tests and embedders override single fields with struct
//! update syntax or the `with_*` helpers.
//!
//! ```rust,ignore
//! use avatar_stage::config::{StageConfig, StageFeatures};
//!
//! let config = StageConfig::default()
//!     .with_model_path("assets/other.glb")
//!     .with_features(StageFeatures::PEDESTAL);
//! ```

use std::path::PathBuf;

use bitflags::bitflags;
use glam::Vec3;

bitflags! {
    /// Optional parts of the stage. All of them are off by default.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StageFeatures: u32 {
        /// Add a thin cylinder under the avatar that receives its shadow.
        const PEDESTAL        = 1 << 0;
        /// Log the normalized device coordinates of every pointer press.
        const POINTER_READOUT = 1 << 1;
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Perspective camera framing.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(-0.1, 2.0, 3.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Orbit controls
// ---------------------------------------------------------------------------

/// Orbit controller constraints.
///
/// `min_polar_angle == max_polar_angle` pins the camera's elevation; only
/// horizontal orbiting remains.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlsConfig {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 0.75, 0.0),
            enable_damping: true,
            damping_factor: 0.05,
            enable_pan: false,
            enable_zoom: false,
            min_distance: 3.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 1.4,
            max_polar_angle: 1.4,
        }
    }
}

// ---------------------------------------------------------------------------
// Lighting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientConfig {
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotConfig {
    pub color: Vec3,
    pub intensity: f32,
    /// Cutoff distance of the light's influence.
    pub distance: f32,
    /// Half-angle of the outer cone, in radians.
    pub angle: f32,
    /// Fraction of the cone that fades out, in `[0, 1]`.
    pub penumbra: f32,
    pub decay: f32,
    pub position: Vec3,
    pub cast_shadow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyLightConfig {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

/// The fixed three-light rig.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingConfig {
    pub ambient: AmbientConfig,
    pub spot: SpotConfig,
    pub key: KeyLightConfig,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: AmbientConfig {
                color: Vec3::ONE,
                intensity: 1.0,
            },
            spot: SpotConfig {
                color: Vec3::ONE,
                intensity: 18.0,
                distance: 8.0,
                angle: 1.0,
                penumbra: 0.5,
                decay: 2.0,
                position: Vec3::new(0.0, 8.0, 2.0),
                cast_shadow: true,
            },
            key: KeyLightConfig {
                color: Vec3::ONE,
                intensity: 2.0,
                position: Vec3::new(1.0, 1.0, 2.0),
                target: Vec3::ZERO,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Pedestal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PedestalConfig {
    pub radius: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub color: glam::Vec4,
    pub offset_y: f32,
}

impl Default for PedestalConfig {
    fn default() -> Self {
        Self {
            radius: 0.6,
            height: 0.08,
            radial_segments: 64,
            color: glam::Vec4::ONE,
            offset_y: -0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// StageConfig
// ---------------------------------------------------------------------------

/// Top-level configuration consumed by [`SceneBuilder`](crate::stage::SceneBuilder)
/// and the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    /// Location of the avatar model.
    pub model_path: PathBuf,
    pub features: StageFeatures,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub lighting: LightingConfig,
    pub pedestal: PedestalConfig,
    /// Vertical offset applied to the avatar root after instantiation.
    pub avatar_offset_y: f32,
    /// Clip started right after setup.
    pub idle_clip: String,
    /// Clips prepared as actions but left stopped.
    pub extra_clips: Vec<String>,
    /// Size of each read while streaming the model from disk.
    pub read_chunk_size: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("public/avatar.glb"),
            features: StageFeatures::empty(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            lighting: LightingConfig::default(),
            pedestal: PedestalConfig::default(),
            avatar_offset_y: -0.5,
            idle_clip: "waving".to_string(),
            extra_clips: vec!["salut".to_string()],
            read_chunk_size: 64 * 1024,
        }
    }
}

impl StageConfig {
    #[must_use]
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    #[must_use]
    pub fn with_features(mut self, features: StageFeatures) -> Self {
        self.features = features;
        self
    }

    #[must_use]
    pub fn with_idle_clip(mut self, name: impl Into<String>) -> Self {
        self.idle_clip = name.into();
        self
    }
}
