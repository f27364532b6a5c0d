use crate::animation::{ActionHandle, AnimationMixer};
use crate::app::input::Input;
use crate::config::StageFeatures;
use crate::renderer::settings::RendererSettings;
use crate::scene::{Camera, NodeHandle, Scene};
use crate::utils::orbit_control::OrbitControls;

/// Actions created for the avatar's clips.
#[derive(Debug, Clone, Default)]
pub struct StageActions {
    /// The clip started at setup, when it was found.
    pub idle: Option<ActionHandle>,
    /// Prepared but stopped actions, by clip name.
    pub extras: Vec<(String, ActionHandle)>,
    /// Requested clips the model does not contain.
    pub missing: Vec<String>,
}

impl StageActions {
    /// Handle of the prepared action for clip `name`.
    #[must_use]
    pub fn extra(&self, name: &str) -> Option<ActionHandle> {
        self.extras
            .iter()
            .find(|(clip, _)| clip == name)
            .map(|(_, handle)| *handle)
    }
}

/// Everything the stage set up once and then keeps for the page's lifetime.
pub struct StageContext {
    pub scene: Scene,
    pub camera: NodeHandle,
    pub avatar: NodeHandle,
    pub pedestal: Option<NodeHandle>,
    pub controls: OrbitControls,
    pub mixer: AnimationMixer,
    pub actions: StageActions,
    pub render_settings: RendererSettings,
    pub features: StageFeatures,
    /// Pointer state fed by the host and consumed by the controls.
    pub input: Input,
}

impl StageContext {
    #[must_use]
    pub fn camera(&self) -> Option<&Camera> {
        self.scene.cameras.get(self.camera)
    }

    /// Aspect ratio the camera was created with.
    #[must_use]
    pub fn camera_aspect(&self) -> f32 {
        self.camera().map_or(1.0, |camera| camera.aspect)
    }

    /// Advances the stage by `dt` seconds: animation, camera controls, then
    /// world and joint matrices.
    pub fn step(&mut self, dt: f32) {
        self.mixer.update(dt, &mut self.scene);

        if let Some((transform, camera)) = self.scene.query_camera_bundle(self.camera) {
            let fov_degrees = camera.fov.to_degrees();
            self.controls.update(transform, &self.input, fov_degrees, dt);
        }
        self.input.end_frame();

        self.scene.update();
    }
}
