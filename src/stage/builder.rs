use std::sync::Arc;

use glam::Vec3;

use crate::animation::{AnimationClip, AnimationMixer};
use crate::app::input::Input;
use crate::app::page::{CanvasDescriptor, HostPage};
use crate::assets::ModelAsset;
use crate::config::{StageConfig, StageFeatures};
use crate::renderer::settings::RendererSettings;
use crate::resources::material::MeshStandardMaterial;
use crate::resources::mesh::Mesh;
use crate::resources::primitives::{CylinderOptions, create_cylinder};
use crate::scene::{Camera, Light, NodeHandle, Scene};
use crate::stage::context::{StageActions, StageContext};
use crate::utils::orbit_control::OrbitControls;

/// One-time stage setup around a loaded avatar.
pub struct SceneBuilder {
    config: StageConfig,
}

impl SceneBuilder {
    #[must_use]
    pub fn new(config: StageConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Builds the scene around `model` and appends its canvas to `page`.
    ///
    /// A clip the model lacks is logged and recorded in
    /// [`StageActions::missing`]; it never aborts the setup.
    pub fn build(&self, model: &ModelAsset, page: &mut dyn HostPage) -> StageContext {
        let config = &self.config;
        let mut scene = Scene::new();

        // 1. Renderer settings bound to the container
        let container = page.container_size();
        let render_settings = RendererSettings::for_container(container.x, container.y, page.pixel_ratio());
        page.append_canvas(CanvasDescriptor {
            width: render_settings.width,
            height: render_settings.height,
            pixel_ratio: render_settings.pixel_ratio,
        });

        // 2. Camera; the aspect is fixed here for good
        let aspect = if container.y > 0 {
            container.x as f32 / container.y as f32
        } else {
            1.0
        };
        let camera_config = &config.camera;
        let camera = scene.add_camera(Camera::new_perspective(
            camera_config.fov_degrees,
            aspect,
            camera_config.near,
            camera_config.far,
        ));
        scene.set_name(camera, "Camera");

        // 3. Orbit controls, settled once
        let mut input = Input::new();
        input.handle_resize(container.as_vec2());
        let mut controls = OrbitControls::from_config(&config.controls, camera_config.position);
        if let Some(node) = scene.get_node_mut(camera) {
            node.transform.position = camera_config.position;
            controls.update(&mut node.transform, &input, camera_config.fov_degrees, 0.0);
        }

        // 4. Lights
        Self::add_lights(&mut scene, config);

        // 5. Avatar, every mesh casting and receiving shadows
        let avatar = scene.instantiate(&model.prefab, "Avatar");
        let mut shadowed = 0;
        scene.traverse_meshes_mut(avatar, |_, mesh| {
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
            shadowed += 1;
        });

        // 6. Lower the avatar
        if let Some(node) = scene.get_node_mut(avatar) {
            node.transform.position.y += config.avatar_offset_y;
        }

        // 7. Pedestal
        let pedestal = config
            .features
            .contains(StageFeatures::PEDESTAL)
            .then(|| Self::add_pedestal(&mut scene, config));

        // 8. Animation
        let mut mixer = AnimationMixer::new(avatar);
        let actions = Self::setup_actions(&mut mixer, &scene, model.clips(), config);

        scene.update();

        log::info!(
            "Stage ready: {} shadowed meshes, {} clips, {}x{} @ {}x",
            shadowed,
            model.clips().len(),
            render_settings.width,
            render_settings.height,
            render_settings.pixel_ratio
        );

        StageContext {
            scene,
            camera,
            avatar,
            pedestal,
            controls,
            mixer,
            actions,
            render_settings,
            features: config.features,
            input,
        }
    }

    fn add_lights(scene: &mut Scene, config: &StageConfig) {
        let lighting = &config.lighting;

        let ambient = scene.add_light(Light::new_ambient(lighting.ambient.color, lighting.ambient.intensity));
        scene.set_name(ambient, "AmbientLight");

        let spot_config = &lighting.spot;
        let mut spot = Light::new_spot(
            spot_config.color,
            spot_config.intensity,
            spot_config.distance,
            spot_config.angle,
            spot_config.penumbra,
            spot_config.decay,
        );
        spot.cast_shadows = spot_config.cast_shadow;
        spot.set_target(Vec3::ZERO);
        let spot = scene.add_light(spot);
        scene.set_name(spot, "SpotLight");
        if let Some(node) = scene.get_node_mut(spot) {
            node.transform.position = spot_config.position;
        }

        let key_config = &lighting.key;
        let key = scene.add_light(Light::new_directional(key_config.color, key_config.intensity, key_config.target));
        scene.set_name(key, "DirectionalLight");
        if let Some(node) = scene.get_node_mut(key) {
            node.transform.position = key_config.position;
        }
    }

    fn add_pedestal(scene: &mut Scene, config: &StageConfig) -> NodeHandle {
        let pedestal = &config.pedestal;
        let geometry = create_cylinder(&CylinderOptions {
            radius_top: pedestal.radius,
            radius_bottom: pedestal.radius,
            height: pedestal.height,
            radial_segments: pedestal.radial_segments,
            height_segments: 1,
            open_ended: false,
        });
        let material = MeshStandardMaterial::new(pedestal.color);
        let mesh = Mesh::new(Arc::new(geometry), Arc::new(material))
            .with_name("Pedestal")
            .with_shadows(false, true);

        let handle = scene.add_mesh(mesh);
        if let Some(node) = scene.get_node_mut(handle) {
            node.transform.position.y = pedestal.offset_y;
        }
        handle
    }

    fn setup_actions(
        mixer: &mut AnimationMixer,
        scene: &Scene,
        clips: &[Arc<AnimationClip>],
        config: &StageConfig,
    ) -> StageActions {
        let mut actions = StageActions::default();

        match AnimationClip::find_by_name(clips, &config.idle_clip) {
            Ok(clip) => {
                let handle = mixer.clip_action(clip, scene);
                if let Some(action) = mixer.action_mut(handle) {
                    action.play();
                }
                actions.idle = Some(handle);
            }
            Err(err) => {
                log::warn!("{err}; the avatar stays in its rest pose");
                actions.missing.push(config.idle_clip.clone());
            }
        }

        for name in &config.extra_clips {
            match AnimationClip::find_by_name(clips, name) {
                Ok(clip) => {
                    let handle = mixer.clip_action(clip, scene);
                    actions.extras.push((name.clone(), handle));
                }
                Err(err) => {
                    log::warn!("{err}");
                    actions.missing.push(name.clone());
                }
            }
        }

        actions
    }
}
