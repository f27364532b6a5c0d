use std::sync::Arc;

use slotmap::{SlotMap, new_key_type};

use crate::animation::action::AnimationAction;
use crate::animation::binder::Binder;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

new_key_type! {
    /// Stable handle to an action owned by an [`AnimationMixer`].
    pub struct ActionHandle;
}

/// Drives every action bound to one root node.
///
/// The mixer owns its actions; callers keep [`ActionHandle`]s.
pub struct AnimationMixer {
    root: NodeHandle,
    actions: SlotMap<ActionHandle, AnimationAction>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            actions: SlotMap::with_key(),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Returns the action for `clip`, creating and binding it on first use.
    ///
    /// Asking twice for the same clip yields the same handle. New actions are
    /// stopped.
    pub fn clip_action(&mut self, clip: &Arc<AnimationClip>, scene: &Scene) -> ActionHandle {
        if let Some((handle, _)) = self
            .actions
            .iter()
            .find(|(_, action)| Arc::ptr_eq(action.clip(), clip))
        {
            return handle;
        }

        let bindings = Binder::bind(scene, self.root, clip);
        log::debug!(
            "Bound clip '{}' ({} of {} tracks resolved)",
            clip.name,
            bindings.len(),
            clip.tracks.len()
        );
        self.add_action(AnimationAction::new(Arc::clone(clip)).with_bindings(bindings))
    }

    pub fn add_action(&mut self, action: AnimationAction) -> ActionHandle {
        self.actions.insert(action)
    }

    #[must_use]
    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionHandle, &AnimationAction)> {
        self.actions.iter()
    }

    pub fn running_actions(&self) -> impl Iterator<Item = (ActionHandle, &AnimationAction)> {
        self.actions.iter().filter(|(_, action)| action.is_running())
    }

    /// Advances all running actions by `dt` seconds and writes the sampled
    /// values into the bound node transforms.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        for action in self.actions.values_mut() {
            action.update(dt);
        }

        for action in self.actions.values_mut() {
            if !action.is_running() || action.weight <= 0.0 {
                continue;
            }
            let weight = action.weight.min(1.0);

            for binding_index in 0..action.bindings.len() {
                let binding = action.bindings[binding_index];
                let Some(value) = action.sample_track(binding.track_index) else {
                    continue;
                };
                if let Some(node) = scene.get_node_mut(binding.node_handle) {
                    binding.apply(value, weight, &mut node.transform);
                }
            }
        }
    }
}
