use rustc_hash::FxHashMap;

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Resolves every track of `clip` against the subtree under `root`.
    ///
    /// Tracks whose node name does not occur in the subtree are skipped. When
    /// several nodes share a name the first one in depth-first order wins.
    #[must_use]
    pub fn bind(scene: &Scene, root: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut by_name: FxHashMap<&str, NodeHandle> = FxHashMap::default();
        scene.traverse(root, |handle| {
            if let Some(name) = scene.get_name(handle) {
                by_name.entry(name).or_insert(handle);
            }
        });

        let mut bindings = Vec::with_capacity(clip.tracks.len());
        for (track_index, track) in clip.tracks.iter().enumerate() {
            match by_name.get(track.meta.node_name.as_str()) {
                Some(&node_handle) => bindings.push(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.meta.target,
                }),
                None => log::debug!(
                    "Clip '{}': no node named '{}' under the target root",
                    clip.name,
                    track.meta.node_name
                ),
            }
        }

        bindings
    }
}
