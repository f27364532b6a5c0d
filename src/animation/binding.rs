use glam::{Quat, Vec3};

use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// Transform channel a track writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

/// A value sampled from a track at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
}

/// Track `track_index` of a clip, resolved to a node of the scene.
#[derive(Debug, Clone, Copy)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_handle: NodeHandle,
    pub target: TargetPath,
}

impl PropertyBinding {
    /// Blends `value` into `transform` with `weight` in `[0, 1]`.
    ///
    /// Returns `false`, leaving the transform untouched, when the value kind
    /// does not fit the target channel.
    pub fn apply(&self, value: TrackValue, weight: f32, transform: &mut Transform) -> bool {
        match (self.target, value) {
            (TargetPath::Translation, TrackValue::Vector3(v)) => {
                transform.position = transform.position.lerp(v, weight);
            }
            (TargetPath::Scale, TrackValue::Vector3(v)) => {
                transform.scale = transform.scale.lerp(v, weight);
            }
            (TargetPath::Rotation, TrackValue::Quaternion(q)) => {
                transform.rotation = transform.rotation.slerp(q, weight);
            }
            _ => return false,
        }
        transform.mark_dirty();
        true
    }
}
