use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::KeyframeTrack;
use crate::errors::{Result, StageError};

/// Which node and channel a track drives.
#[derive(Debug, Clone)]
pub struct TrackMeta {
    /// Resolved against the mixer root by [`Binder`](crate::animation::Binder).
    pub node_name: String,
    pub target: TargetPath,
}

/// Keyframes of a track, by value kind.
#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    /// Time of the last keyframe.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(track) => track.end_time(),
            TrackData::Quaternion(track) => track.end_time(),
        }
    }

    /// See [`KeyframeTrack::is_consistent`].
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match self {
            TrackData::Vector3(track) => track.is_consistent(),
            TrackData::Quaternion(track) => track.is_consistent(),
        }
    }
}

/// 一条动画轨道：目标节点 + 关键帧
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    fn new(node_name: impl Into<String>, target: TargetPath, data: TrackData) -> Self {
        Self {
            meta: TrackMeta {
                node_name: node_name.into(),
                target,
            },
            data,
        }
    }

    #[must_use]
    pub fn translation(node_name: impl Into<String>, keyframes: KeyframeTrack<Vec3>) -> Self {
        Self::new(node_name, TargetPath::Translation, TrackData::Vector3(keyframes))
    }

    #[must_use]
    pub fn rotation(node_name: impl Into<String>, keyframes: KeyframeTrack<Quat>) -> Self {
        Self::new(node_name, TargetPath::Rotation, TrackData::Quaternion(keyframes))
    }

    #[must_use]
    pub fn scale(node_name: impl Into<String>, keyframes: KeyframeTrack<Vec3>) -> Self {
        Self::new(node_name, TargetPath::Scale, TrackData::Vector3(keyframes))
    }
}

/// A named, immutable set of tracks, shared between actions as
/// `Arc<AnimationClip>`.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Latest keyframe time over all tracks; `0` for a clip without keys.
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().fold(0.0_f32, |end, track| end.max(track.data.end_time()));
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Finds the clip called exactly `name`.
    ///
    /// A miss is reported as [`StageError::ClipNotFound`]; callers decide
    /// whether that is fatal.
    pub fn find_by_name<'a>(clips: &'a [Arc<AnimationClip>], name: &str) -> Result<&'a Arc<AnimationClip>> {
        match clips.iter().find(|clip| clip.name == name) {
            Some(clip) => Ok(clip),
            None => Err(StageError::ClipNotFound { name: name.to_string() }),
        }
    }
}
