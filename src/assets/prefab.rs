use std::sync::Arc;

use glam::Affine3A;

use crate::animation::clip::AnimationClip;
use crate::resources::mesh::Mesh;
use crate::scene::transform::Transform;

/// One node of a [`Prefab`]; children are referenced by index.
#[derive(Debug, Clone, Default)]
pub struct PrefabNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// Indices into `Prefab::nodes`
    pub children_indices: Vec<usize>,
    pub mesh: Option<Mesh>,
    /// Skeleton deforming this node's mesh, as an index into `Prefab::skeletons`
    pub skin_index: Option<usize>,
}

impl PrefabNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A glTF skin, with bones as node indices.
#[derive(Debug, Clone)]
pub struct PrefabSkeleton {
    pub name: String,
    /// 根骨骼（`bone_indices` 下标）
    pub root_bone_index: usize,
    pub bone_indices: Vec<usize>,
    pub inverse_bind_matrices: Vec<Affine3A>,
}

/// The loaded model before it enters a scene.
///
/// Holds no `NodeHandle`s, so the loader thread can hand it over as is.
/// [`Scene::instantiate`](crate::scene::Scene::instantiate) turns it into a
/// subtree under a fresh root.
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    pub nodes: Vec<PrefabNode>,
    /// 顶层节点下标
    pub root_indices: Vec<usize>,
    pub skeletons: Vec<PrefabSkeleton>,
    pub animations: Vec<Arc<AnimationClip>>,
}

impl Prefab {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes carrying a mesh.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.mesh.is_some()).count()
    }
}
