use glam::{Affine3A, Mat4};
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle, SkeletonKey};

/// Attaches a skinned mesh node to its skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinBinding {
    pub skeleton: SkeletonKey,
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,

    // bones[i] corresponds to joint index i in vertex data
    pub bones: Vec<NodeHandle>,

    // Static data from the asset: mesh space -> bone local space
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    pub(crate) root_bone_index: usize,

    // Updated every frame: bone world * inverse bind
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    #[must_use]
    pub fn new(
        name: &str,
        bones: Vec<NodeHandle>,
        inverse_bind_matrices: Vec<Affine3A>,
        root_bone_index: usize,
    ) -> Self {
        let count = bones.len();
        Self {
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            root_bone_index,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    #[inline]
    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }

    /// Matrices that take a bind-pose vertex straight to world space.
    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Recomputes the joint matrices from the bones' current world matrices.
    ///
    /// Bones that were removed from the scene keep their previous matrix.
    pub fn update(&mut self, nodes: &SlotMap<NodeHandle, Node>) {
        for (i, &bone) in self.bones.iter().enumerate() {
            let Some(node) = nodes.get(bone) else {
                continue;
            };
            let ibm = self
                .inverse_bind_matrices
                .get(i)
                .copied()
                .unwrap_or(Affine3A::IDENTITY);
            self.joint_matrices[i] = Mat4::from(node.transform.world_matrix * ibm);
        }
    }
}
