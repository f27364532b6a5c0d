use slotmap::{SecondaryMap, SlotMap};

use crate::assets::prefab::Prefab;
use crate::resources::mesh::Mesh;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::node::Node;
use crate::scene::skeleton::{Skeleton, SkinBinding};
use crate::scene::transform::Transform;
use crate::scene::transform_system;
use crate::scene::{NodeHandle, SkeletonKey};

/// 场景图结构
///
/// 节点存放在 `nodes` 中，其他组件按 `NodeHandle` 存放在各自的 SecondaryMap 中。
/// Scene 是纯数据层，不持有任何 GPU 资源。
#[derive(Default)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== 组件 ====
    pub names: SecondaryMap<NodeHandle, String>,
    pub meshes: SecondaryMap<NodeHandle, Mesh>,
    pub cameras: SecondaryMap<NodeHandle, Camera>,
    pub lights: SecondaryMap<NodeHandle, Light>,
    pub skins: SecondaryMap<NodeHandle, SkinBinding>,

    pub skeletons: SlotMap<SkeletonKey, Skeleton>,

    pub active_camera: Option<NodeHandle>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // 节点管理
    // ========================================================================

    /// 添加一个节点到场景 (默认放在根节点)
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_named_node(&mut self, name: &str, transform: Transform) -> NodeHandle {
        let handle = self.add_node(Node::with_transform(transform));
        self.names.insert(handle, name.to_string());
        handle
    }

    /// 建立父子关系 (Attach)
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found during attach!");
            return;
        }

        // 1. Detach from old
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p) {
                n.children.retain(|&x| x != child);
            }
        } else {
            self.root_nodes.retain(|&x| x != child);
        }

        // 2. Attach to new
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.names.get(handle).map(String::as_str)
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if self.nodes.contains_key(handle) {
            self.names.insert(handle, name.to_string());
        }
    }

    /// First node named `name` under `root`, depth-first.
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut found = None;
        self.traverse(root, |handle| {
            if found.is_none() && self.get_name(handle) == Some(name) {
                found = Some(handle);
            }
        });
        found
    }

    // ========================================================================
    // 遍历
    // ========================================================================

    /// Visits `root` and all of its descendants, parents before children.
    pub fn traverse(&self, root: NodeHandle, mut visit: impl FnMut(NodeHandle)) {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            visit(handle);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Visits every mesh in the subtree under `root`.
    pub fn traverse_meshes_mut(&mut self, root: NodeHandle, mut visit: impl FnMut(NodeHandle, &mut Mesh)) {
        let mut handles = Vec::new();
        self.traverse(root, |handle| handles.push(handle));
        for handle in handles {
            if let Some(mesh) = self.meshes.get_mut(handle) {
                visit(handle, mesh);
            }
        }
    }

    /// Whether `handle` and all of its ancestors are visible.
    #[must_use]
    pub fn is_visible(&self, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            match self.nodes.get(h) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    // ========================================================================
    // 组件
    // ========================================================================

    pub fn add_mesh(&mut self, mesh: Mesh) -> NodeHandle {
        let handle = self.add_node(Node::new());
        self.names.insert(handle, mesh.name.clone());
        self.meshes.insert(handle, mesh);
        handle
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeletons.insert(skeleton)
    }

    pub fn add_camera(&mut self, camera: Camera) -> NodeHandle {
        let handle = self.add_node(Node::new());
        self.cameras.insert(handle, camera);
        if self.active_camera.is_none() {
            self.active_camera = Some(handle);
        }
        handle
    }

    pub fn add_light(&mut self, light: Light) -> NodeHandle {
        let handle = self.add_node(Node::new());
        self.lights.insert(handle, light);
        handle
    }

    // ========================================================================
    // 组件查询 API
    // ========================================================================

    pub fn query_camera_bundle(&mut self, handle: NodeHandle) -> Option<(&mut Transform, &mut Camera)> {
        let camera = self.cameras.get_mut(handle)?;
        let transform = &mut self.nodes.get_mut(handle)?.transform;
        Some((transform, camera))
    }

    #[must_use]
    pub fn main_camera(&self) -> Option<&Camera> {
        self.cameras.get(self.active_camera?)
    }

    /// Lights paired with their world position.
    pub fn iter_lights(&self) -> impl Iterator<Item = (&Light, glam::Vec3)> {
        self.lights.iter().filter_map(move |(handle, light)| {
            let node = self.nodes.get(handle)?;
            Some((light, node.transform.world_position()))
        })
    }

    // ========================================================================
    // 每帧更新
    // ========================================================================

    /// 更新整个场景的世界矩阵，并同步相机矩阵
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &self.root_nodes);

        for (handle, camera) in &mut self.cameras {
            if let Some(node) = self.nodes.get(handle) {
                camera.update_view_projection(&node.transform.world_matrix);
            }
        }
    }

    pub fn update_skeletons(&mut self) {
        let nodes = &self.nodes;
        for skeleton in self.skeletons.values_mut() {
            skeleton.update(nodes);
        }
    }

    /// World matrices, camera matrices and joint matrices, in that order.
    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
    }

    // ========================================================================
    // 预制体实例化
    // ========================================================================

    /// Instantiates `prefab` under a new root node named `name`.
    ///
    /// Returns the new root. Skeletons are registered and skinned meshes
    /// bound; clips are left to the caller.
    pub fn instantiate(&mut self, prefab: &Prefab, name: &str) -> NodeHandle {
        let root = self.add_named_node(name, Transform::new());

        // 1. 创建所有节点（浅层）
        let handles: Vec<NodeHandle> = prefab
            .nodes
            .iter()
            .map(|p| {
                let handle = self.nodes.insert(Node::with_transform(p.transform.clone()));
                if let Some(name) = &p.name {
                    self.names.insert(handle, name.clone());
                }
                if let Some(mesh) = &p.mesh {
                    self.meshes.insert(handle, mesh.clone());
                }
                handle
            })
            .collect();

        // 2. 建立层级
        for (index, p) in prefab.nodes.iter().enumerate() {
            for &child in &p.children_indices {
                if let Some(&child_handle) = handles.get(child) {
                    self.nodes[child_handle].parent = Some(handles[index]);
                    self.nodes[handles[index]].children.push(child_handle);
                }
            }
        }
        for &root_index in &prefab.root_indices {
            if let Some(&handle) = handles.get(root_index) {
                self.nodes[handle].parent = Some(root);
                self.nodes[root].children.push(handle);
            }
        }

        // 3. 骨骼
        let skeleton_keys: Vec<SkeletonKey> = prefab
            .skeletons
            .iter()
            .map(|s| {
                let bones = s
                    .bone_indices
                    .iter()
                    .filter_map(|&i| handles.get(i).copied())
                    .collect();
                self.add_skeleton(Skeleton::new(
                    &s.name,
                    bones,
                    s.inverse_bind_matrices.clone(),
                    s.root_bone_index,
                ))
            })
            .collect();

        // 4. 绑定蒙皮
        for (index, p) in prefab.nodes.iter().enumerate() {
            if let Some(skin_index) = p.skin_index
                && let Some(&skeleton) = skeleton_keys.get(skin_index)
            {
                self.skins.insert(handles[index], SkinBinding { skeleton });
            }
        }

        root
    }
}
