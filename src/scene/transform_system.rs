//! 变换系统 (Transform System)
//!
//! 负责场景图的矩阵层级更新，只借用 nodes SlotMap 和根节点列表，
//! 与 Scene 的其他组件解耦以避免借用冲突。

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// 从根节点开始，按深度优先顺序更新所有节点的世界矩阵。
///
/// 只有局部矩阵变化或父节点世界矩阵变化的子树才会重新计算。
/// 使用显式栈，层级深度不受调用栈限制。
pub fn update_hierarchy(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = roots
        .iter()
        .rev()
        .map(|&root| (root, Affine3A::IDENTITY, false))
        .collect();

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let changed = local_changed || parent_changed;
        if changed {
            let world = parent_world * node.transform.local_matrix;
            node.transform.set_world_matrix(world);
        }

        let world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, world, changed));
        }
    }
}
