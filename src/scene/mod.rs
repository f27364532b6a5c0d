//! 场景图系统模块
//!
//! 管理场景层级结构和组件：
//! - Node: 场景节点（父子关系和变换）
//! - Transform: 变换组件（位置、旋转、缩放）
//! - Scene: 场景容器与组件表
//! - Camera / Light: 相机与光源组件
//! - Skeleton: 骨骼与关节矩阵

pub mod camera;
pub mod light;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use camera::Camera;
pub use light::{DirectionalLight, Light, LightKind, ShadowConfig, SpotLight};
pub use node::Node;
pub use scene::Scene;
pub use skeleton::{Skeleton, SkinBinding};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct SkeletonKey;
}
