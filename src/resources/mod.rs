//! 核心资源定义模块
//!
//! 渲染所需的 CPU 端数据，不依赖于 GPU 实现：
//! - Mesh: 网格组件（几何 + 材质 + 阴影标志）
//! - Material: 标准材质
//! - Texture: 解码后的纹理
//! - Geometry: 几何数据
//! - primitives: 程序化几何体

pub mod geometry;
pub mod material;
pub mod mesh;
pub mod primitives;
pub mod texture;

pub use geometry::{BoundingBox, Geometry};
pub use material::{MeshStandardMaterial, Side};
pub use mesh::Mesh;
pub use texture::{ColorSpace, Texture, TextureSampler};
