//! 资源加载模块
//!
//! - [`AssetReader`]: 按块读取字节流并回调进度
//! - [`GltfLoader`]: glTF 2.0 解析为 [`Prefab`]
//! - [`ModelLoader`]: 面向页面的加载入口，可在后台线程运行

pub mod io;
pub mod loader;
pub mod loaders;
pub mod prefab;

pub use io::{AssetReader, FileAssetReader};
pub use loader::{LOADING_TEXT, LoadEvent, LoadProgress, LoadTask, ModelAsset, ModelLoader};
pub use loaders::GltfLoader;
pub use prefab::{Prefab, PrefabNode, PrefabSkeleton};
