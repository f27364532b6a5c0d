//! Format-specific loaders. Only glTF 2.0 is supported.

pub mod gltf;

pub use gltf::GltfLoader;
