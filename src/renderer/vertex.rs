use bytemuck::{Pod, Zeroable};

use crate::resources::geometry::Geometry;

/// Interleaved vertex layout shared by the forward and shadow pipelines.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }

    /// Interleaves the bind-pose attributes of `geometry`.
    ///
    /// Missing normals or UVs read as zero.
    #[must_use]
    pub fn from_geometry(geometry: &Geometry) -> Vec<Vertex> {
        (0..geometry.positions.len())
            .map(|i| Vertex {
                position: geometry.positions[i],
                normal: geometry.normals.get(i).copied().unwrap_or([0.0; 3]),
                uv: geometry.uvs.get(i).copied().unwrap_or([0.0; 2]),
            })
            .collect()
    }
}
