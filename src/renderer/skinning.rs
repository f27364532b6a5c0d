//! CPU linear blend skinning.
//!
//! Skinned meshes are deformed on the CPU every frame and uploaded with
//! `queue.write_buffer`; the GPU pipelines only ever see static vertices.

use glam::{Mat4, Vec3};

use crate::renderer::vertex::Vertex;
use crate::resources::geometry::Geometry;

/// Influences lighter than this are skipped.
const MIN_WEIGHT: f32 = 0.0001;

/// Deforms `geometry` by `joint_matrices` (bone world * inverse bind) into
/// world space, writing the result into `out`.
///
/// Vertices whose weights are all negligible, or that reference joints out
/// of range, keep their bind-pose position.
pub fn skin_vertices(geometry: &Geometry, joint_matrices: &[Mat4], out: &mut Vec<Vertex>) {
    out.clear();
    out.reserve(geometry.positions.len());

    for (i, &position) in geometry.positions.iter().enumerate() {
        let normal = geometry.normals.get(i).copied().unwrap_or([0.0; 3]);
        let uv = geometry.uvs.get(i).copied().unwrap_or([0.0; 2]);

        let skin = blend_matrix(geometry, joint_matrices, i);
        let (position, normal) = match skin {
            Some(m) => (
                m.transform_point3(Vec3::from_array(position)).to_array(),
                m.transform_vector3(Vec3::from_array(normal))
                    .normalize_or_zero()
                    .to_array(),
            ),
            None => (position, normal),
        };

        out.push(Vertex { position, normal, uv });
    }
}

/// Weighted sum of the joint matrices influencing vertex `index`.
fn blend_matrix(geometry: &Geometry, joint_matrices: &[Mat4], index: usize) -> Option<Mat4> {
    let joints = geometry.joints.get(index)?;
    let weights = geometry.weights.get(index)?;

    let mut blended = Mat4::ZERO;
    let mut total = 0.0;
    for k in 0..4 {
        let w = weights[k];
        if w < MIN_WEIGHT {
            continue;
        }
        let jm = joint_matrices.get(usize::from(joints[k]))?;
        blended += *jm * w;
        total += w;
    }

    (total >= MIN_WEIGHT).then_some(blended)
}
