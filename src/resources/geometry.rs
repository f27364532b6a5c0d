use glam::{Affine3A, Vec3};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |bbox, p| Self {
            min: bbox.min.min(p),
            max: bbox.max.max(p),
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Axis-aligned box enclosing the eight transformed corners.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        if self.is_empty() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        Self::from_points((0..8).map(|i| {
            matrix.transform_point3(Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            ))
        }))
    }
}

/// CPU-side triangle mesh data.
///
/// Attributes are stored planar. `joints`/`weights` are either empty or have
/// one entry per vertex; a geometry with both is skinned.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub uuid: Uuid,

    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
    /// Triangle list. Empty means non-indexed.
    pub indices: Vec<u32>,

    bounding_box: BoundingBox,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            joints: Vec::new(),
            weights: Vec::new(),
            indices: Vec::new(),
            bounding_box: BoundingBox::EMPTY,
        }
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices to draw, or vertices when non-indexed.
    #[must_use]
    pub fn draw_count(&self) -> u32 {
        if self.indices.is_empty() {
            self.positions.len() as u32
        } else {
            self.indices.len() as u32
        }
    }

    #[must_use]
    pub fn is_skinned(&self) -> bool {
        !self.joints.is_empty() && self.joints.len() == self.weights.len()
    }

    #[must_use]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    pub fn compute_bounding_box(&mut self) {
        self.bounding_box = BoundingBox::from_points(self.positions.iter().map(|&p| Vec3::from_array(p)));
    }

    /// Fills in any attribute the renderer needs but the source lacked.
    ///
    /// Missing normals are computed, missing UVs become zero.
    pub fn fill_missing_attributes(&mut self) {
        if self.normals.len() != self.positions.len() {
            self.compute_vertex_normals();
        }
        if self.uvs.len() != self.positions.len() {
            self.uvs = vec![[0.0, 0.0]; self.positions.len()];
        }
        self.compute_bounding_box();
    }

    /// Area-weighted smooth normals.
    pub fn compute_vertex_normals(&mut self) {
        let count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; count];
        let pos = |i: usize| Vec3::from_array(self.positions[i]);

        let mut accumulate_triangle = |i0: usize, i1: usize, i2: usize| {
            if i0 >= count || i1 >= count || i2 >= count {
                return;
            }
            // 叉积的模长 = 2 * 三角形面积
            let face_normal = (pos(i1) - pos(i0)).cross(pos(i2) - pos(i0));
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        };

        if self.indices.is_empty() {
            for i in (0..count.saturating_sub(2)).step_by(3) {
                accumulate_triangle(i, i + 1, i + 2);
            }
        } else {
            for tri in self.indices.chunks_exact(3) {
                accumulate_triangle(tri[0] as usize, tri[1] as usize, tri[2] as usize);
            }
        }

        self.normals = normals
            .into_iter()
            .map(|n| n.normalize_or(Vec3::Y).to_array())
            .collect();
    }
}
