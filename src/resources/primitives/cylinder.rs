use std::f32::consts::TAU;

use glam::Vec3;

use crate::resources::geometry::Geometry;

pub struct CylinderOptions {
    pub radius_top: f32,
    pub radius_bottom: f32,
    pub height: f32,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub open_ended: bool,
}

impl Default for CylinderOptions {
    fn default() -> Self {
        Self {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 32,
            height_segments: 1,
            open_ended: false,
        }
    }
}

/// Cylinder centred on the origin, axis along +Y.
///
/// Seam vertices are duplicated so UVs wrap cleanly; each cap has one centre
/// vertex per segment.
#[must_use]
pub fn create_cylinder(options: &CylinderOptions) -> Geometry {
    let radial = options.radial_segments.max(3);
    let rows = options.height_segments.max(1);
    let half_height = options.height / 2.0;

    let mut geo = Geometry::new();

    // === Side ===
    let slope = (options.radius_bottom - options.radius_top) / options.height.max(f32::EPSILON);
    let ring = radial + 1;
    for y in 0..=rows {
        let v = y as f32 / rows as f32;
        let radius = v * (options.radius_bottom - options.radius_top) + options.radius_top;
        for x in 0..=radial {
            let u = x as f32 / radial as f32;
            let (sin, cos) = (u * TAU).sin_cos();

            geo.positions.push([radius * sin, -v * options.height + half_height, radius * cos]);
            geo.normals.push(Vec3::new(sin, slope, cos).normalize().to_array());
            geo.uvs.push([u, 1.0 - v]);
        }
    }
    for y in 0..rows {
        for x in 0..radial {
            let a = y * ring + x;
            let b = (y + 1) * ring + x;
            let c = (y + 1) * ring + x + 1;
            let d = y * ring + x + 1;
            geo.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    // === Caps ===
    if !options.open_ended {
        if options.radius_top > 0.0 {
            push_cap(&mut geo, radial, options.radius_top, half_height, 1.0);
        }
        if options.radius_bottom > 0.0 {
            push_cap(&mut geo, radial, options.radius_bottom, -half_height, -1.0);
        }
    }

    geo.compute_bounding_box();
    geo
}

fn push_cap(geo: &mut Geometry, radial: u32, radius: f32, y: f32, sign: f32) {
    let center_start = geo.positions.len() as u32;
    for _ in 0..radial {
        geo.positions.push([0.0, y, 0.0]);
        geo.normals.push([0.0, sign, 0.0]);
        geo.uvs.push([0.5, 0.5]);
    }

    let ring_start = geo.positions.len() as u32;
    for x in 0..=radial {
        let (sin, cos) = (x as f32 / radial as f32 * TAU).sin_cos();
        geo.positions.push([radius * sin, y, radius * cos]);
        geo.normals.push([0.0, sign, 0.0]);
        geo.uvs.push([cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5]);
    }

    for x in 0..radial {
        let center = center_start + x;
        let i = ring_start + x;
        if sign > 0.0 {
            geo.indices.extend_from_slice(&[i, i + 1, center]);
        } else {
            geo.indices.extend_from_slice(&[i + 1, i, center]);
        }
    }
}
