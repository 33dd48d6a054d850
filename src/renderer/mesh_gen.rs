//! CPU mesh generation for the scene's procedural geometry descriptors.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::scene::GeometryDesc;

/// Vertex layout shared by every scene mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal (zero for line segments).
    pub normal: [f32; 3],
}

impl MeshVertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// Primitive type of a generated mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Indexed triangle list.
    Triangles,
    /// Indexed line list.
    Lines,
}

/// A contiguous range of the index buffer drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexGroup {
    /// First index.
    pub start: u32,
    /// Number of indices.
    pub count: u32,
}

/// Generated vertex and index data.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertices.
    pub vertices: Vec<MeshVertex>,
    /// Indices into `vertices`.
    pub indices: Vec<u32>,
    /// Material groups in order; together they cover every index once.
    pub groups: Vec<IndexGroup>,
    /// How indices are assembled into primitives.
    pub topology: Topology,
}

impl MeshData {
    fn single_group(
        vertices: Vec<MeshVertex>,
        indices: Vec<u32>,
        topology: Topology,
    ) -> Self {
        let groups = vec![IndexGroup {
            start: 0,
            count: indices.len() as u32,
        }];
        Self {
            vertices,
            indices,
            groups,
            topology,
        }
    }
}

/// Generate the mesh for a geometry descriptor.
#[must_use]
pub fn generate(desc: &GeometryDesc) -> MeshData {
    match *desc {
        GeometryDesc::Cylinder {
            radius,
            height,
            segments,
        } => cylinder(radius, height, segments),
        GeometryDesc::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere(radius, width_segments, height_segments),
        GeometryDesc::Segment { start, end } => segment(start, end),
        GeometryDesc::Billboard => billboard(),
    }
}

/// Capped cylinder around +Y, centred on the origin, with three groups:
/// side, top cap, bottom cap.
#[must_use]
pub fn cylinder(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height * 0.5;
    let ring = |i: u32| {
        let theta = i as f32 / segments as f32 * TAU;
        Vec3::new(theta.sin(), 0.0, theta.cos())
    };

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // side: top/bottom vertex pairs, duplicated seam
    for i in 0..=segments {
        let dir = ring(i);
        vertices.push(MeshVertex::new(dir * radius + Vec3::Y * half, dir));
        vertices.push(MeshVertex::new(dir * radius - Vec3::Y * half, dir));
    }
    for i in 0..segments {
        let (a, b, c, d) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
        indices.extend_from_slice(&[a, b, d, a, d, c]);
    }
    let side = IndexGroup {
        start: 0,
        count: indices.len() as u32,
    };

    let mut cap = |y: f32, normal: Vec3, flip: bool| {
        let start = indices.len() as u32;
        let centre = vertices.len() as u32;
        vertices.push(MeshVertex::new(Vec3::Y * y, normal));
        for i in 0..=segments {
            vertices.push(MeshVertex::new(ring(i) * radius + Vec3::Y * y, normal));
        }
        for i in 0..segments {
            let (p, q) = (centre + 1 + i, centre + 2 + i);
            if flip {
                indices.extend_from_slice(&[centre, q, p]);
            } else {
                indices.extend_from_slice(&[centre, p, q]);
            }
        }
        IndexGroup {
            start,
            count: indices.len() as u32 - start,
        }
    };
    let top = cap(half, Vec3::Y, false);
    let bottom = cap(-half, Vec3::NEG_Y, true);

    MeshData {
        vertices,
        indices,
        groups: vec![side, top, bottom],
        topology: Topology::Triangles,
    }
}

/// UV sphere centred on the origin.
#[must_use]
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    for iy in 0..=h {
        let phi = iy as f32 / h as f32 * PI;
        for ix in 0..=w {
            let theta = ix as f32 / w as f32 * TAU;
            let normal = Vec3::new(
                -theta.cos() * phi.sin(),
                phi.cos(),
                theta.sin() * phi.sin(),
            );
            vertices.push(MeshVertex::new(normal * radius, normal));
        }
    }

    let row = w + 1;
    let mut indices = Vec::new();
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // pole rows collapse to single triangles
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData::single_group(vertices, indices, Topology::Triangles)
}

/// A single line segment between two world-space points.
#[must_use]
pub fn segment(start: Vec3, end: Vec3) -> MeshData {
    let vertices = vec![
        MeshVertex::new(start, Vec3::ZERO),
        MeshVertex::new(end, Vec3::ZERO),
    ];
    MeshData::single_group(vertices, vec![0, 1], Topology::Lines)
}

/// Unit quad in the XY plane facing +Z, centred on the origin.
#[must_use]
pub fn billboard() -> MeshData {
    let vertices = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)]
        .into_iter()
        .map(|(x, y)| MeshVertex::new(Vec3::new(x, y, 0.0), Vec3::Z))
        .collect();
    MeshData::single_group(vertices, vec![0, 1, 2, 0, 2, 3], Topology::Triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_groups_cover(mesh: &MeshData) {
        let mut next = 0;
        for group in &mesh.groups {
            assert_eq!(group.start, next);
            next += group.count;
        }
        assert_eq!(next as usize, mesh.indices.len());
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    fn triangle_normal(mesh: &MeshData, tri: &[u32]) -> Vec3 {
        let p = |i: u32| Vec3::from(mesh.vertices[i as usize].position);
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn cylinder_has_side_and_two_cap_groups() {
        let mesh = cylinder(0.1, 2.0, 8);
        assert_eq!(mesh.groups.len(), 3);
        assert_eq!(mesh.groups[0].count, 8 * 6);
        assert_eq!(mesh.groups[1].count, 8 * 3);
        assert_eq!(mesh.groups[2].count, 8 * 3);
        assert_groups_cover(&mesh);

        let ys: Vec<f32> = mesh.vertices.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (y.abs() - 1.0).abs() < 1e-6));
    }

    #[test]
    fn cylinder_triangles_face_outward() {
        let mesh = cylinder(1.0, 2.0, 12);
        let range = |g: IndexGroup| g.start as usize..(g.start + g.count) as usize;
        for tri in mesh.indices[range(mesh.groups[1])].chunks(3) {
            assert!(triangle_normal(&mesh, tri).y > 0.0);
        }
        for tri in mesh.indices[range(mesh.groups[2])].chunks(3) {
            assert!(triangle_normal(&mesh, tri).y < 0.0);
        }
        for tri in mesh.indices[range(mesh.groups[0])].chunks(3) {
            let centroid: Vec3 = tri
                .iter()
                .map(|&i| Vec3::from(mesh.vertices[i as usize].position))
                .sum::<Vec3>()
                / 3.0;
            let outward = Vec3::new(centroid.x, 0.0, centroid.z);
            assert!(triangle_normal(&mesh, tri).dot(outward) > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_on_radius_with_unit_normals() {
        let mesh = sphere(0.3, 16, 16);
        assert_eq!(mesh.vertices.len(), 17 * 17);
        // two pole rows emit one triangle per quad
        assert_eq!(mesh.indices.len(), (16 * 16 * 2 - 2 * 16) * 3);
        assert_groups_cover(&mesh);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 0.3).abs() < 1e-5);
            assert!((Vec3::from(v.normal).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn segment_and_billboard() {
        let line = generate(&GeometryDesc::Segment {
            start: Vec3::ZERO,
            end: Vec3::new(4.0, 0.0, 0.0),
        });
        assert_eq!(line.topology, Topology::Lines);
        assert_eq!(line.indices, vec![0, 1]);

        let quad = generate(&GeometryDesc::Billboard);
        assert_eq!(quad.vertices.len(), 4);
        assert_groups_cover(&quad);
        assert!(triangle_normal(&quad, &quad.indices[..3]).z > 0.0);
    }
}
