//! # Primitive Shape Generation
//!
//! Shapes are centered at the origin with outward normals.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a cube with the given edge length
///
/// Each face has its own four vertices so normals stay flat.
pub fn generate_cube(edge: f32) -> GeometryData {
    let h = edge * 0.5;

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-h, -h,  h], [ h, -h,  h], [ h,  h,  h], [-h,  h,  h],
        // Back face
        [-h, -h, -h], [-h,  h, -h], [ h,  h, -h], [ h, -h, -h],
        // Left face
        [-h, -h, -h], [-h, -h,  h], [-h,  h,  h], [-h,  h, -h],
        // Right face
        [ h, -h,  h], [ h, -h, -h], [ h,  h, -h], [ h,  h,  h],
        // Top face
        [-h,  h,  h], [ h,  h,  h], [ h,  h, -h], [-h,  h, -h],
        // Bottom face
        [-h, -h, -h], [ h, -h, -h], [ h, -h,  h], [-h, -h,  h],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    let mut data = GeometryData::new();
    data.vertices = positions.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|n| std::iter::repeat(*n).take(4))
        .collect();

    // 2 triangles per face, counter-clockwise
    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Line-list indices covering every triangle edge once per triangle pair
///
/// Edges shared by two triangles (referencing the same two indices) are
/// emitted once. The result is meant for a `LineList` topology.
pub fn wireframe_indices(triangle_indices: &[u32]) -> Vec<u32> {
    let mut edges: Vec<(u32, u32)> = Vec::with_capacity(triangle_indices.len());

    for triangle in triangle_indices.chunks_exact(3) {
        for (a, b) in [
            (triangle[0], triangle[1]),
            (triangle[1], triangle[2]),
            (triangle[2], triangle[0]),
        ] {
            let edge = (a.min(b), a.max(b));
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
    }

    edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
}

/// Generate the wireframe of a cube with the given edge length
///
/// Matches a triangulated box drawn in wireframe: the 12 box edges plus one
/// diagonal per face.
pub fn generate_wire_cube(edge: f32) -> GeometryData {
    let mut data = generate_cube(edge);
    data.indices = wireframe_indices(&data.indices);
    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
pub fn generate_sphere(radius: f32, longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32; // 0 to 2*PI
            let (sin_phi, cos_phi) = phi.sin_cos();

            let normal = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            data.vertices
                .push([normal[0] * radius, normal[1] * radius, normal[2] * radius]);
            data.normals.push(normal);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, first + 1, second]);
            data.indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube(0.35);
        assert_eq!(cube.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals.len(), 24);
        for v in &cube.vertices {
            for c in v {
                assert!((c.abs() - 0.175).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_cube_winding_faces_outward() {
        let cube = generate_cube(1.0);
        for tri in cube.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| cube.vertices[i as usize]);
            let face_normal = cross(sub(b, a), sub(c, a));
            assert!(dot(face_normal, cube.normals[tri[0] as usize]) > 0.0);
        }
    }

    #[test]
    fn test_wire_cube_has_edges_and_diagonals() {
        let wire = generate_wire_cube(1.0);
        // 4 sides + 1 diagonal per face
        assert_eq!(wire.indices.len(), 6 * 5 * 2);
    }

    #[test]
    fn test_wireframe_dedupes_shared_edges() {
        let lines = wireframe_indices(&[0, 1, 2, 2, 1, 3]);
        assert_eq!(lines.len(), 5 * 2);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(2.0, 8, 6);
        assert_eq!(sphere.vertices.len(), 9 * 7);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.triangle_count(), 8 * 6 * 2);
        for (v, n) in sphere.vertices.iter().zip(&sphere.normals) {
            assert!((length(*v) - 2.0).abs() < 1e-5);
            assert!((length(*n) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_winding_faces_outward() {
        let sphere = generate_sphere(1.0, 12, 8);
        for tri in sphere.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| sphere.vertices[i as usize]);
            let face_normal = cross(sub(b, a), sub(c, a));
            if length(face_normal) < 1e-6 {
                continue; // collapsed triangle at a pole
            }
            let centroid = [
                (a[0] + b[0] + c[0]) / 3.0,
                (a[1] + b[1] + c[1]) / 3.0,
                (a[2] + b[2] + c[2]) / 3.0,
            ];
            assert!(dot(face_normal, centroid) > 0.0);
        }
    }
}
