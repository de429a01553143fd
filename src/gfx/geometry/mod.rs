//! # Procedural Geometry Generation
//!
//! Every mesh in the scene is generated here: the box, its wireframe edges and
//! the flame sphere. No model files are loaded.

pub mod primitives;

pub use primitives::*;

/// Generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding), or line pairs for edge lists
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Converts to the interleaved vertex format used by the renderer
    pub fn to_scene_format(&self) -> (Vec<crate::gfx::scene::vertex::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::vertex::Vertex3D;

        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex3D {
                position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}
