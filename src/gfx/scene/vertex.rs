//! # Vertex Data Structures
//!
//! GPU-compatible vertex format shared by every mesh in the scene.

/// A 3D vertex with position and normal data.
///
/// `#[repr(C)]` keeps the layout stable for vertex buffer uploads. The
/// wireframe pipeline ignores the normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// Unit normal [nx, ny, nz]
    pub normal: [f32; 3],
}

impl Vertex3D {
    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: Position (Float32x3) at shader location 0
    /// - Attribute 1: Normal (Float32x3) at shader location 1
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}
