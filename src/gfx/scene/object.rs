use std::ops::Range;

use cgmath::{Matrix4, Vector3};
use wgpu::util::DeviceExt;
use wgpu::Device;

use super::vertex::Vertex3D;
use crate::gfx::geometry::GeometryData;
use crate::gfx::picking::AABB;
use crate::wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc, UniformBuffer};

/// How an object is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// Unlit line list in the object's color
    Wireframe,
    /// Translucent triangles through the flame material
    Flame,
}

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let index_count = indices.len() as u32;
        Self {
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(vertices, indices)
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    fn init_gpu_resources(&mut self, device: &Device, label: &str) {
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

/// Per-object uniform, bound at group 1.
///
/// MUST match the `ObjectUniform` struct in the scene shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

struct ObjectGpuResources {
    uniform: UniformBuffer<ObjectUniform>,
    bind_group: wgpu::BindGroup,
}

pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub position: Vector3<f32>,
    pub scale: f32,
    pub color: [f32; 4],
    pub visible: bool,
    pub style: RenderStyle,
    local_bounds: AABB,
    gpu_resources: Option<ObjectGpuResources>,
}

impl Object {
    /// Builds an object from generated geometry, placed at the origin.
    pub fn from_geometry(name: &str, geometry: &GeometryData, style: RenderStyle) -> Self {
        Self {
            name: name.to_string(),
            meshes: vec![Mesh::from_geometry(geometry)],
            position: Vector3::new(0.0, 0.0, 0.0),
            scale: 1.0,
            color: [1.0, 1.0, 1.0, 1.0],
            visible: true,
            style,
            local_bounds: AABB::from_vertices(&geometry.vertices),
            gpu_resources: None,
        }
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    /// Model matrix: translation after uniform scale
    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position) * Matrix4::from_scale(self.scale)
    }

    pub fn world_bounds(&self) -> AABB {
        self.local_bounds.transform(&self.transform())
    }

    fn uniform(&self) -> ObjectUniform {
        ObjectUniform {
            model: self.transform().into(),
            color: self.color,
        }
    }

    /// Uploads meshes and creates the per-object bind group against the
    /// shared object layout.
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &BindGroupLayoutWithDesc) {
        for mesh in self.meshes.iter_mut() {
            mesh.init_gpu_resources(device, &self.name);
        }

        let uniform = UniformBuffer::new_with_data(device, &self.uniform());
        let bind_group = BindGroupBuilder::new(layout)
            .resource(uniform.binding_resource())
            .create(device, &format!("{} Object Bind Group", self.name));

        self.gpu_resources = Some(ObjectGpuResources {
            uniform,
            bind_group,
        });
        log::debug!("GPU resources ready for object '{}'", self.name);
    }

    /// Syncs transform and color to the GPU if resources exist
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        let content = self.uniform();
        if let Some(gpu) = &mut self.gpu_resources {
            gpu.uniform.update_content(queue, content);
        }
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|res| &res.bind_group)
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    /// Binds the object's group 1 and draws all meshes.
    fn draw_object(&mut self, object: &'a Object);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // not uploaded yet
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }

    fn draw_object(&mut self, object: &'b Object) {
        let Some(bind_group) = object.bind_group() else {
            return;
        };
        self.set_bind_group(1, bind_group, &[]);
        for mesh in &object.meshes {
            self.draw_mesh(mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{generate_cube, generate_wire_cube};

    #[test]
    fn test_object_uniform_layout() {
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 80);
    }

    #[test]
    fn test_world_bounds_follow_position_and_scale() {
        let object = Object::from_geometry("box", &generate_cube(1.0), RenderStyle::Wireframe)
            .with_scale(0.35)
            .with_position(Vector3::new(2.0, 0.5, -1.0));

        let bounds = object.world_bounds();
        assert!((bounds.center() - Vector3::new(2.0, 0.5, -1.0)).x.abs() < 1e-6);
        assert!((bounds.max.x - bounds.min.x - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_mesh_from_wire_geometry_uses_line_indices() {
        let mesh = Mesh::from_geometry(&generate_wire_cube(1.0));
        assert_eq!(mesh.vertices().len(), 24);
        assert_eq!(mesh.index_count(), 60);
    }
}
