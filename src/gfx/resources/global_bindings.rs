//! Global uniform bindings for camera data
//!
//! Manages the uniform buffer and bind group for per-frame state shared by
//! every object in the scene. Bound to slot 0 in all scene pipelines.

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<CameraUniform>;

/// Updates the global uniform buffer with new camera data
pub fn update_global_ubo(ubo: &mut GlobalUBO, queue: &wgpu::Queue, camera: CameraUniform) {
    ubo.update_content(queue, camera);
}

/// Layout and bind group for the global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    /// Creates the layout and binds `ubo` to it
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    /// Used when creating render pipelines that need access to global uniforms.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
