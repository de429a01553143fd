use cgmath::{Matrix4, SquareMatrix};
use winit::{event::DeviceEvent, keyboard::KeyCode};

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

/// Orbit camera plus the controller that drives it from input
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn process_event(&mut self, event: &DeviceEvent) {
        self.controller.process_events(event, &mut self.camera);
    }

    pub fn process_key(&mut self, key: KeyCode, pressed: bool) {
        self.controller.process_key(key, pressed, &mut self.camera);
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

/// Slot 0 of every scene pipeline.
///
/// MUST match `CameraUniform` in `flame.wgsl` and `wireframe.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// Eye position, w = 1 (vec4 for 16 byte alignment)
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],

    /// World to view transform, used for view-space normals.
    pub view: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
            view: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
