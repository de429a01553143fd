use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Spherical coordinates of the camera around its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub target: Vector3<f32>,
}

impl OrbitPose {
    /// Pose that places the eye at `eye` looking at `target`.
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude();
        let (pitch, yaw) = if distance > f32::EPSILON {
            ((offset.y / distance).clamp(-1.0, 1.0).asin(), offset.x.atan2(offset.z))
        } else {
            (0.0, 0.0)
        };
        Self {
            distance,
            pitch,
            yaw,
            target,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
    home: OrbitPose,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(pose: OrbitPose, aspect: f32, fovy: Rad<f32>, znear: f32, zfar: f32) -> Self {
        let mut camera = Self {
            distance: pose.distance,
            pitch: pose.pitch,
            yaw: pose.yaw,
            eye: Vector3::zero(), // Will be auto-calculated in `update()` nevertheless.
            target: pose.target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy,
            znear,
            zfar,
            uniform: CameraUniform::default(),
            home: pose,
        };
        camera.update();
        camera
    }

    /// Returns to the pose the camera was created with.
    pub fn reset_to_default(&mut self) {
        self.distance = self.home.distance;
        self.pitch = self.home.pitch;
        self.yaw = self.home.yaw;
        self.target = self.home.target;
        self.update();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        // Zoom slows down close to the target.
        let corrected_zoom = self.distance.max(1.1).log10() * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let (right, up) = self.view_plane_axes();

        // Scale pan movement by distance for consistent feel at all zoom levels
        let pan_scale = self.distance * 0.1;
        let movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;

        self.eye += movement;
        self.target += movement;
    }

    /// Unit right and up vectors of the image plane, in world space.
    pub fn view_plane_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();
        (right, up)
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
        self.uniform.view = convert_matrix4_to_array(self.view_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(0.5),
            max_distance: Some(20.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}
