use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
    keyboard::KeyCode,
};

use super::orbit_camera::OrbitCamera;

/// Mouse-driven orbit, zoom and pan.
///
/// Left drag orbits, shift + left drag pans, the wheel zooms. While disabled
/// (an object is being dragged) button state is still tracked but motion and
/// wheel input leave the camera alone.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    enabled: bool,
    is_shift_held: bool,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            enabled: true,
            is_shift_held: false,
            is_mouse_pressed: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::debug!("orbit controls {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    /// Applies a raw device event. Returns true if the camera moved.
    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
                false
            }
            DeviceEvent::MouseWheel { delta } if self.enabled => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
                true
            }
            DeviceEvent::MouseMotion { delta } if self.enabled && self.is_mouse_pressed => {
                if self.is_shift_held {
                    camera.pan((
                        -delta.0 as f32 * self.pan_speed,
                        delta.1 as f32 * self.pan_speed,
                    ));
                } else {
                    camera.add_yaw(-delta.0 as f32 * self.rotate_speed);
                    camera.add_pitch(delta.1 as f32 * self.rotate_speed);
                }
                true
            }
            _ => false,
        }
    }

    pub fn process_key(&mut self, key: KeyCode, pressed: bool, camera: &mut OrbitCamera) {
        match key {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                self.is_shift_held = pressed;
            }
            KeyCode::KeyC if pressed && self.is_shift_held => {
                log::info!("resetting camera to its initial pose");
                camera.reset_to_default();
            }
            _ => (),
        }
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.enabled && self.is_mouse_pressed && self.is_shift_held
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.enabled && self.is_mouse_pressed && !self.is_shift_held
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::orbit_camera::OrbitPose;
    use cgmath::{Deg, Vector3, Zero};

    fn camera() -> OrbitCamera {
        OrbitCamera::new(
            OrbitPose::looking_at(Vector3::new(0.0, 1.0, 3.0), Vector3::zero()),
            1.0,
            Deg(60.0).into(),
            0.1,
            100.0,
        )
    }

    fn press(controller: &mut CameraController, camera: &mut OrbitCamera, pressed: bool) {
        let state = if pressed {
            ElementState::Pressed
        } else {
            ElementState::Released
        };
        controller.process_events(&DeviceEvent::Button { button: 0, state }, camera);
    }

    #[test]
    fn test_drag_rotates_when_enabled() {
        let mut controller = CameraController::new(0.01, 0.5);
        let mut camera = camera();
        let yaw = camera.yaw;

        press(&mut controller, &mut camera, true);
        let moved = controller
            .process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) }, &mut camera);
        assert!(moved);
        assert!(controller.is_rotating());
        assert_ne!(camera.yaw, yaw);
    }

    #[test]
    fn test_disabled_controller_ignores_motion_and_wheel() {
        let mut controller = CameraController::new(0.01, 0.5);
        let mut camera = camera();
        let (yaw, pitch, distance) = (camera.yaw, camera.pitch, camera.distance);

        press(&mut controller, &mut camera, true);
        controller.set_enabled(false);
        controller.process_events(&DeviceEvent::MouseMotion { delta: (25.0, -8.0) }, &mut camera);
        controller.process_events(
            &DeviceEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(0.0, 3.0),
            },
            &mut camera,
        );

        assert_eq!((camera.yaw, camera.pitch, camera.distance), (yaw, pitch, distance));
        assert!(!controller.is_rotating());
    }

    #[test]
    fn test_release_while_disabled_is_remembered() {
        let mut controller = CameraController::new(0.01, 0.5);
        let mut camera = camera();
        let yaw = camera.yaw;

        press(&mut controller, &mut camera, true);
        controller.set_enabled(false);
        press(&mut controller, &mut camera, false);
        controller.set_enabled(true);

        controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) }, &mut camera);
        assert_eq!(camera.yaw, yaw);
    }

    #[test]
    fn test_shift_drag_pans_target() {
        let mut controller = CameraController::new(0.01, 0.5);
        let mut camera = camera();

        controller.process_key(KeyCode::ShiftLeft, true, &mut camera);
        press(&mut controller, &mut camera, true);
        controller.process_events(&DeviceEvent::MouseMotion { delta: (20.0, 0.0) }, &mut camera);
        assert!(controller.is_panning());
        assert_ne!(camera.target, Vector3::zero());
    }
}
