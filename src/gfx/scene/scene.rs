use cgmath::Vector3;
use wgpu::Device;

use crate::flame::TrackedTransform;
use crate::gfx::{
    camera::camera_utils::CameraManager,
    geometry::{generate_sphere, generate_wire_cube},
    scene::object::{Object, RenderStyle},
};
use crate::wgpu_utils::BindGroupLayoutWithDesc;

const SPHERE_LONGITUDE_SEGMENTS: u32 = 64;
const SPHERE_LATITUDE_SEGMENTS: u32 = 32;

/// Main scene containing objects and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    tracked: Option<usize>,
}

impl Scene {
    /// Creates an empty scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            tracked: None,
        }
    }

    /// Creates the flame scene: a white wireframe box the user drags around
    /// and the flame sphere centered at the origin.
    ///
    /// The box is tracked, so its position becomes the flame pivot.
    pub fn flame_scene(camera_manager: CameraManager, box_edge: f32, sphere_radius: f32) -> Self {
        let mut scene = Self::new(camera_manager);

        let sphere = Object::from_geometry(
            "Flame Sphere",
            &generate_sphere(
                sphere_radius,
                SPHERE_LONGITUDE_SEGMENTS,
                SPHERE_LATITUDE_SEGMENTS,
            ),
            RenderStyle::Flame,
        );
        scene.add_object(sphere);

        let wire_box = Object::from_geometry("Box", &generate_wire_cube(1.0), RenderStyle::Wireframe)
            .with_scale(box_edge);
        let box_index = scene.add_object(wire_box);
        scene.set_tracked(Some(box_index));

        scene
    }

    /// Adds an object and returns its index
    pub fn add_object(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn set_tracked(&mut self, index: Option<usize>) {
        self.tracked = index;
    }

    pub fn tracked_object(&self) -> Option<&Object> {
        self.tracked.and_then(|i| self.objects.get(i))
    }

    pub fn tracked_object_mut(&mut self) -> Option<&mut Object> {
        self.tracked.and_then(|i| self.objects.get_mut(i))
    }

    /// Visible objects drawn with the given style
    pub fn objects_with_style(&self, style: RenderStyle) -> impl Iterator<Item = &Object> {
        self.objects
            .iter()
            .filter(move |o| o.visible && o.style == style)
    }

    /// Updates the scene (camera matrices)
    pub fn update(&mut self) {
        self.camera_manager.camera.update_view_proj();
    }

    /// Initializes GPU resources for all objects
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(&mut self, device: &Device, object_layout: &BindGroupLayoutWithDesc) {
        for object in self.objects.iter_mut() {
            object.init_gpu_resources(device, object_layout);
        }
    }

    /// Updates all object transforms and syncs to GPU
    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        for object in self.objects.iter_mut() {
            object.update_transform(queue);
        }
    }
}

impl TrackedTransform for Scene {
    fn world_position(&self) -> Option<Vector3<f32>> {
        self.tracked_object()
            .filter(|object| object.visible)
            .map(|object| object.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flame::{FlameVariant, FrameUpdater, ParameterState};
    use crate::gfx::camera::{CameraController, OrbitCamera, OrbitPose};
    use cgmath::Deg;

    fn scene() -> Scene {
        let camera = OrbitCamera::new(
            OrbitPose::looking_at(Vector3::new(-0.7, 0.8, 3.0), Vector3::new(0.0, 0.0, 0.0)),
            1.5,
            Deg(75.0).into(),
            0.1,
            100.0,
        );
        Scene::flame_scene(
            CameraManager::new(camera, CameraController::new(0.2, 0.2)),
            0.35,
            1.0,
        )
    }

    #[test]
    fn test_flame_scene_tracks_the_box() {
        let scene = scene();
        assert_eq!(scene.objects.len(), 2);
        let tracked = scene.tracked_object().unwrap();
        assert_eq!(tracked.style, RenderStyle::Wireframe);
        assert_eq!(tracked.scale, 0.35);
        assert_eq!(scene.objects_with_style(RenderStyle::Flame).count(), 1);
    }

    #[test]
    fn test_moved_box_becomes_pivot() {
        let mut scene = scene();
        let mut params = ParameterState::new(FlameVariant::Cyan);
        let mut updater = FrameUpdater::new();

        scene
            .tracked_object_mut()
            .unwrap()
            .set_position(Vector3::new(2.0, 0.5, -1.0));
        updater.update(&mut params, &scene);

        assert_eq!(params.pivot_position(), Vector3::new(2.0, 0.5, -1.0));
    }

    #[test]
    fn test_hidden_box_reports_absent() {
        let mut scene = scene();
        scene.tracked_object_mut().unwrap().visible = false;
        assert!(scene.world_position().is_none());

        scene.set_tracked(None);
        assert!(scene.world_position().is_none());
    }
}
