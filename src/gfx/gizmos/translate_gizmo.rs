//! # Translate Gizmo
//!
//! Click-and-drag mover for a single object. Pressing on the object's bounds
//! grabs it; moving the pointer slides it across the plane facing the camera
//! through the grab point; releasing drops it.

use cgmath::{InnerSpace, Vector3};

use crate::gfx::picking::Ray;
use crate::gfx::scene::Object;

/// Highlight applied to the dragged object.
const DRAG_HIGHLIGHT: [f32; 4] = [1.0, 0.85, 0.2, 1.0];

/// Drag-state change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoEvent {
    DragStarted,
    DragEnded,
}

impl GizmoEvent {
    pub fn is_dragging(self) -> bool {
        matches!(self, GizmoEvent::DragStarted)
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    plane_point: Vector3<f32>,
    plane_normal: Vector3<f32>,
    /// Object position minus the grab point
    grab_offset: Vector3<f32>,
    idle_color: [f32; 4],
}

#[derive(Debug, Default)]
pub struct TranslateGizmo {
    drag: Option<DragState>,
}

impl TranslateGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Starts a drag when `ray` hits the object's bounds.
    ///
    /// `view_forward` is the camera's viewing direction; the drag plane faces
    /// it. Returns `DragStarted` only on the press that begins a drag.
    pub fn pointer_pressed(
        &mut self,
        ray: &Ray,
        view_forward: Vector3<f32>,
        object: &mut Object,
    ) -> Option<GizmoEvent> {
        if self.drag.is_some() || !object.visible {
            return None;
        }

        let distance = object.world_bounds().intersect_ray(ray)?;
        let grab_point = ray.point_at(distance);

        self.drag = Some(DragState {
            plane_point: grab_point,
            plane_normal: view_forward.normalize(),
            grab_offset: object.position - grab_point,
            idle_color: object.color,
        });
        object.color = DRAG_HIGHLIGHT;

        log::debug!("started dragging '{}'", object.name);
        Some(GizmoEvent::DragStarted)
    }

    /// Moves the dragged object to follow the pointer ray.
    ///
    /// Returns true when the object moved.
    pub fn pointer_moved(&mut self, ray: &Ray, object: &mut Object) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let Some(t) = ray.intersect_plane(drag.plane_point, drag.plane_normal) else {
            return false;
        };

        object.set_position(ray.point_at(t) + drag.grab_offset);
        true
    }

    /// Ends the current drag, restoring the object's color.
    pub fn pointer_released(&mut self, object: &mut Object) -> Option<GizmoEvent> {
        let drag = self.drag.take()?;
        object.color = drag.idle_color;
        log::debug!(
            "dropped '{}' at ({:.3}, {:.3}, {:.3})",
            object.name,
            object.position.x,
            object.position.y,
            object.position.z
        );
        Some(GizmoEvent::DragEnded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_wire_cube;
    use crate::gfx::scene::RenderStyle;

    fn wire_box() -> Object {
        Object::from_geometry("Box", &generate_wire_cube(1.0), RenderStyle::Wireframe)
            .with_scale(0.35)
    }

    fn ray_from_front(x: f32, y: f32) -> Ray {
        Ray::new(Vector3::new(x, y, 5.0), Vector3::new(0.0, 0.0, -1.0))
    }

    fn forward() -> Vector3<f32> {
        Vector3::new(0.0, 0.0, -1.0)
    }

    #[test]
    fn test_press_on_box_starts_drag() {
        let mut gizmo = TranslateGizmo::new();
        let mut object = wire_box();

        assert_eq!(
            gizmo.pointer_pressed(&ray_from_front(0.0, 0.0), forward(), &mut object),
            Some(GizmoEvent::DragStarted)
        );
        assert!(gizmo.is_dragging());
        assert_eq!(object.color, DRAG_HIGHLIGHT);
    }

    #[test]
    fn test_press_off_box_is_ignored() {
        let mut gizmo = TranslateGizmo::new();
        let mut object = wire_box();

        assert!(gizmo
            .pointer_pressed(&ray_from_front(1.0, 1.0), forward(), &mut object)
            .is_none());
        assert!(!gizmo.is_dragging());
    }

    #[test]
    fn test_drag_moves_box_in_view_plane() {
        let mut gizmo = TranslateGizmo::new();
        let mut object = wire_box();

        gizmo.pointer_pressed(&ray_from_front(0.1, 0.0), forward(), &mut object);
        assert!(gizmo.pointer_moved(&ray_from_front(1.1, 0.5), &mut object));

        assert!((object.position - Vector3::new(1.0, 0.5, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_events_fire_once_per_drag() {
        let mut gizmo = TranslateGizmo::new();
        let mut object = wire_box();
        let ray = ray_from_front(0.0, 0.0);

        assert_eq!(
            gizmo.pointer_pressed(&ray, forward(), &mut object),
            Some(GizmoEvent::DragStarted)
        );
        assert!(gizmo.pointer_pressed(&ray, forward(), &mut object).is_none());

        assert_eq!(
            gizmo.pointer_released(&mut object),
            Some(GizmoEvent::DragEnded)
        );
        assert!(gizmo.pointer_released(&mut object).is_none());
        assert_eq!(object.color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_move_without_drag_does_nothing() {
        let mut gizmo = TranslateGizmo::new();
        let mut object = wire_box();
        assert!(!gizmo.pointer_moved(&ray_from_front(1.0, 1.0), &mut object));
        assert_eq!(object.position, Vector3::new(0.0, 0.0, 0.0));
    }
}
