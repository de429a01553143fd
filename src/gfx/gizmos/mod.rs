//! # Gizmo System
//!
//! Direct-manipulation controls drawn into the scene. The only gizmo is the
//! [`TranslateGizmo`], which drags the tracked box and reports
//! [`GizmoEvent`]s so the orbit camera can be paused while dragging.

pub mod translate_gizmo;

pub use translate_gizmo::{GizmoEvent, TranslateGizmo};
