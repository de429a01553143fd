//! # User Interface Module
//!
//! Dear ImGui overlay, only constructed when the app runs with `--debug`.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`TuningPanel`] - live editor for flame, background and bloom settings
//!
//! While the panel wants the mouse, camera and gizmo input is suppressed.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::{Capture, UiManager};
pub use panel::{PanelReadouts, PanelTargets, TuningPanel};
