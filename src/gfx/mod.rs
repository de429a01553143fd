//! # Graphics Module
//!
//! Camera, picking, scene management and the wgpu renderer for the flame
//! sphere.
//!
//! - **Camera System** ([`camera`]) - Orbit camera with mouse and keyboard controls
//! - **Gizmos** ([`gizmos`]) - Drag-to-translate handle for the tracked box
//! - **Picking** ([`picking`]) - Screen rays and bounding boxes
//! - **Rendering Pipeline** ([`rendering`]) - Scene pass, bloom and composite
//! - **Scene Management** ([`scene`]) - Objects, meshes and the tracked transform
//! - **Resource Management** ([`resources`]) - Textures, global uniforms and the flame material

pub mod camera;
pub mod geometry;
pub mod gizmos;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
