//! # Scene Management Module
//!
//! Objects, their GPU-side transforms and the scene container.
//!
//! - [`Scene`] - owns the camera and objects, and reports the tracked box
//!   position to the flame updater
//! - [`Object`] - a mesh with position, scale, color and render style
//! - [`Vertex3D`] - vertex layout shared by every mesh

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawObject, Mesh, Object, ObjectUniform, RenderStyle};
pub use scene::Scene;
pub use vertex::Vertex3D;
