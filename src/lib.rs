// src/lib.rs
//! Flamesphere
//!
//! A procedural flame shader on a sphere. The flame's falloff is centered on a
//! wireframe box the user drags around, rendered with wgpu and winit.

pub mod app;
pub mod assets;
pub mod config;
pub mod flame;
pub mod gfx;
pub mod prelude;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{run, FlameApp};
pub use config::AppConfig;
