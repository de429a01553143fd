// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles render pipelines, the bloom post-process and frame rendering.

pub mod bloom;
pub mod error;
pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use bloom::{BloomPass, BloomSettings};
pub use error::RenderError;
pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::RenderEngine;
