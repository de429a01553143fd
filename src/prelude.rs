//! # Flamesphere Prelude
//!
//! Commonly used types in one import:
//!
//! ```no_run
//! use flamesphere::prelude::*;
//!
//! let mut params = ParameterState::new(FlameVariant::Red);
//! params.set_alpha_falloff(FalloffBand::new(0.5, 0.62));
//! ```

// Application
pub use crate::app::{run, FlameApp};
pub use crate::config::{AppConfig, SceneConfig};

// Flame core
pub use crate::flame::{
    FalloffBand, FlameUniform, FlameVariant, FrameUpdater, NoiseField, NoiseSettings,
    ParameterState, TrackedTransform,
};

// Scene and rendering
pub use crate::gfx::camera::CameraManager;
pub use crate::gfx::rendering::{BloomSettings, RenderEngine};
pub use crate::gfx::scene::{Object, RenderStyle, Scene};

// Common external types
pub use cgmath::{InnerSpace, Vector3, Zero};
