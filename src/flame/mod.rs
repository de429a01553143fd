//! Procedural flame effect
//!
//! [`ParameterState`] holds every shader input, [`FrameUpdater`] advances
//! time and pivot each frame, and [`shading`] is the CPU reference of what
//! `flame.wgsl` computes from them.

pub mod noise;
pub mod params;
pub mod shading;
pub mod tuning;
pub mod updater;

pub use noise::NoiseField;
pub use params::{FalloffBand, FlameUniform, FlameVariant, NoiseSettings, ParameterState};
pub use tuning::{ColorField, ScalarField, TunableField};
pub use updater::{FrameClock, FrameStats, FrameUpdater, InstantClock, TrackedTransform};
