//! Startup configuration
//!
//! Command-line flags are parsed once in `main`; everything else about the
//! scene comes from [`SceneConfig`] defaults.

use std::path::PathBuf;

use cgmath::Vector3;
use clap::{Parser, ValueEnum};

use crate::flame::FlameVariant;

/// Environment variable that also turns the tuning panel on
pub const DEBUG_ENV_VAR: &str = "FLAMESPHERE_DEBUG";

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum VariantArg {
    #[default]
    Cyan,
    Red,
}

impl From<VariantArg> for FlameVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Cyan => FlameVariant::Cyan,
            VariantArg::Red => FlameVariant::Red,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "flamesphere")]
#[command(about = "Animated flame shader on a sphere, anchored to a draggable box", long_about = None)]
#[command(version)]
pub struct AppConfig {
    /// Show the tuning panel
    #[arg(short, long)]
    pub debug: bool,

    /// Matcap image (PNG or JPEG); a procedural one is used if absent
    #[arg(long, value_name = "PATH")]
    pub matcap: Option<PathBuf>,

    /// Tileable noise image (PNG or JPEG); a procedural one is used if absent
    #[arg(long, value_name = "PATH")]
    pub noise: Option<PathBuf>,

    /// Flame color preset
    #[arg(long, value_enum, default_value_t = VariantArg::Cyan)]
    pub variant: VariantArg,

    /// Wait for vertical sync when presenting
    #[arg(long)]
    pub vsync: bool,

    #[arg(skip)]
    pub scene: SceneConfig,
}

impl AppConfig {
    /// Parses process arguments and applies the environment override
    pub fn from_env() -> Self {
        Self::parse().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// `FLAMESPHERE_DEBUG` set to anything but empty, `0` or `false` enables
    /// the panel.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(DEBUG_ENV_VAR) {
            let value = value.trim();
            if !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false")) {
                self.debug = true;
            }
        }
        self
    }

    pub fn flame_variant(&self) -> FlameVariant {
        self.variant.into()
    }
}

/// Fixed scene layout
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub camera_position: Vector3<f32>,
    pub camera_target: Vector3<f32>,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Background as 0xRRGGBB
    pub clear_color: u32,
    pub box_edge: f32,
    pub sphere_radius: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window_width: 1200,
            window_height: 800,
            camera_position: Vector3::new(-0.7, 0.8, 3.0),
            camera_target: Vector3::new(0.0, 0.0, 0.0),
            fov_degrees: 75.0,
            znear: 0.1,
            zfar: 100.0,
            clear_color: 0x121212,
            box_edge: 0.35,
            sphere_radius: 1.0,
        }
    }
}

/// Splits 0xRRGGBB into normalized RGB
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
