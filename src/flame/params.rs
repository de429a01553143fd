//! Flame parameter state
//!
//! The single source of truth for everything the flame shader reads. The
//! frame updater writes time and pivot, the tuning panel writes colors and
//! falloff bands, and the render engine only ever takes a [`FlameUniform`]
//! snapshot of it.

use cgmath::{Vector3, Zero};

use crate::assets::TextureHandle;

/// Color presets for the flame effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlameVariant {
    #[default]
    Cyan,
    Red,
}

impl FlameVariant {
    /// Default flame color for this variant, linear RGB in [0, 1].
    pub fn flame_color(self) -> [f32; 3] {
        match self {
            FlameVariant::Cyan => [0.2, 0.85, 1.0],
            FlameVariant::Red => [1.0, 0.25, 0.1],
        }
    }
}

/// A `[start, end]` interval of normalized distance.
///
/// `start <= end` is expected but not enforced here; see
/// [`crate::flame::shading::band_t`] for how inverted or empty bands evaluate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FalloffBand {
    pub start: f32,
    pub end: f32,
}

impl FalloffBand {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// True when the band has no usable width (evaluates as a hard step).
    pub fn is_degenerate(&self) -> bool {
        let span = self.end - self.start;
        !(span > 0.0 && span.is_finite())
    }

    /// Replaces `start`, swapping the bounds if the result would be inverted.
    pub fn ordered_with_start(self, start: f32) -> Self {
        Self::ordered(start, self.end)
    }

    /// Replaces `end`, swapping the bounds if the result would be inverted.
    pub fn ordered_with_end(self, end: f32) -> Self {
        Self::ordered(self.start, end)
    }

    fn ordered(a: f32, b: f32) -> Self {
        if a <= b {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }
}

/// Controls how world position is projected onto the scrolling noise texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSettings {
    /// World units to noise UV units.
    pub scale: f32,
    /// Upward scroll rate in UV units per second.
    pub scroll_speed: f32,
    /// Amplitude of the distance perturbation.
    pub strength: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            scale: 0.8,
            scroll_speed: 0.25,
            strength: 0.12,
        }
    }
}

/// GPU uniform data for the flame material
///
/// MUST match the `FlameUniform` struct in `flame.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlameUniform {
    pub pivot_position: [f32; 3],
    pub elapsed_time: f32,
    pub flame_color: [f32; 3],
    pub opacity: f32,
    pub diffuse_color: [f32; 3],
    pub falloff_radius: f32,
    pub alpha_falloff: [f32; 2],
    pub flame_falloff: [f32; 2],
    pub noise_scale: f32,
    pub noise_scroll_speed: f32,
    pub noise_strength: f32,
    _padding: f32,
}
// Total: 16 + 16 + 16 + 16 + 16 = 80 bytes

/// Every input of the flame shader, in shader-ready form
#[derive(Debug, Clone)]
pub struct ParameterState {
    pivot_position: Vector3<f32>,
    elapsed_time: f32,
    flame_color: [f32; 3],
    alpha_falloff: FalloffBand,
    flame_falloff: FalloffBand,
    matcap_texture: Option<TextureHandle>,
    noise_texture: Option<TextureHandle>,
    diffuse_color: [f32; 3],
    opacity: f32,
    falloff_radius: f32,
    noise: NoiseSettings,
}

impl Default for ParameterState {
    fn default() -> Self {
        Self::new(FlameVariant::default())
    }
}

impl ParameterState {
    /// Creates the state with the defaults of the given variant baked in.
    pub fn new(variant: FlameVariant) -> Self {
        Self {
            pivot_position: Vector3::zero(),
            elapsed_time: 0.0,
            flame_color: variant.flame_color(),
            alpha_falloff: FalloffBand::new(0.5, 0.62),
            flame_falloff: FalloffBand::new(0.45, 0.48),
            matcap_texture: None,
            noise_texture: None,
            diffuse_color: [1.0, 1.0, 1.0],
            opacity: 1.0,
            falloff_radius: 2.0,
            noise: NoiseSettings::default(),
        }
    }

    pub fn pivot_position(&self) -> Vector3<f32> {
        self.pivot_position
    }

    pub fn set_pivot_position(&mut self, position: Vector3<f32>) {
        self.pivot_position = position;
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    pub fn set_elapsed_time(&mut self, seconds: f32) {
        self.elapsed_time = seconds;
    }

    pub fn flame_color(&self) -> [f32; 3] {
        self.flame_color
    }

    pub fn set_flame_color(&mut self, color: [f32; 3]) {
        self.flame_color = color;
    }

    pub fn alpha_falloff(&self) -> FalloffBand {
        self.alpha_falloff
    }

    pub fn set_alpha_falloff(&mut self, band: FalloffBand) {
        self.alpha_falloff = band;
    }

    pub fn flame_falloff(&self) -> FalloffBand {
        self.flame_falloff
    }

    pub fn set_flame_falloff(&mut self, band: FalloffBand) {
        self.flame_falloff = band;
    }

    pub fn matcap_texture(&self) -> Option<TextureHandle> {
        self.matcap_texture
    }

    pub fn set_matcap_texture(&mut self, handle: Option<TextureHandle>) {
        self.matcap_texture = handle;
    }

    pub fn noise_texture(&self) -> Option<TextureHandle> {
        self.noise_texture
    }

    pub fn set_noise_texture(&mut self, handle: Option<TextureHandle>) {
        self.noise_texture = handle;
    }

    /// Both textures have been supplied by the asset loader.
    pub fn has_textures(&self) -> bool {
        self.matcap_texture.is_some() && self.noise_texture.is_some()
    }

    pub fn diffuse_color(&self) -> [f32; 3] {
        self.diffuse_color
    }

    pub fn set_diffuse_color(&mut self, color: [f32; 3]) {
        self.diffuse_color = color;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    /// World distance that maps to normalized distance 1.0.
    pub fn falloff_radius(&self) -> f32 {
        self.falloff_radius
    }

    pub fn set_falloff_radius(&mut self, radius: f32) {
        self.falloff_radius = radius;
    }

    pub fn noise(&self) -> NoiseSettings {
        self.noise
    }

    pub fn set_noise(&mut self, noise: NoiseSettings) {
        self.noise = noise;
    }

    /// Packs the current values for upload. No transformation happens on the
    /// GPU side beyond what the shader contract describes.
    pub fn snapshot(&self) -> FlameUniform {
        FlameUniform {
            pivot_position: self.pivot_position.into(),
            elapsed_time: self.elapsed_time,
            flame_color: self.flame_color,
            opacity: self.opacity,
            diffuse_color: self.diffuse_color,
            falloff_radius: self.falloff_radius,
            alpha_falloff: [self.alpha_falloff.start, self.alpha_falloff.end],
            flame_falloff: [self.flame_falloff.start, self.flame_falloff.end],
            noise_scale: self.noise.scale,
            noise_scroll_speed: self.noise.scroll_speed,
            noise_strength: self.noise.strength,
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        assert_eq!(size_of::<FlameUniform>(), 80);
        assert_eq!(offset_of!(FlameUniform, elapsed_time), 12);
        assert_eq!(offset_of!(FlameUniform, flame_color), 16);
        assert_eq!(offset_of!(FlameUniform, diffuse_color), 32);
        assert_eq!(offset_of!(FlameUniform, falloff_radius), 44);
        assert_eq!(offset_of!(FlameUniform, alpha_falloff), 48);
        assert_eq!(offset_of!(FlameUniform, flame_falloff), 56);
        assert_eq!(offset_of!(FlameUniform, noise_scale), 64);
    }

    #[test]
    fn test_snapshot_carries_every_field() {
        let mut state = ParameterState::new(FlameVariant::Red);
        state.set_pivot_position(Vector3::new(1.0, 2.0, 3.0));
        state.set_elapsed_time(4.5);
        state.set_alpha_falloff(FalloffBand::new(0.1, 0.9));
        state.set_opacity(0.5);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.pivot_position, [1.0, 2.0, 3.0]);
        assert_eq!(snapshot.elapsed_time, 4.5);
        assert_eq!(snapshot.flame_color, FlameVariant::Red.flame_color());
        assert_eq!(snapshot.alpha_falloff, [0.1, 0.9]);
        assert_eq!(snapshot.flame_falloff, [0.45, 0.48]);
        assert_eq!(snapshot.opacity, 0.5);
    }

    #[test]
    fn test_setters_accept_out_of_range_values() {
        let mut state = ParameterState::default();
        state.set_flame_falloff(FalloffBand::new(1.5, -0.2));
        assert_eq!(state.flame_falloff(), FalloffBand::new(1.5, -0.2));
        assert!(state.flame_falloff().is_degenerate());
    }

    #[test]
    fn test_ordered_band_setters_swap_inverted_input() {
        let band = FalloffBand::new(0.2, 0.6);
        assert_eq!(band.ordered_with_start(0.8), FalloffBand::new(0.6, 0.8));
        assert_eq!(band.ordered_with_end(0.1), FalloffBand::new(0.1, 0.2));
        assert_eq!(band.ordered_with_end(0.7), FalloffBand::new(0.2, 0.7));
    }

    #[test]
    fn test_textures_start_unset() {
        let state = ParameterState::default();
        assert!(!state.has_textures());
        assert!(state.matcap_texture().is_none());
    }
}
