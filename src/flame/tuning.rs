//! Tunable field descriptors
//!
//! Everything the tuning panel may edit is listed here with a human label and
//! a recommended slider range. Reads and writes go through [`ScalarField`] and
//! [`ColorField`] so the panel never touches [`ParameterState`] internals, and
//! so band edits always pass through the auto-swapping setters.

use super::params::{NoiseSettings, ParameterState};

/// Label and recommended range for one tunable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunableField {
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
}

impl TunableField {
    const fn new(label: &'static str, min: f32, max: f32) -> Self {
        Self { label, min, max }
    }
}

/// Scalar inputs of the flame shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    AlphaFalloffStart,
    AlphaFalloffEnd,
    FlameFalloffStart,
    FlameFalloffEnd,
    Opacity,
    FalloffRadius,
    NoiseScale,
    NoiseScrollSpeed,
    NoiseStrength,
}

impl ScalarField {
    /// The two falloff bands, in panel order.
    pub const FALLOFFS: [ScalarField; 4] = [
        ScalarField::AlphaFalloffStart,
        ScalarField::AlphaFalloffEnd,
        ScalarField::FlameFalloffStart,
        ScalarField::FlameFalloffEnd,
    ];

    /// Surface and noise shaping, in panel order.
    pub const SHAPING: [ScalarField; 5] = [
        ScalarField::Opacity,
        ScalarField::FalloffRadius,
        ScalarField::NoiseScale,
        ScalarField::NoiseScrollSpeed,
        ScalarField::NoiseStrength,
    ];

    pub fn descriptor(self) -> TunableField {
        match self {
            ScalarField::AlphaFalloffStart => TunableField::new("Alpha falloff start", 0.0, 1.0),
            ScalarField::AlphaFalloffEnd => TunableField::new("Alpha falloff end", 0.0, 1.0),
            ScalarField::FlameFalloffStart => TunableField::new("Flame falloff start", 0.0, 1.0),
            ScalarField::FlameFalloffEnd => TunableField::new("Flame falloff end", 0.0, 1.0),
            ScalarField::Opacity => TunableField::new("Opacity", 0.0, 1.0),
            ScalarField::FalloffRadius => TunableField::new("Falloff radius", 0.1, 5.0),
            ScalarField::NoiseScale => TunableField::new("Noise scale", 0.0, 4.0),
            ScalarField::NoiseScrollSpeed => TunableField::new("Noise scroll speed", 0.0, 2.0),
            ScalarField::NoiseStrength => TunableField::new("Noise strength", 0.0, 0.5),
        }
    }

    pub fn read(self, state: &ParameterState) -> f32 {
        let noise = state.noise();
        match self {
            ScalarField::AlphaFalloffStart => state.alpha_falloff().start,
            ScalarField::AlphaFalloffEnd => state.alpha_falloff().end,
            ScalarField::FlameFalloffStart => state.flame_falloff().start,
            ScalarField::FlameFalloffEnd => state.flame_falloff().end,
            ScalarField::Opacity => state.opacity(),
            ScalarField::FalloffRadius => state.falloff_radius(),
            ScalarField::NoiseScale => noise.scale,
            ScalarField::NoiseScrollSpeed => noise.scroll_speed,
            ScalarField::NoiseStrength => noise.strength,
        }
    }

    /// Writes `value`; band edges that cross the opposite edge swap with it.
    pub fn write(self, state: &mut ParameterState, value: f32) {
        let noise = state.noise();
        match self {
            ScalarField::AlphaFalloffStart => {
                state.set_alpha_falloff(state.alpha_falloff().ordered_with_start(value))
            }
            ScalarField::AlphaFalloffEnd => {
                state.set_alpha_falloff(state.alpha_falloff().ordered_with_end(value))
            }
            ScalarField::FlameFalloffStart => {
                state.set_flame_falloff(state.flame_falloff().ordered_with_start(value))
            }
            ScalarField::FlameFalloffEnd => {
                state.set_flame_falloff(state.flame_falloff().ordered_with_end(value))
            }
            ScalarField::Opacity => state.set_opacity(value),
            ScalarField::FalloffRadius => state.set_falloff_radius(value),
            ScalarField::NoiseScale => state.set_noise(NoiseSettings {
                scale: value,
                ..noise
            }),
            ScalarField::NoiseScrollSpeed => state.set_noise(NoiseSettings {
                scroll_speed: value,
                ..noise
            }),
            ScalarField::NoiseStrength => state.set_noise(NoiseSettings {
                strength: value,
                ..noise
            }),
        }
    }
}

/// RGB inputs of the flame shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorField {
    FlameColor,
    DiffuseColor,
}

impl ColorField {
    pub fn label(self) -> &'static str {
        match self {
            ColorField::FlameColor => "Flame Color",
            ColorField::DiffuseColor => "Diffuse Color",
        }
    }

    pub fn read(self, state: &ParameterState) -> [f32; 3] {
        match self {
            ColorField::FlameColor => state.flame_color(),
            ColorField::DiffuseColor => state.diffuse_color(),
        }
    }

    pub fn write(self, state: &mut ParameterState, color: [f32; 3]) {
        match self {
            ColorField::FlameColor => state.set_flame_color(color),
            ColorField::DiffuseColor => state.set_diffuse_color(color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flame::params::FalloffBand;

    #[test]
    fn test_falloff_descriptors_use_unit_range() {
        for field in ScalarField::FALLOFFS {
            let descriptor = field.descriptor();
            assert_eq!((descriptor.min, descriptor.max), (0.0, 1.0), "{:?}", field);
        }
    }

    #[test]
    fn test_read_write_roundtrip_for_shaping_fields() {
        let mut state = ParameterState::default();
        for field in ScalarField::SHAPING {
            field.write(&mut state, 0.3);
            assert_eq!(field.read(&state), 0.3, "{:?}", field);
        }
    }

    #[test]
    fn test_band_edits_keep_start_below_end() {
        let mut state = ParameterState::default();
        state.set_alpha_falloff(FalloffBand::new(0.2, 0.6));

        ScalarField::AlphaFalloffStart.write(&mut state, 0.9);
        let band = state.alpha_falloff();
        assert!(band.start <= band.end);
        assert_eq!(band, FalloffBand::new(0.6, 0.9));

        ScalarField::AlphaFalloffEnd.write(&mut state, 0.1);
        let band = state.alpha_falloff();
        assert!(band.start <= band.end);
        assert_eq!(band, FalloffBand::new(0.1, 0.6));
    }

    #[test]
    fn test_flame_band_edit_does_not_touch_alpha_band() {
        let mut state = ParameterState::default();
        let alpha = state.alpha_falloff();
        ScalarField::FlameFalloffEnd.write(&mut state, 0.7);
        assert_eq!(state.alpha_falloff(), alpha);
        assert_eq!(state.flame_falloff().end, 0.7);
    }

    #[test]
    fn test_color_fields_write_through() {
        let mut state = ParameterState::default();
        ColorField::FlameColor.write(&mut state, [0.9, 0.1, 0.0]);
        assert_eq!(ColorField::FlameColor.read(&state), [0.9, 0.1, 0.0]);
        assert_eq!(ColorField::DiffuseColor.read(&state), [1.0, 1.0, 1.0]);
    }
}
