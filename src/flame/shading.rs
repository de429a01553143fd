//! CPU reference of the flame fragment stage
//!
//! `flame.wgsl` evaluates exactly these steps per fragment. Keeping the same
//! math here lets the falloff behaviour be tested without a GPU and lets the
//! tuning panel preview a band before it reaches the screen.
//!
//! Per surface point:
//! 1. `d` = distance to the pivot divided by the falloff radius
//! 2. `d'` = `d` plus a signed perturbation from the scrolling noise field
//! 3. alpha = `opacity * (1 - band_t(d', alpha_falloff))`
//! 4. rgb = `mix(matcap * diffuse, flame_color, band_t(d', flame_falloff))`

use cgmath::{InnerSpace, Vector2, Vector3};

use super::{
    noise::NoiseField,
    params::{FalloffBand, NoiseSettings, ParameterState},
};

/// Shaded output of one surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlameSample {
    pub rgb: [f32; 3],
    pub alpha: f32,
}

/// Interpolation factor of `x` across `band`, in [0, 1].
///
/// A band with no positive width is a hard step at `band.start`: 0 below it,
/// 1 at or above it. NaN input evaluates to 0.
pub fn band_t(x: f32, band: FalloffBand) -> f32 {
    if x.is_nan() {
        return 0.0;
    }
    if band.is_degenerate() {
        return if x < band.start { 0.0 } else { 1.0 };
    }
    ((x - band.start) / (band.end - band.start)).clamp(0.0, 1.0)
}

/// Distance from `point` to `pivot` scaled so `radius` maps to 1.0.
pub fn normalized_distance(point: Vector3<f32>, pivot: Vector3<f32>, radius: f32) -> f32 {
    let radius = if radius > 0.0 && radius.is_finite() {
        radius
    } else {
        1.0
    };
    (point - pivot).magnitude() / radius
}

/// Noise texture coordinates for a world position at a given time.
///
/// Projects onto the XY plane and scrolls along V so features rise over time.
pub fn noise_uv(point: Vector3<f32>, elapsed_time: f32, noise: NoiseSettings) -> Vector2<f32> {
    Vector2::new(
        point.x * noise.scale,
        point.y * noise.scale - elapsed_time * noise.scroll_speed,
    )
}

/// Signed distance perturbation from a noise sample in [0, 1].
pub fn noise_perturbation(noise_value: f32, strength: f32) -> f32 {
    (noise_value - 0.5) * strength
}

/// Matcap texture coordinates from a view-space unit normal.
pub fn matcap_uv(view_normal: Vector3<f32>) -> Vector2<f32> {
    Vector2::new(view_normal.x * 0.5 + 0.5, 1.0 - (view_normal.y * 0.5 + 0.5))
}

/// Steps 3 and 4 of the contract for an already perturbed distance.
pub fn shade(state: &ParameterState, perturbed_distance: f32, matcap_rgb: [f32; 3]) -> FlameSample {
    let alpha_t = band_t(perturbed_distance, state.alpha_falloff());
    let flame_t = band_t(perturbed_distance, state.flame_falloff());

    let diffuse = state.diffuse_color();
    let flame = state.flame_color();
    let mut rgb = [0.0; 3];
    for i in 0..3 {
        let base = matcap_rgb[i] * diffuse[i];
        // Lerp form that returns each endpoint exactly at t = 0 and t = 1
        rgb[i] = base * (1.0 - flame_t) + flame[i] * flame_t;
    }

    FlameSample {
        rgb,
        alpha: state.opacity() * (1.0 - alpha_t),
    }
}

/// Full evaluation of one world-space surface point.
pub fn evaluate(
    state: &ParameterState,
    point: Vector3<f32>,
    noise: &NoiseField,
    matcap_rgb: [f32; 3],
) -> FlameSample {
    let d = normalized_distance(point, state.pivot_position(), state.falloff_radius());
    let uv = noise_uv(point, state.elapsed_time(), state.noise());
    let perturbation = noise_perturbation(noise.sample(uv.x, uv.y), state.noise().strength);
    shade(state, d + perturbation, matcap_rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flame::params::FlameVariant;

    const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

    fn state_with_alpha_band(start: f32, end: f32) -> ParameterState {
        let mut state = ParameterState::new(FlameVariant::Cyan);
        state.set_alpha_falloff(FalloffBand::new(start, end));
        state.set_opacity(0.8);
        state
    }

    #[test]
    fn test_alpha_saturates_outside_band() {
        let state = state_with_alpha_band(0.3, 0.7);
        for d in [0.7, 0.71, 0.9, 1.5, 10.0] {
            assert_eq!(shade(&state, d, WHITE).alpha, 0.0, "d = {d}");
        }
        for d in [-1.0, 0.0, 0.1, 0.3] {
            assert_eq!(shade(&state, d, WHITE).alpha, 0.8, "d = {d}");
        }
    }

    #[test]
    fn test_alpha_monotonic_inside_band() {
        let state = state_with_alpha_band(0.3, 0.7);
        let mut previous = shade(&state, 0.3, WHITE).alpha;
        for step in 1..=100 {
            let d = 0.3 + 0.4 * step as f32 / 100.0;
            let alpha = shade(&state, d, WHITE).alpha;
            assert!(alpha <= previous, "alpha rose at d = {d}");
            previous = alpha;
        }
    }

    #[test]
    fn test_zero_width_band_steps_without_nan() {
        let state = state_with_alpha_band(0.4, 0.4);
        assert_eq!(shade(&state, 0.39, WHITE).alpha, 0.8);
        let at_edge = shade(&state, 0.4, WHITE);
        assert!(!at_edge.alpha.is_nan());
        assert_eq!(at_edge.alpha, 0.0);
        assert_eq!(shade(&state, 0.41, WHITE).alpha, 0.0);
    }

    #[test]
    fn test_inverted_band_steps_at_start() {
        let band = FalloffBand::new(0.6, 0.2);
        assert_eq!(band_t(0.5, band), 0.0);
        assert_eq!(band_t(0.6, band), 1.0);
        assert_eq!(band_t(0.9, band), 1.0);
    }

    #[test]
    fn test_nan_distance_is_safe() {
        let state = ParameterState::default();
        let sample = shade(&state, f32::NAN, WHITE);
        assert!(sample.rgb.iter().all(|c| !c.is_nan()));
        assert!(!sample.alpha.is_nan());
    }

    #[test]
    fn test_color_blend_boundaries() {
        let mut state = ParameterState::new(FlameVariant::Red);
        state.set_flame_falloff(FalloffBand::new(0.45, 0.48));
        state.set_diffuse_color([0.5, 0.5, 0.5]);
        let matcap = [0.8, 0.4, 0.2];

        let base = shade(&state, 0.45, matcap);
        assert_eq!(base.rgb, [0.4, 0.2, 0.1]);

        let flame = shade(&state, 0.48, matcap);
        assert_eq!(flame.rgb, FlameVariant::Red.flame_color());
    }

    #[test]
    fn test_default_cyan_reaches_flame_color_at_band_end() {
        let state = ParameterState::new(FlameVariant::Cyan);
        assert_eq!(state.flame_falloff(), FalloffBand::new(0.45, 0.48));
        assert_eq!(shade(&state, 0.48, WHITE).rgb, FlameVariant::Cyan.flame_color());
        assert_eq!(shade(&state, 0.45, WHITE).rgb, state.diffuse_color());
    }

    #[test]
    fn test_color_blend_exact_for_any_surface() {
        let flame_colors = [
            FlameVariant::Cyan.flame_color(),
            FlameVariant::Red.flame_color(),
            [0.3, 0.7, 0.9],
        ];
        let matcaps = [WHITE, [0.8, 0.4, 0.2], [0.1, 0.3, 0.7], [0.33, 0.66, 0.99]];
        let diffuses = [WHITE, [0.5, 0.5, 0.5], [0.9, 0.15, 0.6]];

        for flame_color in flame_colors {
            for diffuse in diffuses {
                let mut state = ParameterState::new(FlameVariant::Cyan);
                state.set_flame_falloff(FalloffBand::new(0.45, 0.48));
                state.set_flame_color(flame_color);
                state.set_diffuse_color(diffuse);

                for matcap in matcaps {
                    let surface = [
                        matcap[0] * diffuse[0],
                        matcap[1] * diffuse[1],
                        matcap[2] * diffuse[2],
                    ];
                    assert_eq!(
                        shade(&state, 0.48, matcap).rgb,
                        flame_color,
                        "flame {flame_color:?} matcap {matcap:?} diffuse {diffuse:?}"
                    );
                    assert_eq!(
                        shade(&state, 0.45, matcap).rgb,
                        surface,
                        "flame {flame_color:?} matcap {matcap:?} diffuse {diffuse:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_normalized_distance_scales_by_radius() {
        let pivot = Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(normalized_distance(Vector3::new(3.0, 0.0, 0.0), pivot, 2.0), 1.0);
        assert_eq!(normalized_distance(pivot, pivot, 2.0), 0.0);
        // Unusable radius falls back to raw distance.
        assert_eq!(normalized_distance(Vector3::new(1.0, 0.5, 0.0), pivot, 0.0), 0.5);
    }

    #[test]
    fn test_noise_uv_scrolls_with_time() {
        let noise = NoiseSettings {
            scale: 2.0,
            scroll_speed: 0.5,
            strength: 0.1,
        };
        let point = Vector3::new(0.25, 0.5, -3.0);
        assert_eq!(noise_uv(point, 0.0, noise), Vector2::new(0.5, 1.0));
        assert_eq!(noise_uv(point, 4.0, noise), Vector2::new(0.5, -1.0));
    }

    #[test]
    fn test_evaluate_without_noise_strength_matches_shade() {
        let mut state = state_with_alpha_band(0.2, 0.6);
        state.set_noise(NoiseSettings {
            strength: 0.0,
            ..NoiseSettings::default()
        });
        let noise = NoiseField::generate(16, 2, 2, 3);
        let point = Vector3::new(0.8, 0.0, 0.0);

        let expected = shade(&state, 0.4, WHITE);
        assert_eq!(evaluate(&state, point, &noise, WHITE), expected);
    }

    #[test]
    fn test_matcap_uv_centers_forward_normal() {
        assert_eq!(matcap_uv(Vector3::new(0.0, 0.0, 1.0)), Vector2::new(0.5, 0.5));
        assert_eq!(matcap_uv(Vector3::new(1.0, 1.0, 0.0)), Vector2::new(1.0, 0.0));
    }
}
