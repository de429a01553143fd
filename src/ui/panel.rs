// src/ui/panel.rs
//! Tuning panel
//!
//! Live editor for the flame parameters, the background and the bloom pass.
//! Every flame edit goes through [`ScalarField`] / [`ColorField`], so band
//! edges auto-swap here and never in the shader.

use cgmath::Vector3;

use crate::assets::{AssetSource, TextureRole};
use crate::flame::{
    shading::{self, FlameSample},
    ColorField, FrameStats, NoiseField, ParameterState, ScalarField,
};
use crate::gfx::rendering::BloomSettings;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Values the panel edits that live outside [`ParameterState`]
pub struct PanelTargets<'a> {
    pub params: &'a mut ParameterState,
    pub bloom: &'a mut BloomSettings,
    pub clear_color: &'a mut [f32; 3],
}

/// Read-only values the panel displays
pub struct PanelReadouts<'a> {
    pub noise: Option<&'a NoiseField>,
    pub stats: FrameStats,
    pub textures: &'a [(TextureRole, AssetSource)],
}

/// Panel-local state kept between frames
#[derive(Debug, Clone, PartialEq)]
pub struct TuningPanel {
    /// Normalized distance shown by the preview readout
    pub preview_distance: f32,
}

impl Default for TuningPanel {
    fn default() -> Self {
        Self {
            preview_distance: 0.46,
        }
    }
}

impl TuningPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the panel; edits land in `targets` immediately
    pub fn draw(
        &mut self,
        ui: &imgui::Ui,
        targets: PanelTargets<'_>,
        readouts: &PanelReadouts<'_>,
    ) {
        let display_size = ui.io().display_size;
        if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
            return;
        }
        let panel_width = (display_size[0] * 0.28).clamp(320.0, 420.0);

        let PanelTargets {
            params,
            bloom,
            clear_color,
        } = targets;

        ui.window("Flame Tuning")
            .size([panel_width, display_size[1] * 0.8], imgui::Condition::FirstUseEver)
            .position([20.0, 20.0], imgui::Condition::FirstUseEver)
            .resizable(true)
            .collapsible(true)
            .build(|| {
                if ui.collapsing_header("Scene", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                    ui.color_edit3("Background Color", clear_color);
                    for (role, source) in readouts.textures {
                        ui.text(texture_line(*role, source));
                    }
                }

                if ui.collapsing_header("Sphere", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                    color_field(ui, params, ColorField::FlameColor);
                    ui.separator();
                    scalar_fields(ui, params, &ScalarField::FALLOFFS[..2]);
                    ui.separator();
                    scalar_fields(ui, params, &ScalarField::FALLOFFS[2..]);
                }

                if ui.collapsing_header("Surface", imgui::TreeNodeFlags::empty()) {
                    color_field(ui, params, ColorField::DiffuseColor);
                    scalar_fields(ui, params, &ScalarField::SHAPING);
                }

                if ui.collapsing_header("Postprocess - Bloom", imgui::TreeNodeFlags::DEFAULT_OPEN)
                {
                    bloom_controls(ui, bloom);
                }

                if ui.collapsing_header("Preview", imgui::TreeNodeFlags::empty()) {
                    self.preview(ui, params, readouts.noise);
                }

                ui.separator();
                ui.text(format!(
                    "t = {:.2}s  frame {}",
                    params.elapsed_time(),
                    readouts.stats.frame_count
                ));
                let pivot = params.pivot_position();
                ui.text(format!(
                    "pivot ({:.2}, {:.2}, {:.2})",
                    pivot.x, pivot.y, pivot.z
                ));
            });
    }

    fn preview(&mut self, ui: &imgui::Ui, params: &ParameterState, noise: Option<&NoiseField>) {
        ui.slider("Distance", 0.0, 1.0, &mut self.preview_distance);

        let flat = shading::shade(params, self.preview_distance, WHITE);
        sample_readout(ui, "flat", flat);

        if let Some(noise) = noise {
            let noisy = preview_with_noise(params, noise, self.preview_distance);
            sample_readout(ui, "with noise", noisy);
        }
    }
}

/// Shades the point at `distance` falloff radii along +x from the pivot
pub fn preview_with_noise(params: &ParameterState, noise: &NoiseField, distance: f32) -> FlameSample {
    let offset = Vector3::new(distance * params.falloff_radius(), 0.0, 0.0);
    shading::evaluate(params, params.pivot_position() + offset, noise, WHITE)
}

fn texture_line(role: TextureRole, source: &AssetSource) -> String {
    format!("{} texture: {}", role.label(), source.describe())
}

fn sample_readout(ui: &imgui::Ui, label: &str, sample: FlameSample) {
    let [r, g, b] = sample.rgb;
    ui.color_button(format!("##{label}"), [r, g, b, sample.alpha]);
    ui.same_line();
    ui.text(format!(
        "{label}: rgb ({r:.2}, {g:.2}, {b:.2}) alpha {:.2}",
        sample.alpha
    ));
}

fn color_field(ui: &imgui::Ui, params: &mut ParameterState, field: ColorField) {
    let mut color = field.read(params);
    if ui.color_edit3(field.label(), &mut color) {
        field.write(params, color);
    }
}

fn scalar_fields(ui: &imgui::Ui, params: &mut ParameterState, fields: &[ScalarField]) {
    for &field in fields {
        let descriptor = field.descriptor();
        let mut value = field.read(params);
        if ui.slider(descriptor.label, descriptor.min, descriptor.max, &mut value) {
            field.write(params, value);
        }
    }
}

fn bloom_controls(ui: &imgui::Ui, bloom: &mut BloomSettings) {
    ui.checkbox("Enabled", &mut bloom.enabled);
    ui.separator();
    ui.slider("Threshold", 0.0, 1.0, &mut bloom.threshold);
    ui.slider("Strength", 0.0, 3.0, &mut bloom.strength);
    ui.slider("Radius", 0.0, 1.0, &mut bloom.radius);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetSource, TextureRole};
use crate::flame::{FalloffBand, FlameVariant, NoiseSettings};

    fn flat_noise() -> NoiseField {
        NoiseField::from_luma8(2, 2, &[128; 4]).unwrap()
    }

    #[test]
    fn test_preview_without_perturbation_matches_flat_shade() {
        let mut params = ParameterState::new(FlameVariant::Red);
        params.set_noise(NoiseSettings {
            strength: 0.0,
            ..params.noise()
        });

        for d in [0.0, 0.3, 0.46, 0.9] {
            let noisy = preview_with_noise(&params, &flat_noise(), d);
            let flat = shading::shade(&params, d, WHITE);
            assert!((noisy.alpha - flat.alpha).abs() < 1e-5, "d = {d}");
        }
    }

    #[test]
    fn test_preview_follows_pivot() {
        let mut params = ParameterState::new(FlameVariant::Cyan);
        params.set_flame_falloff(FalloffBand::new(0.45, 0.48));
        params.set_pivot_position(Vector3::new(2.0, 0.5, -1.0));
        params.set_noise(NoiseSettings {
            strength: 0.0,
            ..params.noise()
        });

        let sample = preview_with_noise(&params, &flat_noise(), 0.6);
        for (got, want) in sample.rgb.iter().zip(params.flame_color()) {
            assert!((got - want).abs() < 1e-5);
        }
    }

    #[test]
    fn test_texture_line_names_role_and_source() {
        let source = AssetSource::File("assets/noise.png".into());
        assert_eq!(texture_line(TextureRole::Noise, &source), "Noise texture: noise.png");
        assert_eq!(
            texture_line(TextureRole::Matcap, &AssetSource::Procedural),
            "Matcap texture: procedural"
        );
    }

    #[test]
    fn test_default_preview_distance_in_range() {
        let panel = TuningPanel::new();
        assert!((0.0..=1.0).contains(&panel.preview_distance));
    }
}
