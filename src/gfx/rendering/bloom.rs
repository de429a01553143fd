//! Bloom post-process
//!
//! Four fullscreen passes over the HDR scene target:
//!
//! 1. bright pass: keep what exceeds `threshold`, at half resolution
//! 2. horizontal blur
//! 3. vertical blur
//! 4. composite: scene plus `strength` times the blurred highlights, written
//!    to the surface
//!
//! When bloom is disabled only the composite runs, with zero strength.

use crate::gfx::resources::texture_resource::TextureResource;
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    UniformBuffer,
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const BRIGHT_PIPELINE: &str = "Bloom Bright";
const BLUR_PIPELINE: &str = "Bloom Blur";
const COMPOSITE_PIPELINE: &str = "Bloom Composite";

/// Tunable bloom parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub enabled: bool,
    /// Luminance above which pixels bloom, 0..1
    pub threshold: f32,
    /// Multiplier on the blurred highlights, 0..3
    pub strength: f32,
    /// Spread of the blur, 0..1
    pub radius: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.6,
            strength: 0.9,
            radius: 0.4,
        }
    }
}

/// MUST match `BloomUniform` in `bloom.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomUniform {
    pub texel_size: [f32; 2],
    pub direction: [f32; 2],
    pub threshold: f32,
    pub strength: f32,
    /// Distance between blur taps, in texels
    pub spread: f32,
    _padding: f32,
}

impl BloomSettings {
    /// Uniform for one pass; `direction` is zero outside the blur passes
    pub fn uniform(&self, texel_size: [f32; 2], direction: [f32; 2]) -> BloomUniform {
        BloomUniform {
            texel_size,
            direction,
            threshold: self.threshold.clamp(0.0, 1.0),
            strength: if self.enabled {
                self.strength.max(0.0)
            } else {
                0.0
            },
            spread: 1.0 + self.radius.clamp(0.0, 1.0) * 3.0,
            _padding: 0.0,
        }
    }
}

/// Half-resolution ping-pong targets and the bind groups that read them
struct BloomTargets {
    size: (u32, u32),
    ping: TextureResource,
    pong: TextureResource,
    /// Scene HDR target as input to bright pass and composite
    scene_bright: wgpu::BindGroup,
    scene_composite: wgpu::BindGroup,
    ping_blur: wgpu::BindGroup,
    pong_blur: wgpu::BindGroup,
    /// Final blurred highlights as composite input
    ping_result: wgpu::BindGroup,
}

pub struct BloomPass {
    pub settings: BloomSettings,
    source_layout: BindGroupLayoutWithDesc,
    result_layout: BindGroupLayoutWithDesc,
    bright_ubo: UniformBuffer<BloomUniform>,
    blur_h_ubo: UniformBuffer<BloomUniform>,
    blur_v_ubo: UniformBuffer<BloomUniform>,
    composite_ubo: UniformBuffer<BloomUniform>,
    targets: BloomTargets,
}

fn half_size(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

impl BloomPass {
    /// Creates layouts, uniforms and targets, and registers the three bloom
    /// pipelines with `pipeline_manager` under the `bloom` shader.
    pub fn new(
        device: &wgpu::Device,
        pipeline_manager: &mut PipelineManager,
        scene_target: &TextureResource,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let source_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Bloom Source Layout");
        let result_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Bloom Result Layout");

        let hdr_target = |format: wgpu::TextureFormat| {
            vec![Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })]
        };
        let fullscreen = |label: &str, entry: &str| {
            PipelineConfig::default_with_shader("bloom")
                .with_label(label)
                .with_fragment_entry(entry)
                .with_cull_mode(None)
                .with_no_vertex_buffers()
        };

        pipeline_manager.register_pipeline(
            BRIGHT_PIPELINE,
            fullscreen(BRIGHT_PIPELINE, "fs_bright")
                .with_bind_group_layouts(vec![source_layout.layout.clone()])
                .with_color_targets(hdr_target(TextureResource::HDR_FORMAT)),
        );
        pipeline_manager.register_pipeline(
            BLUR_PIPELINE,
            fullscreen(BLUR_PIPELINE, "fs_blur")
                .with_bind_group_layouts(vec![source_layout.layout.clone()])
                .with_color_targets(hdr_target(TextureResource::HDR_FORMAT)),
        );
        pipeline_manager.register_pipeline(
            COMPOSITE_PIPELINE,
            fullscreen(COMPOSITE_PIPELINE, "fs_composite")
                .with_bind_group_layouts(vec![
                    source_layout.layout.clone(),
                    result_layout.layout.clone(),
                ])
                .with_color_targets(hdr_target(surface_format)),
        );

        let settings = BloomSettings::default();
        let bright_ubo = UniformBuffer::new(device);
        let blur_h_ubo = UniformBuffer::new(device);
        let blur_v_ubo = UniformBuffer::new(device);
        let composite_ubo = UniformBuffer::new(device);

        let targets = Self::create_targets(
            device,
            &source_layout,
            &result_layout,
            [&bright_ubo, &blur_h_ubo, &blur_v_ubo, &composite_ubo],
            scene_target,
            width,
            height,
        );

        Self {
            settings,
            source_layout,
            result_layout,
            bright_ubo,
            blur_h_ubo,
            blur_v_ubo,
            composite_ubo,
            targets,
        }
    }

    fn create_targets(
        device: &wgpu::Device,
        source_layout: &BindGroupLayoutWithDesc,
        result_layout: &BindGroupLayoutWithDesc,
        [bright_ubo, blur_h_ubo, blur_v_ubo, composite_ubo]: [&UniformBuffer<BloomUniform>; 4],
        scene_target: &TextureResource,
        width: u32,
        height: u32,
    ) -> BloomTargets {
        let size = half_size(width, height);
        let ping = TextureResource::create_render_target(device, size.0, size.1, "Bloom Ping");
        let pong = TextureResource::create_render_target(device, size.0, size.1, "Bloom Pong");

        let source = |texture: &TextureResource, ubo: &UniformBuffer<BloomUniform>, label: &str| {
            BindGroupBuilder::new(source_layout)
                .texture(&texture.view)
                .sampler(&texture.sampler)
                .resource(ubo.binding_resource())
                .create(device, label)
        };

        BloomTargets {
            size,
            scene_bright: source(scene_target, bright_ubo, "Bloom Scene Bright"),
            scene_composite: source(scene_target, composite_ubo, "Bloom Scene Composite"),
            ping_blur: source(&ping, blur_h_ubo, "Bloom Ping Blur"),
            pong_blur: source(&pong, blur_v_ubo, "Bloom Pong Blur"),
            ping_result: BindGroupBuilder::new(result_layout)
                .texture(&ping.view)
                .sampler(&ping.sampler)
                .create(device, "Bloom Result"),
            ping,
            pong,
        }
    }

    /// Recreates the half-resolution targets after the scene target changed
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        scene_target: &TextureResource,
        width: u32,
        height: u32,
    ) {
        self.targets = Self::create_targets(
            device,
            &self.source_layout,
            &self.result_layout,
            [
                &self.bright_ubo,
                &self.blur_h_ubo,
                &self.blur_v_ubo,
                &self.composite_ubo,
            ],
            scene_target,
            width,
            height,
        );
    }

    /// Uploads this frame's uniforms. Must run before the encoder is submitted.
    pub fn prepare(&mut self, queue: &wgpu::Queue) {
        let (w, h) = self.targets.size;
        let texel = [1.0 / w as f32, 1.0 / h as f32];
        self.bright_ubo
            .update_content(queue, self.settings.uniform(texel, [0.0, 0.0]));
        self.blur_h_ubo
            .update_content(queue, self.settings.uniform(texel, [1.0, 0.0]));
        self.blur_v_ubo
            .update_content(queue, self.settings.uniform(texel, [0.0, 1.0]));
        self.composite_ubo
            .update_content(queue, self.settings.uniform(texel, [0.0, 0.0]));
    }

    /// Records the bloom passes and the composite into `output`
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_manager: &mut PipelineManager,
        output: &wgpu::TextureView,
    ) {
        if self.settings.enabled {
            let targets = &self.targets;
            blit(
                encoder,
                pipeline_manager,
                BRIGHT_PIPELINE,
                &targets.ping.view,
                &targets.scene_bright,
                None,
            );
            blit(
                encoder,
                pipeline_manager,
                BLUR_PIPELINE,
                &targets.pong.view,
                &targets.ping_blur,
                None,
            );
            blit(
                encoder,
                pipeline_manager,
                BLUR_PIPELINE,
                &targets.ping.view,
                &targets.pong_blur,
                None,
            );
        }

        blit(
            encoder,
            pipeline_manager,
            COMPOSITE_PIPELINE,
            output,
            &self.targets.scene_composite,
            Some(&self.targets.ping_result),
        );
    }
}

fn blit(
    encoder: &mut wgpu::CommandEncoder,
    pipeline_manager: &mut PipelineManager,
    pipeline: &str,
    target: &wgpu::TextureView,
    group0: &wgpu::BindGroup,
    group1: Option<&wgpu::BindGroup>,
) {
    let Some(pipeline) = pipeline_manager.get_pipeline(pipeline) else {
        return;
    };

    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Bloom Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, group0, &[]);
    if let Some(group1) = group1 {
        pass.set_bind_group(1, group1, &[]);
    }
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = BloomSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.threshold, 0.6);
        assert_eq!(settings.strength, 0.9);
        assert_eq!(settings.radius, 0.4);
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<BloomUniform>(), 32);
    }

    #[test]
    fn test_disabled_bloom_has_no_strength() {
        let settings = BloomSettings {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(settings.uniform([0.01, 0.01], [0.0, 0.0]).strength, 0.0);
    }

    #[test]
    fn test_radius_widens_blur() {
        let narrow = BloomSettings {
            radius: 0.0,
            ..Default::default()
        };
        let wide = BloomSettings {
            radius: 1.0,
            ..Default::default()
        };
        assert_eq!(narrow.uniform([0.0; 2], [1.0, 0.0]).spread, 1.0);
        assert_eq!(wide.uniform([0.0; 2], [1.0, 0.0]).spread, 4.0);
    }

    #[test]
    fn test_half_size_never_zero() {
        assert_eq!(half_size(1200, 800), (600, 400));
        assert_eq!(half_size(1, 0), (1, 1));
    }
}
