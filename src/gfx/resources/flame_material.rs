//! GPU side of the flame material
//!
//! Bound at slot 2 of the flame pipeline:
//!
//! | binding | resource |
//! |---|---|
//! | 0 | `FlameUniform` |
//! | 1, 2 | matcap texture and sampler |
//! | 3, 4 | noise texture and repeat sampler |

use crate::assets::{TextureHandle, TextureRegistry, TextureRole};
use crate::flame::{FlameUniform, ParameterState};
use crate::gfx::resources::texture_resource::TextureResource;
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    UniformBuffer,
};

pub struct FlameMaterial {
    uniform: UniformBuffer<FlameUniform>,
    bind_group: wgpu::BindGroup,
    // 1x1 stand-ins for textures the registry could not provide
    _fallbacks: Vec<TextureResource>,
}

impl FlameMaterial {
    pub fn create_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
        BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Flame Material Bind Group Layout")
    }

    /// Binds the textures referenced by `params`, substituting a white matcap
    /// or a mid-grey noise for any handle that is unset or unknown.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        params: &ParameterState,
        registry: &TextureRegistry,
    ) -> Self {
        let uniform = UniformBuffer::new_with_data(device, &params.snapshot());

        let mut fallbacks = Vec::new();
        let mut resolve = |role: TextureRole, handle: Option<TextureHandle>| {
            match handle.and_then(|h| registry.get(h)) {
                Some(texture) => texture.clone(),
                None => {
                    log::warn!("{} texture missing, binding a 1x1 fallback", role.label());
                    let image = role.fallback();
                    let texture = TextureResource::create_from_rgba_data(
                        device,
                        queue,
                        &image.rgba,
                        image.width,
                        image.height,
                        &format!("{} Fallback", role.label()),
                        role.options(),
                    );
                    fallbacks.push(texture.clone());
                    texture
                }
            }
        };
        let matcap = resolve(TextureRole::Matcap, params.matcap_texture());
        let noise = resolve(TextureRole::Noise, params.noise_texture());

        let bind_group = BindGroupBuilder::new(layout)
            .resource(uniform.binding_resource())
            .texture(&matcap.view)
            .sampler(&matcap.sampler)
            .texture(&noise.view)
            .sampler(&noise.sampler)
            .create(device, "Flame Material Bind Group");

        Self {
            uniform,
            bind_group,
            _fallbacks: fallbacks,
        }
    }

    /// Uploads the current parameter snapshot
    pub fn sync(&mut self, queue: &wgpu::Queue, params: &ParameterState) {
        self.uniform.update_content(queue, params.snapshot());
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
