//! WGPU-based rendering engine
//!
//! Owns the device, surface and every pass of a frame:
//!
//! 1. scene pass into an HDR target: wireframe objects, then the
//!    translucent flame sphere (depth-tested, no depth writes)
//! 2. bloom and composite onto the surface
//! 3. optional UI overlay

use std::sync::Arc;
use wgpu::TextureFormat;

use crate::config::hex_to_rgb;
use crate::gfx::{
    camera::camera_utils::CameraUniform,
    resources::{
        flame_material::FlameMaterial,
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
        texture_resource::TextureResource,
    },
    scene::{
        object::{DrawObject, RenderStyle},
        scene::Scene,
    },
};
use crate::wgpu_utils::{binding_types, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

use super::bloom::{BloomPass, BloomSettings};
use super::error::RenderError;
use super::pipeline_manager::{PipelineConfig, PipelineManager};

const WIREFRAME_PIPELINE: &str = "Wireframe";
const FLAME_PIPELINE: &str = "Flame";

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    scene_target: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_layout: BindGroupLayoutWithDesc,
    flame_layout: BindGroupLayoutWithDesc,
    bloom: BloomPass,
    clear_color: [f32; 3],
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width`, `height` - Initial surface size in pixels
    /// * `vsync` - Present with `Fifo` instead of `Immediate`
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("Surface format: {:?}", format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");
        let scene_target = TextureResource::create_render_target(
            &device,
            config.width,
            config.height,
            "Scene HDR Target",
        );

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Object Bind Group Layout");
        let flame_layout = FlameMaterial::create_layout(&device);

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("wireframe", include_str!("shaders/wireframe.wgsl"));
        pipeline_manager.load_shader("flame", include_str!("shaders/flame.wgsl"));
        pipeline_manager.load_shader("bloom", include_str!("shaders/bloom.wgsl"));

        pipeline_manager.register_pipeline(
            WIREFRAME_PIPELINE,
            PipelineConfig::default_with_shader("wireframe")
                .with_label(WIREFRAME_PIPELINE)
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
                .with_cull_mode(None)
                .with_depth_stencil(depth_texture.texture.clone())
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    object_layout.layout.clone(),
                ])
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format: TextureResource::HDR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })]),
        );

        // Translucent: tested against the box but never occludes it
        pipeline_manager.register_pipeline(
            FLAME_PIPELINE,
            PipelineConfig::default_with_shader("flame")
                .with_label(FLAME_PIPELINE)
                .with_depth_stencil(depth_texture.texture.clone())
                .with_depth_write(false)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    object_layout.layout.clone(),
                    flame_layout.layout.clone(),
                ])
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format: TextureResource::HDR_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })]),
        );

        let bloom = BloomPass::new(
            &device_handle,
            &mut pipeline_manager,
            &scene_target,
            format,
            config.width,
            config.height,
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{error}");
            }
        }
        log::debug!("{:?}", pipeline_manager.get_stats());

        Ok(RenderEngine {
            device: device_handle,
            config,
            format,
            surface,
            queue: queue_handle,
            depth_texture,
            scene_target,
            pipeline_manager,
            global_bindings,
            global_ubo,
            object_layout,
            flame_layout,
            bloom,
            clear_color: hex_to_rgb(0x121212),
        })
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    /// Only running out of memory is reported as an error.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        flame: &FlameMaterial,
        ui_callback: Option<F>,
    ) -> Result<(), RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(err) => {
                log::warn!("Skipping frame: {err}");
                return Ok(());
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.bloom.prepare(&self.queue);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: scene into the HDR target
        {
            let [r, g, b] = self.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.scene_target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(WIREFRAME_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                for object in scene.objects_with_style(RenderStyle::Wireframe) {
                    render_pass.draw_object(object);
                }
            }

            // Opaque lines first so the translucent sphere blends over them
            if let Some(pipeline) = self.pipeline_manager.get_pipeline(FLAME_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(2, flame.bind_group(), &[]);
                for object in scene.objects_with_style(RenderStyle::Flame) {
                    render_pass.draw_object(object);
                }
            }
        }

        // PASS 2: bloom and composite onto the surface
        self.bloom
            .render(&mut encoder, &mut self.pipeline_manager, &surface_texture_view);

        // PASS 3: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Uploads camera data for the next frame
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera_uniform);
    }

    /// Resizes the surface and recreates size-dependent targets
    ///
    /// Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
        self.scene_target =
            TextureResource::create_render_target(&self.device, width, height, "Scene HDR Target");
        self.bloom
            .resize(&self.device, &self.scene_target, width, height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    ///
    /// Used for creating compatible render targets and UI systems.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Layout objects bind their transform and color against (slot 1)
    pub fn object_layout(&self) -> &BindGroupLayoutWithDesc {
        &self.object_layout
    }

    /// Layout of the flame material (slot 2)
    pub fn flame_layout(&self) -> &BindGroupLayoutWithDesc {
        &self.flame_layout
    }

    pub fn bloom_settings(&self) -> BloomSettings {
        self.bloom.settings
    }

    pub fn bloom_settings_mut(&mut self) -> &mut BloomSettings {
        &mut self.bloom.settings
    }

    /// Scene background, RGB in [0, 1]
    pub fn clear_color(&self) -> [f32; 3] {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: [f32; 3]) {
        self.clear_color = color;
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::Immediate
    }
}
