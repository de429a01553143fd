//! Render pipeline management system for wgpu
//!
//! Provides pipeline creation and caching with lazy creation: pipelines are
//! registered as configurations and built on first use or all at once.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use super::error::RenderError;
use crate::gfx::scene::vertex::Vertex3D;

/// Everything needed to build one render pipeline.
///
/// Scene pipelines read [`Vertex3D`] buffers; fullscreen passes set
/// `no_vertex_buffers` and generate their triangle in `vs_main`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth_texture: Option<Texture>,
    pub multisample: MultisampleState,
    pub color_targets: Vec<Option<ColorTargetState>>,
    pub fragment_entry: String,
    pub depth_write: bool,
    pub depth_compare: CompareFunction,
    pub no_vertex_buffers: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            shader: "shader.wgsl".to_string(),
            bind_group_layouts: Vec::new(),
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            depth_texture: None,
            multisample: MultisampleState::default(),
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8Unorm,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            fragment_entry: "fs_main".to_string(),
            depth_write: true,
            depth_compare: CompareFunction::Less,
            no_vertex_buffers: false,
        }
    }
}

impl PipelineConfig {
    pub fn default_with_shader(shader: &str) -> Self {
        Self {
            shader: shader.to_string(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// Uses a fragment entry point other than `fs_main`
    pub fn with_fragment_entry(mut self, entry: &str) -> Self {
        self.fragment_entry = entry.to_string();
        self
    }

    /// Depth-tests without writing, for translucent geometry
    pub fn with_depth_write(mut self, enabled: bool) -> Self {
        self.depth_write = enabled;
        self
    }

    /// Layouts in slot order
    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Depth-tests against textures of `texture`'s format
    pub fn with_depth_stencil(mut self, texture: Texture) -> Self {
        self.depth_texture = Some(texture);
        self
    }

    pub fn with_color_targets(mut self, targets: Vec<Option<ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }

    pub fn with_primitive_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.primitive_topology = topology;
        self
    }

    /// Fullscreen pass: no vertex input
    pub fn with_no_vertex_buffers(mut self) -> Self {
        self.no_vertex_buffers = true;
        self
    }
}

/// Named shaders and pipelines, built lazily from registered configs
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    shader_modules: HashMap<String, ShaderModule>,
    pending_pipelines: Vec<String>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            pipeline_configs: HashMap::new(),
            shader_modules: HashMap::new(),
            pending_pipelines: Vec::new(),
        }
    }

    /// Registers `config` under `name`; built on first `get_pipeline`
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipeline_configs.insert(name.to_string(), config);
        self.pending_pipelines.push(name.to_string());
    }

    /// Compiles WGSL source. Errors surface through the device's
    /// uncaptured error handler.
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let shader_module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });

        self.shader_modules.insert(name.to_string(), shader_module);
    }

    /// Returns the pipeline, building it first if it is still pending.
    ///
    /// Build failures are logged and yield `None`, so a broken pass is
    /// skipped instead of aborting the frame.
    pub fn get_pipeline(&mut self, name: &str) -> Option<&RenderPipeline> {
        if !self.pipelines.contains_key(name) {
            if let Err(err) = self.build(name) {
                log::error!("{err}");
                return None;
            }
        }
        self.pipelines.get(name)
    }

    /// Builds every pending pipeline, collecting all failures
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<RenderError>> {
        let pending = std::mem::take(&mut self.pending_pipelines);
        let mut errors = Vec::new();
        for name in pending {
            if let Err(err) = self.build(&name) {
                self.pending_pipelines.push(name);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn build(&mut self, name: &str) -> Result<(), RenderError> {
        let config = self
            .pipeline_configs
            .get(name)
            .ok_or_else(|| RenderError::UnknownPipeline(name.to_string()))?;
        let pipeline = self.create_pipeline_from_config(name, config)?;
        self.pipelines.insert(name.to_string(), pipeline);
        self.pending_pipelines.retain(|n| n != name);
        Ok(())
    }

    fn create_pipeline_from_config(
        &self,
        name: &str,
        config: &PipelineConfig,
    ) -> Result<RenderPipeline, RenderError> {
        let shader = self.shader_modules.get(&config.shader).ok_or_else(|| {
            RenderError::MissingShader {
                pipeline: name.to_string(),
                shader: config.shader.clone(),
            }
        })?;

        let bind_group_layout_refs: Vec<&BindGroupLayout> =
            config.bind_group_layouts.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", name)),
                bind_group_layouts: &bind_group_layout_refs,
                push_constant_ranges: &[],
            });

        let fragment_state = Some(FragmentState {
            module: shader,
            entry_point: Some(&config.fragment_entry),
            targets: &config.color_targets,
            compilation_options: PipelineCompilationOptions::default(),
        });

        // Fullscreen passes generate their triangle in the vertex shader
        let vertex_buffers: &[VertexBufferLayout] = if config.no_vertex_buffers {
            &[]
        } else {
            &[Vertex3D::desc()]
        };

        let depth_stencil = config
            .depth_texture
            .as_ref()
            .map(|texture| DepthStencilState {
                format: texture.format(),
                depth_write_enabled: config.depth_write,
                depth_compare: config.depth_compare,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            });

        let pipeline = self
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: vertex_buffers,
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: fragment_state,
                primitive: PrimitiveState {
                    topology: config.primitive_topology,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: config.multisample,
                multiview: None,
                cache: None,
            });

        Ok(pipeline)
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
            pending_pipelines: self.pending_pipelines.len(),
            loaded_shaders: self.shader_modules.len(),
        }
    }
}

#[derive(Debug)]
pub struct PipelineStats {
    pub total_pipelines: usize,
    pub pending_pipelines: usize,
    pub loaded_shaders: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_writes_depth() {
        let config = PipelineConfig::default();
        assert!(config.depth_write);
        assert_eq!(config.depth_compare, CompareFunction::Less);
        assert_eq!(config.fragment_entry, "fs_main");
        assert!(!config.no_vertex_buffers);
    }

    #[test]
    fn test_translucent_fullscreen_builder() {
        let config = PipelineConfig::default_with_shader("bloom")
            .with_label("Bloom Blur")
            .with_fragment_entry("fs_blur")
            .with_depth_write(false)
            .with_cull_mode(None)
            .with_no_vertex_buffers();

        assert_eq!(config.shader, "bloom");
        assert_eq!(config.label, "Bloom Blur");
        assert_eq!(config.fragment_entry, "fs_blur");
        assert!(!config.depth_write);
        assert!(config.cull_mode.is_none());
        assert!(config.no_vertex_buffers);
    }
}
