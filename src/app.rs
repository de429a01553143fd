// src/app.rs
//! Composition root
//!
//! [`FlameApp`] owns the flame parameters, the frame updater, the scene and,
//! once the window exists, every GPU-side collaborator. Each winit callback
//! passes those pieces explicitly to whatever needs them.

use anyhow::Context;
use cgmath::{Deg, InnerSpace, Rad};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::assets::{load_or_generate, AssetSource, TextureRegistry, TextureRole};
use crate::config::{hex_to_rgb, AppConfig};
use crate::flame::{FrameUpdater, NoiseField, ParameterState};
use crate::gfx::{
    camera::{CameraController, CameraManager, OrbitCamera, OrbitPose},
    gizmos::{GizmoEvent, TranslateGizmo},
    picking::{screen_to_ray, Ray},
    rendering::{RenderEngine, RenderError},
    resources::FlameMaterial,
    scene::Scene,
};
use crate::ui::{PanelReadouts, PanelTargets, TuningPanel, UiManager};

type UiPass = fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView);

/// Runs the app until the window closes
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = FlameApp::new(config);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    match app.exit_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

pub struct FlameApp {
    config: AppConfig,
    params: ParameterState,
    updater: FrameUpdater,
    scene: Scene,
    gizmo: TranslateGizmo,
    cursor: Option<(f32, f32)>,

    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    textures: TextureRegistry,
    texture_sources: Vec<(TextureRole, AssetSource)>,
    flame_material: Option<FlameMaterial>,
    noise_preview: Option<NoiseField>,

    ui_manager: Option<UiManager>,
    panel: TuningPanel,

    exit_error: Option<anyhow::Error>,
}

impl FlameApp {
    pub fn new(config: AppConfig) -> Self {
        let scene_config = &config.scene;

        let pose = OrbitPose::looking_at(scene_config.camera_position, scene_config.camera_target);
        let aspect = scene_config.window_width as f32 / scene_config.window_height.max(1) as f32;
        let mut camera = OrbitCamera::new(
            pose,
            aspect,
            Rad::from(Deg(scene_config.fov_degrees)),
            scene_config.znear,
            scene_config.zfar,
        );
        camera.bounds.min_distance = Some(scene_config.sphere_radius * 1.1);
        let controller = CameraController::new(0.005, 0.1);

        let scene = Scene::flame_scene(
            CameraManager::new(camera, controller),
            scene_config.box_edge,
            scene_config.sphere_radius,
        );
        let params = ParameterState::new(config.flame_variant());

        Self {
            config,
            params,
            updater: FrameUpdater::new(),
            scene,
            gizmo: TranslateGizmo::new(),
            cursor: None,
            window: None,
            render_engine: None,
            textures: TextureRegistry::new(),
            texture_sources: Vec::new(),
            flame_material: None,
            noise_preview: None,
            ui_manager: None,
            panel: TuningPanel::new(),
            exit_error: None,
        }
    }

    /// Creates the window and GPU state, then loads the flame textures
    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let scene_config = self.config.scene.clone();

        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("flamesphere")
                    .with_inner_size(LogicalSize::new(
                        scene_config.window_width,
                        scene_config.window_height,
                    )),
            )
            .context("failed to create window")?;
        let window = Arc::new(window);

        let (width, height) = window.inner_size().into();
        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);

        let mut render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.vsync,
        ))
        .context("failed to initialize the renderer")?;
        render_engine.set_clear_color(hex_to_rgb(scene_config.clear_color));

        self.scene
            .init_gpu_resources(render_engine.device(), render_engine.object_layout());

        // Textures are in place before the first frame
        let device = render_engine.device();
        let queue = render_engine.queue();
        let max_dimension = device.limits().max_texture_dimension_2d;
        let (matcap, matcap_source) = load_or_generate(
            TextureRole::Matcap,
            self.config.matcap.as_deref(),
            max_dimension,
        );
        let (noise, noise_source) =
            load_or_generate(TextureRole::Noise, self.config.noise.as_deref(), max_dimension);
        self.texture_sources = vec![
            (TextureRole::Matcap, matcap_source),
            (TextureRole::Noise, noise_source),
        ];

        let matcap_handle = self
            .textures
            .register(device, queue, TextureRole::Matcap, &matcap);
        let noise_handle = self
            .textures
            .register(device, queue, TextureRole::Noise, &noise);
        self.params.set_matcap_texture(Some(matcap_handle));
        self.params.set_noise_texture(Some(noise_handle));
        self.noise_preview = noise.to_noise_field();

        self.flame_material = Some(FlameMaterial::new(
            device,
            queue,
            render_engine.flame_layout(),
            &self.params,
            &self.textures,
        ));

        if self.config.debug {
            self.ui_manager = Some(UiManager::new(
                device,
                queue,
                render_engine.surface_format(),
                &window,
            ));
            log::info!("Tuning panel enabled");
        }

        self.render_engine = Some(render_engine);
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.exit_error = Some(err);
        event_loop.exit();
    }

    fn cursor_ray(&self) -> Option<Ray> {
        let window = self.window.as_ref()?;
        let cursor = self.cursor?;
        let size = window.inner_size();
        screen_to_ray(
            cursor,
            (size.width as f32, size.height as f32),
            &self.scene.camera_manager.camera,
        )
    }

    fn on_gizmo_event(&mut self, event: GizmoEvent) {
        self.scene
            .camera_manager
            .controller
            .set_enabled(!event.is_dragging());
    }

    fn on_left_button(&mut self, state: ElementState) {
        let event = match state {
            ElementState::Pressed => {
                let Some(ray) = self.cursor_ray() else {
                    return;
                };
                let camera = &self.scene.camera_manager.camera;
                let forward = (camera.target - camera.eye).normalize();
                let Some(object) = self.scene.tracked_object_mut() else {
                    return;
                };
                self.gizmo.pointer_pressed(&ray, forward, object)
            }
            ElementState::Released => match self.scene.tracked_object_mut() {
                Some(object) => self.gizmo.pointer_released(object),
                None => None,
            },
        };

        if let Some(event) = event {
            self.on_gizmo_event(event);
        }
    }

    fn on_cursor_moved(&mut self, x: f32, y: f32) {
        self.cursor = Some((x, y));
        if !self.gizmo.is_dragging() {
            return;
        }
        let Some(ray) = self.cursor_ray() else {
            return;
        };
        if let Some(object) = self.scene.tracked_object_mut() {
            self.gizmo.pointer_moved(&ray, object);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(window), Some(flame_material)) = (
            self.render_engine.as_mut(),
            self.window.as_ref(),
            self.flame_material.as_mut(),
        ) else {
            return;
        };

        self.updater.update(&mut self.params, &self.scene);
        self.scene.update();
        render_engine.update(self.scene.camera_manager.camera.uniform);
        self.scene.update_all_transforms(render_engine.queue());
        flame_material.sync(render_engine.queue(), &self.params);

        let result = match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                let mut clear_color = render_engine.clear_color();
                let mut bloom = render_engine.bloom_settings();
                let readouts = PanelReadouts {
                    noise: self.noise_preview.as_ref(),
                    stats: self.updater.stats(),
                    textures: &self.texture_sources,
                };
                let panel = &mut self.panel;
                let params = &mut self.params;

                ui_manager.frame(window, |ui| {
                    panel.draw(
                        ui,
                        PanelTargets {
                            params,
                            bloom: &mut bloom,
                            clear_color: &mut clear_color,
                        },
                        &readouts,
                    )
                });
                render_engine.set_clear_color(clear_color);
                *render_engine.bloom_settings_mut() = bloom;

                render_engine.render_frame(
                    &self.scene,
                    flame_material,
                    Some(
                        |device: &wgpu::Device,
                         queue: &wgpu::Queue,
                         encoder: &mut wgpu::CommandEncoder,
                         view: &wgpu::TextureView| {
                            ui_manager.draw_over(device, queue, encoder, view)
                        },
                    ),
                )
            }
            None => render_engine.render_frame(&self.scene, flame_material, None::<UiPass>),
        };

        if let Err(err) = result {
            let fatal = matches!(err, RenderError::OutOfMemory);
            let err = anyhow::Error::new(err).context("rendering failed");
            if fatal {
                self.fail(event_loop, err);
            } else {
                log::warn!("{err:#}");
            }
        }
    }
}

impl ApplicationHandler for FlameApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Panel gets first look at input
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.on_window_event(&window, window_id, &event, self.gizmo.is_dragging()) {
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        ..
                    },
                ..
            } => {
                if key_code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.scene
                    .camera_manager
                    .process_key(key_code, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.on_left_button(state),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if self
            .ui_manager
            .as_ref()
            .is_some_and(|ui_manager| ui_manager.capture().mouse)
        {
            return;
        }

        self.scene.camera_manager.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
