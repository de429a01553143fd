// src/ui/manager.rs
//! ImGui overlay for the tuning panel
//!
//! [`UiManager`] sits between winit and the flame app. Every window event is
//! shown to ImGui first and [`UiManager::on_window_event`] reports whether the
//! panel consumed it. Frames are built with [`UiManager::frame`] and composited
//! onto the swapchain image with [`UiManager::draw_over`].

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

const FONT_SIZE: f32 = 18.0;

/// What the panel asked to own after the last event or frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capture {
    pub mouse: bool,
    pub keyboard: bool,
}

impl Capture {
    /// Whether `event` stops at the panel instead of reaching the scene.
    ///
    /// Pointer input stays with the scene while the box is being dragged, so
    /// a drag that crosses the panel keeps moving the box. Resize and focus
    /// changes always reach the scene.
    pub fn swallows(self, event: &WindowEvent, box_dragging: bool) -> bool {
        match event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. } => self.mouse && !box_dragging,
            WindowEvent::KeyboardInput { .. } => self.keyboard,
            _ => false,
        }
    }
}

/// ImGui context, winit platform and wgpu renderer for the `--debug` panel.
///
/// DPI is locked to 1.0 so the panel is laid out in physical pixels, the
/// same space the cursor ray is cast from.
pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    cursor: Option<MouseCursor>,
}

impl UiManager {
    /// Builds the overlay for a surface of `surface_format`
    pub fn new(
        device: &Device,
        queue: &Queue,
        surface_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                size_pixels: FONT_SIZE,
                oversample_h: 1,
                pixel_snap_h: true,
                ..Default::default()
            }),
        }]);

        let renderer = Renderer::new(
            &mut context,
            device,
            queue,
            RendererConfig {
                texture_format: surface_format,
                ..Default::default()
            },
        );

        let size = window.inner_size();
        let mut manager = Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            cursor: None,
        };
        manager.resize(size.width, size.height);
        manager
    }

    /// Matches the panel's layout area to the surface
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// Feeds one window event to ImGui.
    ///
    /// Returns true when the panel consumed it and the scene must ignore it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        window_id: WindowId,
        event: &WindowEvent,
        box_dragging: bool,
    ) -> bool {
        if let WindowEvent::Resized(size) = event {
            self.resize(size.width, size.height);
            return false;
        }

        let forwarded: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        self.platform
            .handle_event(self.context.io_mut(), window, &forwarded);

        self.capture().swallows(event, box_dragging)
    }

    /// Input the panel currently claims
    pub fn capture(&self) -> Capture {
        let io = self.context.io();
        Capture {
            mouse: io.want_capture_mouse,
            keyboard: io.want_capture_keyboard,
        }
    }

    /// Builds this frame's widgets with `build`
    pub fn frame<F>(&mut self, window: &Window, build: F)
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        let io = self.context.io_mut();
        io.update_delta_time(now.duration_since(self.last_frame));
        self.last_frame = now;

        if let Err(err) = self.platform.prepare_frame(io, window) {
            log::warn!("Panel could not move the cursor: {err}");
        }

        let ui = self.context.frame();
        build(ui);

        let cursor = ui.mouse_cursor();
        if cursor != self.cursor {
            self.cursor = cursor;
            self.platform.prepare_render(ui, window);
        }
    }

    /// Draws the frame from the last [`UiManager::frame`] on top of `target`
    pub fn draw_over(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target: &TextureView,
    ) {
        let draw_data = self.context.render();
        let [width, height] = draw_data.display_size;
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Tuning Panel Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                // Keep the composited scene underneath
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(err) = self.renderer.render(draw_data, queue, device, &mut pass) {
            log::error!("Tuning panel draw failed: {err:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::{DeviceId, ElementState, MouseButton, MouseScrollDelta, TouchPhase};

    fn click() -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: DeviceId::dummy(),
            state: ElementState::Pressed,
            button: MouseButton::Left,
        }
    }

    fn wheel() -> WindowEvent {
        WindowEvent::MouseWheel {
            device_id: DeviceId::dummy(),
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: TouchPhase::Moved,
        }
    }

    const HOVERED: Capture = Capture {
        mouse: true,
        keyboard: false,
    };

    #[test]
    fn test_hovered_panel_swallows_pointer_input() {
        assert!(HOVERED.swallows(&click(), false));
        assert!(HOVERED.swallows(&wheel(), false));
        assert!(!Capture::default().swallows(&click(), false));
    }

    #[test]
    fn test_box_drag_keeps_pointer_input() {
        assert!(!HOVERED.swallows(&click(), true));
        assert!(!HOVERED.swallows(&wheel(), true));
    }

    #[test]
    fn test_window_changes_always_reach_scene() {
        let everything = Capture {
            mouse: true,
            keyboard: true,
        };
        let resized = WindowEvent::Resized(winit::dpi::PhysicalSize::new(800, 600));
        assert!(!everything.swallows(&resized, false));
        assert!(!everything.swallows(&WindowEvent::Focused(false), false));
        assert!(!everything.swallows(&WindowEvent::CloseRequested, false));
    }
}
