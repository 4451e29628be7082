//! Viewer application implementing winit ApplicationHandler
//!
//! Opens the window, loads the sky and model from disk and flies the camera
//! with the same integrator the web runtime uses.

use std::sync::Arc;

use courtyard_shared::{AssetKind, OverlayState, Session};
use courtyard_wgpu::RendererState;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::assets;
use crate::config::ResolvedConfig;

const TITLE: &str = "Courtyard";

pub struct Viewer {
    config: ResolvedConfig,
    session: Session,
    initial_size: PhysicalSize<u32>,

    window: Option<Arc<Window>>,
    renderer: Option<RendererState>,
    cursor_captured: bool,
    error: Option<anyhow::Error>,
}

impl Viewer {
    pub fn new(config: ResolvedConfig, width: u32, height: u32) -> Self {
        let session = Session::new(config.scene.clone());
        Self {
            config,
            session,
            initial_size: PhysicalSize::new(width, height),
            window: None,
            renderer: None,
            cursor_captured: false,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title(window_title(&self.session.overlay()))
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        let projection = self.config.scene.camera.projection(width, height);
        let mut renderer = pollster::block_on(RendererState::new(
            window.clone(),
            width,
            height,
            projection,
        ))
        .map_err(anyhow::Error::msg)?;
        renderer.configure_scene(&self.config.scene);
        self.renderer = Some(renderer);

        self.load_sky();
        self.load_model();
        Ok(())
    }

    fn load_sky(&mut self) {
        let path = self.config.asset_path(AssetKind::Sky);
        let state = match assets::load_sky(&path) {
            Ok(texture) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.attach_sky(&texture);
                }
                self.session.asset_loaded(AssetKind::Sky)
            }
            Err(e) => self.session.asset_failed(AssetKind::Sky, &format!("{e:#}")),
        };
        self.show_overlay(&state);
    }

    fn load_model(&mut self) {
        let path = self.config.asset_path(AssetKind::Model);
        let state = match assets::load_model(&path, &self.config.scene.model) {
            Ok(model) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.add_model(&model);
                }
                self.session.asset_loaded(AssetKind::Model)
            }
            Err(e) => self.session.asset_failed(AssetKind::Model, &format!("{e:#}")),
        };
        self.show_overlay(&state);
    }

    /// The window title stands in for the page's loading overlay.
    fn show_overlay(&self, state: &OverlayState) {
        if let Some(window) = &self.window {
            window.set_title(&window_title(state));
        }
    }

    fn capture_cursor(&mut self) {
        if let Some(window) = &self.window {
            // Try confined first, then locked
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
            if let Err(e) = grabbed {
                log::warn!("Cursor grab unavailable: {e}");
            }
            window.set_cursor_visible(false);
            self.cursor_captured = true;
            self.session.pointer_capture_changed(true);
        }
    }

    fn release_cursor(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        self.cursor_captured = false;
        self.session.pointer_capture_changed(false);
    }

    fn redraw(&mut self) {
        let pose = self.session.frame();
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.render(&pose) {
                log::error!("Render failed: {e}");
            }
        }
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.initialize(event_loop) {
                log::error!("Failed to start viewer: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                }
            }

            WindowEvent::Focused(false) => {
                if self.cursor_captured {
                    self.release_cursor();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            // Escape releases the cursor, or quits once released
                            if key_code == KeyCode::Escape {
                                if self.cursor_captured {
                                    self.release_cursor();
                                } else {
                                    event_loop.exit();
                                }
                                return;
                            }
                            self.session.key_down(&key_name(key_code));
                        }
                        ElementState::Released => {
                            self.session.key_up(&key_name(key_code));
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if !self.cursor_captured {
                    self.capture_cursor();
                }
            }

            WindowEvent::RedrawRequested => {
                self.redraw();
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.session.pointer_move(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Physical key name in the browser's `KeyboardEvent.code` spelling.
///
/// winit names its key codes after the same W3C list, so the debug name
/// is the code ("KeyW", "ArrowUp", "Space").
pub fn key_name(key: KeyCode) -> String {
    format!("{key:?}")
}

fn window_title(state: &OverlayState) -> String {
    match state {
        OverlayState::Visible => format!("{TITLE} (loading)"),
        OverlayState::Hidden => TITLE.to_owned(),
        OverlayState::Message(text) => format!("{TITLE}: {text}"),
    }
}
