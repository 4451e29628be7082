use courtyard_shared::{AssetKind, SceneConfig, Session};
use courtyard_wgpu::{decode_image, import_model, RendererState};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::overlay::Overlay;
use crate::viewport;

/// Main application state for the WASM runtime.
///
/// The host page owns the event listeners and the animation loop; it
/// forwards DOM events and fetched asset bytes to these methods.
#[wasm_bindgen]
pub struct App {
    session: Session,
    renderer: RendererState,
    overlay: Overlay,
    canvas: HtmlCanvasElement,
}

impl App {
    pub async fn new(canvas_id: &str, overlay_id: Option<&str>) -> Result<App, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("Canvas not found")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| "Element is not a canvas")?;

        let inner_width = window.inner_width()?.as_f64().unwrap_or(0.0);
        let inner_height = window.inner_height()?.as_f64().unwrap_or(0.0);
        let (width, height) = viewport::backing_size(inner_width, inner_height)
            .unwrap_or((canvas.width().max(1), canvas.height().max(1)));
        canvas.set_width(width);
        canvas.set_height(height);

        let config = SceneConfig::default();
        let projection = config.camera.projection(width, height);
        let mut renderer = RendererState::new(
            wgpu::SurfaceTarget::Canvas(canvas.clone()),
            width,
            height,
            projection,
        )
        .await
        .map_err(|e| JsValue::from_str(&format!("Failed to create renderer: {e}")))?;
        renderer.configure_scene(&config);

        let mut overlay = Overlay::find(&document, overlay_id);
        let session = Session::new(config);
        overlay.apply(session.overlay());

        log::info!("Viewer ready at {width}x{height}");

        Ok(App {
            session,
            renderer,
            overlay,
            canvas,
        })
    }

    fn finish_load(&mut self, kind: AssetKind, outcome: Result<(), String>) {
        let state = match outcome {
            Ok(()) => self.session.asset_loaded(kind),
            Err(reason) => self.session.asset_failed(kind, &reason),
        };
        self.overlay.apply(state);
    }
}

#[wasm_bindgen]
impl App {
    /// `KeyboardEvent.code` of a pressed key.
    pub fn key_down(&mut self, code: &str) {
        self.session.key_down(code);
    }

    pub fn key_up(&mut self, code: &str) {
        self.session.key_up(code);
    }

    /// Raw `movementX`/`movementY`. Ignored unless the pointer is locked.
    pub fn pointer_move(&mut self, dx: f64, dy: f64) {
        self.session.pointer_move(dx as f32, dy as f32);
    }

    /// Called from `pointerlockchange` with whether the canvas holds the lock.
    pub fn pointer_lock_changed(&mut self, active: bool) {
        self.session.pointer_capture_changed(active);
    }

    /// Window resize: updates the canvas, surface and projection aspect.
    pub fn resize(&mut self, width: f64, height: f64) {
        if let Some((w, h)) = viewport::backing_size(width, height) {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
            self.renderer.resize(w, h);
        }
    }

    /// Path the host should fetch the sky image from.
    pub fn sky_url(&self) -> String {
        self.session.asset_path(AssetKind::Sky).to_owned()
    }

    /// Path the host should fetch the courtyard model from.
    pub fn model_url(&self) -> String {
        self.session.asset_path(AssetKind::Model).to_owned()
    }

    /// Hand over the fetched sky image. Returns whether it was applied.
    pub fn load_sky(&mut self, bytes: &[u8]) -> bool {
        match decode_image(bytes) {
            Ok(texture) => {
                self.renderer.attach_sky(&texture);
                self.finish_load(AssetKind::Sky, Ok(()));
                true
            }
            Err(e) => {
                self.finish_load(AssetKind::Sky, Err(e.to_string()));
                false
            }
        }
    }

    /// Hand over the fetched binary glTF. Returns whether it was added.
    pub fn load_model(&mut self, bytes: &[u8]) -> bool {
        let placement = self.session.config().model.clone();
        match import_model(bytes, &placement) {
            Ok(model) => {
                self.renderer.add_model(&model);
                self.finish_load(AssetKind::Model, Ok(()));
                true
            }
            Err(e) => {
                self.finish_load(AssetKind::Model, Err(e.to_string()));
                false
            }
        }
    }

    /// Report a fetch failure (`kind` is "sky" or "model").
    pub fn asset_failed(&mut self, kind: &str, reason: &str) {
        match AssetKind::parse(kind) {
            Some(kind) => self.finish_load(kind, Err(reason.to_owned())),
            None => log::warn!("Unknown asset kind '{kind}': {reason}"),
        }
    }

    /// Run one frame. Called from requestAnimationFrame; motion is per
    /// frame, so the timestamp is not used.
    pub fn frame(&mut self, _time: f64) {
        let pose = self.session.frame();
        if let Err(e) = self.renderer.render(&pose) {
            log::error!("Render failed: {e}");
        }
    }
}
