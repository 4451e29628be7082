//! Courtyard WASM Web Runtime
//!
//! Renders the courtyard scene into a page canvas with WebGPU (WebGL2 as
//! fallback). The host page fetches the sky and model and forwards input
//! events; see `www/` for the reference host.

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod overlay;
mod viewport;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point, called when the WASM module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Courtyard Web Runtime initialized");
}

/// Create the viewer on `canvas_id`, optionally driving the loading
/// overlay element `overlay_id`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn create_app(canvas_id: String, overlay_id: Option<String>) -> Result<app::App, JsValue> {
    app::App::new(&canvas_id, overlay_id.as_deref()).await
}
