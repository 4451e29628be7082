use courtyard_shared::OverlayState;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// The page's loading overlay element, if the host page has one.
pub struct Overlay {
    element: Option<HtmlElement>,
    shown: OverlayState,
}

impl Overlay {
    pub fn find(document: &Document, id: Option<&str>) -> Self {
        let element = id
            .and_then(|id| document.get_element_by_id(id))
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        if id.is_some() && element.is_none() {
            log::warn!("Loading overlay element not found; continuing without it");
        }
        Self {
            element,
            shown: OverlayState::Visible,
        }
    }

    pub fn apply(&mut self, state: OverlayState) {
        if state == self.shown {
            return;
        }
        if let Some(element) = &self.element {
            let style = element.style();
            let result = match &state {
                OverlayState::Visible => style.set_property("display", ""),
                OverlayState::Hidden => style.set_property("display", "none"),
                OverlayState::Message(text) => {
                    // Replaces the loading animation for good. Only a model
                    // failure produces this and load outcomes never change
                    // afterwards, so Visible cannot follow.
                    element.set_text_content(Some(text));
                    style.set_property("display", "")
                }
            };
            if result.is_err() {
                log::warn!("Failed to update loading overlay");
            }
        }
        self.shown = state;
    }
}
