use wasm_bindgen::JsCast;
use web_sys as web;

use crate::overlay;

/// Chrome-only key handling: 'h' toggles the help overlay, Enter toggles
/// fullscreen, Escape leaves it. Mode transitions are gesture/pointer
/// driven only.
pub fn handle_global_keydown(ev: &web::KeyboardEvent, canvas: &web::HtmlCanvasElement) {
    match ev.key().as_str() {
        "h" | "H" => {
            if let Some(doc) = crate::dom::window_document() {
                overlay::toggle_help(&doc);
            }
            ev.prevent_default();
        }
        "Enter" => {
            if let Some(doc) = crate::dom::window_document() {
                if doc.fullscreen_element().is_some() {
                    _ = doc.exit_fullscreen();
                } else {
                    _ = canvas.request_fullscreen();
                }
            }
            ev.prevent_default();
        }
        "Escape" => {
            if let Some(doc) = crate::dom::window_document() {
                _ = doc.exit_fullscreen();
            }
        }
        _ => {}
    }
}

pub fn wire_global_keydown(canvas: web::HtmlCanvasElement) {
    if let Some(window) = web::window() {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
                handle_global_keydown(&ev, &canvas);
            }) as Box<dyn FnMut(_)>);
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
