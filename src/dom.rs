use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Keep the canvas backing store sized to CSS size * devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(window) = web::window() {
        let dpr = window.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w = (rect.width() * dpr) as u32;
        let h = (rect.height() * dpr) as u32;
        canvas.set_width(w.max(1));
        canvas.set_height(h.max(1));
    }
}

/// Re-sync the canvas backing size whenever the window resizes.
pub fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let closure = Closure::wrap(Box::new(move || {
        sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

/// Pointer-affordance cursor over the whole page.
pub fn set_pointer_cursor(active: bool) {
    if let Some(body) = window_document().and_then(|d| d.body()) {
        let cursor = if active { "pointer" } else { "default" };
        _ = body.style().set_property("cursor", cursor);
    }
}
