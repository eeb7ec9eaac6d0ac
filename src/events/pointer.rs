use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::camera;
use crate::constants::PHOTO_BASE_WIDTH;
use crate::core::{FormationEngine, Mode, SceneEvent, Session};
use crate::dom;
use crate::input;

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub engine: Rc<RefCell<FormationEngine>>,
    pub session: Rc<RefCell<Session>>,
}

pub fn wire_input_handlers(w: InputWiring) {
    wire_pointermove(&w);
    wire_pointerup(&w);
}

/// World-space photo bounding spheres for the current frame: centers with
/// the group rotation applied, radii covering each quad's half-diagonal at
/// its aspect and current scale.
fn photo_pick_set(engine: &FormationEngine) -> (Vec<Vec3>, Vec<f32>) {
    let group = engine.group_matrix();
    let centers = engine
        .photos
        .iter()
        .map(|p| group * p.transform.position)
        .collect();
    let radii = engine
        .photos
        .iter()
        .map(|p| input::photo_bounding_radius(PHOTO_BASE_WIDTH, p.aspect, p.transform.scale))
        .collect();
    (centers, radii)
}

/// Hover query: same ray/intersect as picking, but only drives the cursor
/// affordance. No state machine effect.
fn wire_pointermove(w: &InputWiring) {
    let w = w.clone();

    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = input::pointer_canvas_px(&ev, &w.canvas);
        let (ro, rd) = camera::screen_to_world_ray(&w.canvas, pos.x, pos.y);
        let (centers, radii) = photo_pick_set(&w.engine.borrow());
        let hit = input::pick_nearest(ro, rd, &centers, &radii);
        dom::set_pointer_cursor(hit.is_some());
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

/// Click resolution: a photo hit raises a select event; a miss while
/// zoomed raises a dismiss. Particles are not individually selectable.
fn wire_pointerup(w: &InputWiring) {
    let w = w.clone();

    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = input::pointer_canvas_px(&ev, &w.canvas);
        let (ro, rd) = camera::screen_to_world_ray(&w.canvas, pos.x, pos.y);
        let (centers, radii) = photo_pick_set(&w.engine.borrow());

        let mut session = w.session.borrow_mut();
        let transition = match input::pick_nearest(ro, rd, &centers, &radii) {
            Some((i, _t)) => {
                log::info!("[pick] photo {}", i);
                session.apply_event(SceneEvent::Select(i as u32))
            }
            None if session.mode == Mode::PhotoZoom => session.apply_event(SceneEvent::Dismiss),
            None => None,
        };
        if let Some(tr) = transition {
            log::info!("[mode] {} -> {} (pointer)", tr.from.label(), tr.to.label());
        }
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);

    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
