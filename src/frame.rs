use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use instant::Instant;
use rand::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::core::{FormationEngine, Gesture, Latest, Mode, Session};
use crate::overlay;
use crate::photos;
use crate::render;

/// Loop gate. `shutdown` clears it; the next scheduled tick then drops the
/// frame context (and with it the GPU state) instead of re-scheduling.
pub static RUNNING: AtomicBool = AtomicBool::new(true);

pub struct FrameContext<'a> {
    pub session: Rc<RefCell<Session>>,
    pub engine: Rc<RefCell<FormationEngine>>,
    pub gesture_slot: Rc<Latest<Gesture>>,

    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState<'a>>,
    pub rng: StdRng,

    pub last_instant: Instant,
    pub shown_mode: Option<Mode>,
    pub shown_photo_count: u32,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;
        // Clamp tab-switch pauses so eases resume instead of snapping.
        let dt_sec = dt.as_secs_f32().min(0.25);

        let gesture = self.gesture_slot.get();

        {
            let mut session = self.session.borrow_mut();
            if let Some(tr) = session.apply_gesture(&gesture) {
                log::info!("[mode] {} -> {} (gesture)", tr.from.label(), tr.to.label());
            }
            let photo_count = self.engine.borrow().photo_count();
            session.ensure_selection(&mut self.rng, photo_count);
        }

        let (mode, selection) = {
            let session = self.session.borrow();
            (session.mode, session.selection)
        };
        self.engine
            .borrow_mut()
            .tick(dt_sec, mode, &gesture, selection);

        for pending in photos::drain_pending() {
            if let Some(g) = &mut self.gpu {
                g.upload_photo(pending.id, &pending.bitmap);
            }
        }

        let photo_count = self.engine.borrow().photo_count();
        if self.shown_mode != Some(mode) || self.shown_photo_count != photo_count {
            self.shown_mode = Some(mode);
            self.shown_photo_count = photo_count;
            if let Some(doc) = crate::dom::window_document() {
                overlay::update_status(&doc, mode.label(), photo_count);
            }
        }

        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(self.canvas.width(), self.canvas.height());
            if let Err(e) = g.render(&self.engine.borrow()) {
                log::error!("render error: {:?}", e);
            }
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas, crate::constants::PARTICLE_COUNT).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    RUNNING.store(true, Ordering::Relaxed);
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if !RUNNING.load(Ordering::Relaxed) {
            // Stop scheduling and release the GPU state. The closure itself
            // stays alive in its Rc cycle, like the rest of the long-lived
            // wiring.
            frame_ctx_tick.borrow_mut().gpu = None;
            return;
        }
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            let _ = w.request_animation_frame(
                tick_clone
                    .borrow()
                    .as_ref()
                    .unwrap()
                    .as_ref()
                    .unchecked_ref(),
            );
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        let _ = w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}
