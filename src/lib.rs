#![cfg(target_arch = "wasm32")]

//! Gesture-controlled photo ornament: a particle tree that scatters and
//! refocuses in response to classified hand gestures, rendered with WebGPU
//! on a host-page canvas.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use instant::Instant;
use rand::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod camera;
mod constants;
mod core;
mod dom;
mod events;
mod frame;
mod input;
mod overlay;
mod photos;
mod render;
mod tracking;

use crate::core::{FormationEngine, Gesture, Latest, Session};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("ornament starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

static STARTED: AtomicBool = AtomicBool::new(false);

async fn init() -> anyhow::Result<()> {
    if STARTED.swap(true, Ordering::SeqCst) {
        log::warn!("init called twice; ignoring");
        return Ok(());
    }

    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas_el = document
        .get_element_by_id("scene-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #scene-canvas"))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    dom::wire_canvas_resize(&canvas);

    let engine = Rc::new(RefCell::new(FormationEngine::new(
        constants::LAYOUT_SEED,
        constants::PARTICLE_COUNT,
    )));
    let session = Rc::new(RefCell::new(Session::new()));
    let gesture_slot = Rc::new(Latest::new(Gesture::neutral()));

    // External boundaries: the perception sink and photo ingestion write
    // into these shared handles from their exported entry points.
    tracking::install_slot(gesture_slot.clone());
    photos::install_engine(engine.clone());

    events::wire_input_handlers(events::InputWiring {
        canvas: canvas.clone(),
        engine: engine.clone(),
        session: session.clone(),
    });
    events::wire_global_keydown(canvas.clone());

    overlay::update_status(&document, session.borrow().mode.label(), 0);
    overlay::show_help(&document);

    let gpu = frame::init_gpu(&canvas).await;
    if gpu.is_none() {
        log::warn!("running without WebGPU; scene state still advances");
    }

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        session,
        engine,
        gesture_slot,
        canvas,
        gpu,
        rng: StdRng::from_entropy(),
        last_instant: Instant::now(),
        shown_mode: None,
        shown_photo_count: 0,
    }));
    frame::start_loop(frame_ctx);
    log::info!("ornament running");
    Ok(())
}

/// Halt the animation loop, release the GPU surface and stop the camera.
#[wasm_bindgen]
pub fn shutdown() {
    frame::RUNNING.store(false, Ordering::Relaxed);
    tracking::release_media_stream();
    log::info!("ornament shutdown requested");
}
