//! Photo ingestion boundary.
//!
//! The host page decodes uploaded images to `ImageBitmap`s and hands them
//! over here. Registration is split in two: the formation engine gets a new
//! photo slot immediately (so layout and picking see it this frame), while
//! the pixels wait in a queue until the frame driver uploads them to a GPU
//! texture. Photos are append-only; there is no removal path.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys as web;

use crate::core::{FormationEngine, PhotoId};

pub struct PendingPhoto {
    pub id: PhotoId,
    pub bitmap: web::ImageBitmap,
}

thread_local! {
    static ENGINE: RefCell<Option<Rc<RefCell<FormationEngine>>>> = const { RefCell::new(None) };
    static PENDING: RefCell<Vec<PendingPhoto>> = const { RefCell::new(Vec::new()) };
}

/// Hook the shared formation engine up to the exported ingestion entry
/// point. Called once during init.
pub fn install_engine(engine: Rc<RefCell<FormationEngine>>) {
    ENGINE.with(|e| *e.borrow_mut() = Some(engine));
}

/// Register a decoded image with the ornament. Returns the stable id the
/// photo keeps for its lifetime, or u32::MAX when called before init.
#[wasm_bindgen]
pub fn add_photo_bitmap(bitmap: web::ImageBitmap) -> u32 {
    let width = bitmap.width().max(1) as f32;
    let height = bitmap.height().max(1) as f32;
    let aspect = width / height;

    let Some(id) = ENGINE.with(|e| {
        e.borrow()
            .as_ref()
            .map(|engine| engine.borrow_mut().add_photo(aspect))
    }) else {
        log::warn!("[photo] bitmap dropped, ornament not initialized");
        return u32::MAX;
    };

    log::info!("[photo] added id={} {}x{}", id, width as u32, height as u32);
    PENDING.with(|p| p.borrow_mut().push(PendingPhoto { id, bitmap }));
    id
}

/// Take all bitmaps queued since the last frame, for texture upload.
pub fn drain_pending() -> Vec<PendingPhoto> {
    PENDING.with(|p| p.borrow_mut().split_off(0))
}
