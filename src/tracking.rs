//! Perception boundary.
//!
//! Camera capture and hand-landmark extraction run in the host page (a
//! MediaPipe Hands pipeline in JS); this module is the sink. The producer
//! pushes one frame at a time at its own cadence; each frame is classified
//! immediately and published to the latest-value mailbox, so the producer
//! never blocks and stale samples are simply overwritten.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::core::{classify, ClassifierConfig, Gesture, HandSample, Latest};

thread_local! {
    static GESTURE_SLOT: RefCell<Option<Rc<Latest<Gesture>>>> = const { RefCell::new(None) };
    static MEDIA_STREAM: RefCell<Option<web::MediaStream>> = const { RefCell::new(None) };
}

/// Hook the shared gesture mailbox up to the exported sink. Called once
/// during init, before the host page starts pushing frames.
pub fn install_slot(slot: Rc<Latest<Gesture>>) {
    GESTURE_SLOT.with(|s| *s.borrow_mut() = Some(slot));
}

/// Entry point for the perception pipeline: 63 floats (21 landmarks ×
/// x,y,z) for a detected hand, or an empty slice when no hand is visible.
/// Malformed buffers are treated as hand absence, never as errors.
#[wasm_bindgen]
pub fn submit_hand_frame(landmarks: &[f32]) {
    let sample = HandSample::from_flat(landmarks);
    let gesture = classify(sample.as_ref(), &ClassifierConfig::default());
    GESTURE_SLOT.with(|s| {
        if let Some(slot) = s.borrow().as_ref() {
            slot.publish(gesture);
        }
    });
}

/// Retain the capture stream so shutdown can release the camera.
#[wasm_bindgen]
pub fn register_media_stream(stream: web::MediaStream) {
    log::info!("[gesture] media stream registered");
    MEDIA_STREAM.with(|s| *s.borrow_mut() = Some(stream));
}

/// Stop all tracks of the registered capture stream, releasing the camera.
pub fn release_media_stream() {
    MEDIA_STREAM.with(|s| {
        if let Some(stream) = s.borrow_mut().take() {
            for track in stream.get_tracks().iter() {
                if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
                    track.stop();
                }
            }
            log::info!("[gesture] media stream released");
        }
    });
}
