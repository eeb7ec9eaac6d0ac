// Interaction state machine.
//
// A small Moore machine over the three scene modes, driven once per
// gesture sample and once per discrete pointer event. The transition
// table is total: every (mode, gesture, event) input yields exactly one
// next mode, possibly the current one. The session also owns the photo
// selection, which only survives while the mode is `PhotoZoom`.

use rand::Rng;

use super::gesture::Gesture;

/// Identifier of a photo object. Photos are append-only, so ids are stable
/// insertion indices.
pub type PhotoId = u32;

/// Which formation the scene is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Tree,
    Scatter,
    PhotoZoom,
}

impl Mode {
    /// Display label for the status overlay.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Tree => "TREE",
            Mode::Scatter => "SCATTER",
            Mode::PhotoZoom => "PHOTO ZOOM",
        }
    }
}

/// Discrete interaction event raised by picking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// A photo was picked.
    Select(PhotoId),
    /// The background was clicked (no photo under the pointer).
    Dismiss,
}

/// A mode change that actually happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
}

/// Mode plus selection, owned by the frame driver and passed by reference
/// to whoever needs it. Single writer per field.
#[derive(Clone, Debug)]
pub struct Session {
    pub mode: Mode,
    pub selection: Option<PhotoId>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            mode: Mode::Tree,
            selection: None,
        }
    }

    /// React to one gesture sample. Rules, first match wins:
    ///
    /// 1. fist from anywhere but `Tree` -> `Tree` (global reset)
    /// 2. open hand, only from `Tree` -> `Scatter`
    /// 3. pinch, only from `Scatter` -> `PhotoZoom`
    /// 4. otherwise no transition
    ///
    /// Rule 2 deliberately requires the prior mode to be exactly `Tree`:
    /// a resting open hand must not kick the user out of `PhotoZoom` or
    /// re-trigger `Scatter` every sample.
    pub fn apply_gesture(&mut self, gesture: &Gesture) -> Option<Transition> {
        let next = if gesture.fist && self.mode != Mode::Tree {
            Mode::Tree
        } else if gesture.open && self.mode == Mode::Tree {
            Mode::Scatter
        } else if gesture.pinch && self.mode == Mode::Scatter {
            Mode::PhotoZoom
        } else {
            return None;
        };
        Some(self.switch_to(next))
    }

    /// React to one discrete interaction event. A `Select` outside
    /// `PhotoZoom` enters it; a `Select` while already zoomed retargets the
    /// selection without a transition. A `Dismiss` only means something in
    /// `PhotoZoom`; anywhere else it is silently ignored.
    pub fn apply_event(&mut self, event: SceneEvent) -> Option<Transition> {
        match event {
            SceneEvent::Select(id) if self.mode != Mode::PhotoZoom => {
                self.selection = Some(id);
                Some(self.switch_to(Mode::PhotoZoom))
            }
            SceneEvent::Select(id) => {
                self.selection = Some(id);
                None
            }
            SceneEvent::Dismiss if self.mode == Mode::PhotoZoom => {
                Some(self.switch_to(Mode::Scatter))
            }
            SceneEvent::Dismiss => None,
        }
    }

    /// While in `PhotoZoom` with nothing selected, pick a uniformly random
    /// live photo. Leaves the selection unset when there are no photos.
    pub fn ensure_selection(&mut self, rng: &mut impl Rng, photo_count: u32) {
        if self.mode == Mode::PhotoZoom && self.selection.is_none() && photo_count > 0 {
            self.selection = Some(rng.gen_range(0..photo_count));
        }
    }

    fn switch_to(&mut self, next: Mode) -> Transition {
        let from = self.mode;
        // Focus is only meaningful inside PhotoZoom.
        if from == Mode::PhotoZoom && next != Mode::PhotoZoom {
            self.selection = None;
        }
        self.mode = next;
        Transition { from, to: next }
    }
}
